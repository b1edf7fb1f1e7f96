use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Counts of what happened to the spectra of one dispatch run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchProgress {
    pub spectra: usize,
    pub precursor_matched: usize,
    pub spectra_with_hits: usize,
    pub results: usize,
    pub failed: usize,
}

impl Add for DispatchProgress {
    type Output = DispatchProgress;

    fn add(self, rhs: Self) -> Self::Output {
        let mut dup = self;
        dup += rhs;
        dup
    }
}

impl AddAssign for DispatchProgress {
    fn add_assign(&mut self, rhs: Self) {
        self.spectra += rhs.spectra;
        self.precursor_matched += rhs.precursor_matched;
        self.spectra_with_hits += rhs.spectra_with_hits;
        self.results += rhs.results;
        self.failed += rhs.failed;
    }
}

impl Sum for DispatchProgress {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Self::add)
    }
}
