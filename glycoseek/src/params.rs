use thiserror::Error;

use crate::glycan::{BoundsError, GlycanBounds};
use crate::result::ScoringMode;
use crate::tolerance::{self, Tolerance, ToleranceError};

#[derive(Debug, PartialEq, Error)]
pub enum ParameterError {
    #[error("Invalid {0} tolerance: {1}")]
    Tolerance(&'static str, #[source] ToleranceError),
    #[error(transparent)]
    Bounds(#[from] BoundsError),
    #[error("At least one worker thread is required")]
    NoThreads,
}

/// Everything that controls a search run besides its inputs
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchParameters {
    pub threads: usize,
    pub bounds: GlycanBounds,
    #[cfg_attr(feature = "serde", serde(with = "crate::tolerance::text"))]
    pub precursor_tolerance: Tolerance,
    #[cfg_attr(feature = "serde", serde(with = "crate::tolerance::text"))]
    pub fragment_tolerance: Tolerance,
    /// How many isotope peaks below the monoisotopic peak a precursor may have
    /// been picked from
    pub isotope_count: u32,
    pub scoring: ScoringMode,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            threads: 6,
            bounds: GlycanBounds::default(),
            precursor_tolerance: Tolerance::PPM(10.0),
            fragment_tolerance: Tolerance::Da(0.01),
            isotope_count: 0,
            scoring: ScoringMode::Simple,
        }
    }
}

impl SearchParameters {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_bounds(mut self, bounds: GlycanBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_tolerances(mut self, precursor: Tolerance, fragment: Tolerance) -> Self {
        self.precursor_tolerance = precursor;
        self.fragment_tolerance = fragment;
        self
    }

    pub fn with_isotope_count(mut self, isotope_count: u32) -> Self {
        self.isotope_count = isotope_count;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringMode) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.threads == 0 {
            return Err(ParameterError::NoThreads);
        }
        tolerance::validate(self.precursor_tolerance)
            .map_err(|e| ParameterError::Tolerance("precursor", e))?;
        tolerance::validate(self.fragment_tolerance)
            .map_err(|e| ParameterError::Tolerance("fragment", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = SearchParameters::default();
        assert_eq!(params.threads, 6);
        assert_eq!(params.bounds, GlycanBounds::new(12, 12, 5, 4, 0).unwrap());
        assert_eq!(params.precursor_tolerance, Tolerance::PPM(10.0));
        assert_eq!(params.fragment_tolerance, Tolerance::Da(0.01));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let params = SearchParameters::default().with_threads(0);
        assert_eq!(params.validate(), Err(ParameterError::NoThreads));
        let params = SearchParameters::default()
            .with_tolerances(Tolerance::PPM(10.0), Tolerance::Da(-1.0));
        assert!(matches!(
            params.validate(),
            Err(ParameterError::Tolerance("fragment", ToleranceError::NotPositive(_)))
        ));
    }
}
