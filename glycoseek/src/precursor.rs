//! Narrow the peptide x glycan search space by precursor mass.
use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::glycan::GlycanStore;
use crate::index::SortedIndex;
use crate::mass::{peptide_mass, ION_MASS};
use crate::tolerance::{self, Tolerance, ToleranceError};

/// Candidate glycan compositions for each peptide, with peptides in the order they
/// were first matched
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MatchResultStore {
    peptides: Vec<String>,
    glycans: HashMap<String, BTreeSet<String>>,
}

impl MatchResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, peptide: &str, glycan: &str) {
        match self.glycans.get_mut(peptide) {
            Some(glycans) => {
                glycans.insert(glycan.to_string());
            }
            None => {
                self.peptides.push(peptide.to_string());
                self.glycans
                    .insert(peptide.to_string(), BTreeSet::from([glycan.to_string()]));
            }
        }
    }

    pub fn peptides(&self) -> &[String] {
        &self.peptides
    }

    pub fn glycans(&self, peptide: &str) -> impl Iterator<Item = &str> {
        self.glycans
            .get(peptide)
            .into_iter()
            .flat_map(|g| g.iter().map(|s| s.as_str()))
    }

    /// Each peptide paired with its candidate glycans
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.peptides
            .iter()
            .filter_map(|p| self.glycans.get(p).map(|g| (p.as_str(), g)))
    }

    pub fn len(&self) -> usize {
        self.peptides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peptides.is_empty()
    }

    pub fn candidate_count(&self) -> usize {
        self.glycans.values().map(|g| g.len()).sum()
    }
}

/// Finds the peptide and glycan composition pairs whose summed mass explains a
/// precursor mass.
#[derive(Debug, Clone)]
pub struct PrecursorMatcher<'a> {
    tolerance: Tolerance,
    glycans: &'a GlycanStore,
    peptides: SortedIndex<String>,
}

impl<'a> PrecursorMatcher<'a> {
    pub fn new(tolerance: Tolerance, glycans: &'a GlycanStore) -> Result<Self, ToleranceError> {
        let tolerance = tolerance::validate(tolerance)?;
        Ok(Self {
            tolerance,
            glycans,
            peptides: SortedIndex::new(Vec::new(), tolerance),
        })
    }

    /// Index the peptides to search. Peptides with residues that have no known mass
    /// are skipped. Returns the number indexed.
    pub fn init<S: AsRef<str>>(&mut self, peptides: &[S]) -> usize {
        let entries: Vec<(f64, String)> = peptides
            .iter()
            .filter_map(|p| {
                let p = p.as_ref();
                match peptide_mass(p) {
                    Ok(mass) => Some((mass, p.to_string())),
                    Err(e) => {
                        warn!("Skipping peptide {p}: {e}");
                        None
                    }
                }
            })
            .collect();
        let n = entries.len();
        self.peptides = SortedIndex::new(entries, self.tolerance);
        n
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Match a neutral precursor mass observed at `charge`, also trying up to
    /// `isotope_count` isotope peaks below the monoisotopic peak.
    pub fn match_precursor(&self, target: f64, charge: i32, isotope_count: u32) -> MatchResultStore {
        let matcher = self.peptides.matcher().for_charge(target, charge);
        let mut results = MatchResultStore::new();
        for (name, group) in self.glycans.iter() {
            if group.mass <= 0.0 {
                continue;
            }
            let delta = target - group.mass;
            if delta <= 0.0 {
                continue;
            }
            for i in 0..=isotope_count {
                let query = delta - i as f64 * ION_MASS;
                for hit in self.peptides.search_with(&matcher, query) {
                    results.add(&hit.payload, name);
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::glycan::{build, GlycanBounds};
    use crate::mass::peptide_mass;

    #[test]
    fn test_store_order() {
        let mut store = MatchResultStore::new();
        store.add("PEPTIDE", "GlcNAc-2-");
        store.add("ANGTK", "GlcNAc-2-");
        store.add("PEPTIDE", "GlcNAc-1-");
        store.add("PEPTIDE", "GlcNAc-1-");
        assert_eq!(store.peptides(), &["PEPTIDE".to_string(), "ANGTK".to_string()]);
        assert_eq!(store.glycans("PEPTIDE").collect::<Vec<_>>(), vec!["GlcNAc-1-", "GlcNAc-2-"]);
        assert_eq!(store.candidate_count(), 3);
    }

    #[test]
    fn test_match() {
        let database = build(GlycanBounds::new(4, 5, 1, 0, 0).unwrap());
        let peptides = vec!["AANGTK".to_string(), "LCNVSK".to_string(), "AXNGT".to_string()];
        let mut matcher = PrecursorMatcher::new(Tolerance::PPM(10.0), &database.isomers).unwrap();
        assert_eq!(matcher.init(&peptides), 2);

        let glycan = "GlcNAc-4-Man-3-";
        let target = peptide_mass("AANGTK").unwrap() + database.isomers.mass(glycan).unwrap();
        let found = matcher.match_precursor(target, 2, 0);
        assert!(found.glycans("AANGTK").any(|g| g == glycan));
        assert!(found.glycans("LCNVSK").next().is_none());

        let shifted = matcher.match_precursor(target + ION_MASS, 2, 0);
        assert!(shifted.glycans("AANGTK").all(|g| g != glycan));
        let shifted = matcher.match_precursor(target + ION_MASS, 2, 1);
        assert!(shifted.glycans("AANGTK").any(|g| g == glycan));

        assert!(matcher.match_precursor(100.0, 1, 0).is_empty());
    }

    #[test]
    fn test_absolute_window() {
        let mut glycans = GlycanStore::new();
        let root = crate::glycan::GlycanState::root();
        glycans.add("GlcNAc-1-".to_string(), root, 200.0);
        let mut matcher = PrecursorMatcher::new(Tolerance::Da(20.0), &glycans).unwrap();
        let peptides: Vec<String> = (1..100).map(|i| "G".repeat(i)).collect();
        matcher.init(&peptides);
        let target = peptide_mass(&"G".repeat(50)).unwrap() + 200.0;
        let found = matcher.match_precursor(target, 1, 0);
        // 57 Da per residue, so +-20 Da at charge 1 admits only the exact length
        assert_eq!(found.len(), 1);
        let found = matcher.match_precursor(target, 2, 0);
        assert_eq!(found.len(), 1);
        let found = matcher.match_precursor(target, 3, 0);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_rejects_invalid_tolerance() {
        let glycans = GlycanStore::new();
        assert!(matches!(
            PrecursorMatcher::new(Tolerance::PPM(-10.0), &glycans),
            Err(ToleranceError::NotPositive(_))
        ));
        assert!(PrecursorMatcher::new(Tolerance::Da(f64::INFINITY), &glycans).is_err());
    }
}
