//! Glycopeptide spectrum matches and the rules for choosing which ones a spectrum keeps.
use std::collections::BTreeMap;
use std::fmt::{self, Display};

use mzpeaks::CentroidPeak;

use crate::glycan::GlycanState;
use crate::mass::{ppm_error, ION_MASS};

/// The most results retained for a single spectrum
pub const MAX_HITS: usize = 20;

/// The PPM error at which the precursor score reaches zero
pub const PRECURSOR_PPM_CEILING: f64 = 50.0;

/// The components of a match's score vector, in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchType {
    Core,
    Branch,
    Terminal,
    Oxonium,
    Peptide,
}

impl SearchType {
    pub const ALL: [SearchType; 5] = [
        Self::Core,
        Self::Branch,
        Self::Terminal,
        Self::Oxonium,
        Self::Peptide,
    ];

    pub const fn position(&self) -> usize {
        match self {
            Self::Core => 0,
            Self::Branch => 1,
            Self::Terminal => 2,
            Self::Oxonium => 3,
            Self::Peptide => 4,
        }
    }
}

/// Scores computed after matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScoreType {
    Precursor,
    Elution,
}

impl Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precursor => f.write_str("precursor"),
            Self::Elution => f.write_str("elution"),
        }
    }
}

/// How matched intensities are turned into a score
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScoringMode {
    /// Intensities are summed and each component is scaled by 1/100
    #[default]
    Simple,
    /// Squared intensities are summed and each component is scaled by the
    /// spectrum's total squared intensity; the score is the square root of the sum
    Weighted,
}

impl ScoringMode {
    /// Aggregate the intensities of a set of matched peaks
    pub fn peak_value<'a, I: IntoIterator<Item = &'a CentroidPeak>>(&self, peaks: I) -> f64 {
        match self {
            Self::Simple => peaks.into_iter().map(|p| p.intensity as f64).sum(),
            Self::Weighted => peaks
                .into_iter()
                .map(|p| (p.intensity as f64).powi(2))
                .sum(),
        }
    }

    pub fn raw_score(&self, score: &[f64; 5]) -> f64 {
        let total: f64 = score.iter().sum();
        match self {
            Self::Simple => total,
            Self::Weighted => total.sqrt(),
        }
    }
}

/// Whether a search keeps every surviving candidate or only the best
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchMode {
    #[default]
    Target,
    Decoy,
}

/// One glycopeptide assignment to a spectrum
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    pub scan: usize,
    pub peptide: String,
    pub glycan: String,
    pub site: usize,
    /// Matched evidence in [`SearchType`] order
    pub score: [f64; 5],
    pub scoring: ScoringMode,
    pub extra: BTreeMap<ScoreType, f64>,
}

impl SearchResult {
    pub fn new(scan: usize, peptide: String, glycan: String, site: usize, score: [f64; 5], scoring: ScoringMode) -> Self {
        Self {
            scan,
            peptide,
            glycan,
            site,
            score,
            scoring,
            extra: BTreeMap::new(),
        }
    }

    pub fn component(&self, search_type: SearchType) -> f64 {
        self.score[search_type.position()]
    }

    pub fn score_sum(&self) -> f64 {
        self.score.iter().sum()
    }

    pub fn raw_score(&self) -> f64 {
        self.scoring.raw_score(&self.score)
    }

    /// The raw score weighted by the elution score once one has been computed
    pub fn final_score(&self) -> f64 {
        match self.extra.get(&ScoreType::Elution) {
            Some(elution) => self.raw_score() * elution,
            None => self.raw_score(),
        }
    }

    /// An extra score, or zero when it was never computed
    pub fn extra_score(&self, score_type: ScoreType) -> f64 {
        self.extra.get(&score_type).copied().unwrap_or_default()
    }

    pub fn set_extra_score(&mut self, score_type: ScoreType, value: f64) {
        self.extra.insert(score_type, value);
    }
}

/// Score a precursor match by its smallest PPM error over the isotope window,
/// `1 - min_ppm / 50`, with errors beyond 50 PPM scoring zero.
pub fn precursor_score(peptide_mass: f64, glycan_mass: f64, precursor_mass: f64, isotope_count: u32) -> f64 {
    let base = peptide_mass + glycan_mass;
    let min_ppm = (0..=isotope_count)
        .map(|i| ppm_error(base + i as f64 * ION_MASS, precursor_mass))
        .fold(PRECURSOR_PPM_CEILING, f64::min);
    1.0 - min_ppm / PRECURSOR_PPM_CEILING
}

/// Matched evidence for one peptide and glycan composition within a spectrum.
///
/// Peptide evidence is kept per site, glycan evidence per isomer and category.
#[derive(Debug, Default, Clone)]
pub struct EvidenceCollector {
    pub peptide: BTreeMap<usize, f64>,
    pub core: BTreeMap<GlycanState, f64>,
    pub branch: BTreeMap<GlycanState, f64>,
    pub terminal: BTreeMap<GlycanState, f64>,
}

impl EvidenceCollector {
    pub fn clear(&mut self) {
        self.peptide.clear();
        self.core.clear();
        self.branch.clear();
        self.terminal.clear();
    }

    /// The isomer with the most core, branch and terminal evidence and that total.
    /// Ties keep the first isomer in state order.
    pub fn best_isomer(&self) -> Option<(GlycanState, f64)> {
        let mut best: Option<(GlycanState, f64)> = None;
        let mut best_value = 0.0;
        for (isomer, core) in self.core.iter() {
            let value = core
                + self.branch.get(isomer).copied().unwrap_or_default()
                + self.terminal.get(isomer).copied().unwrap_or_default();
            if value > best_value {
                best_value = value;
                best = Some((*isomer, value));
            }
        }
        best
    }

    /// The score vector for `site`, or `None` if the site has no peptide evidence or
    /// no isomer has glycan evidence
    pub fn score(&self, site: usize, oxonium: f64, scale: f64) -> Option<[f64; 5]> {
        let peptide = *self.peptide.get(&site)?;
        let (isomer, _) = self.best_isomer()?;
        let core = self.core.get(&isomer).copied().unwrap_or_default();
        let branch = self.branch.get(&isomer).copied().unwrap_or_default();
        let terminal = self.terminal.get(&isomer).copied().unwrap_or_default();
        Some([
            core / scale,
            branch / scale,
            terminal / scale,
            oxonium / scale,
            peptide / scale,
        ])
    }
}

/// Collects a spectrum's candidate results and selects the ones to report.
#[derive(Debug, Clone)]
pub struct ResultCollector {
    mode: SearchMode,
    results: Vec<SearchResult>,
    best: f64,
}

impl ResultCollector {
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            results: Vec::new(),
            best: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Offer a candidate. In decoy mode every candidate is kept. In target mode only
    /// candidates tied with the best summed score so far are kept.
    pub fn push(&mut self, result: SearchResult) {
        match self.mode {
            SearchMode::Decoy => self.results.push(result),
            SearchMode::Target => {
                let total = result.score_sum();
                if total > self.best {
                    self.best = total;
                    self.results.clear();
                    self.results.push(result);
                } else if total == self.best {
                    self.results.push(result);
                }
            }
        }
    }

    /// Pick the results to report.
    ///
    /// Target mode keeps the results tied on raw score, then those tied on precursor
    /// score. Both modes keep at most [`MAX_HITS`], best raw score first.
    pub fn finish(self) -> Vec<SearchResult> {
        let mut results = self.results;
        if self.mode == SearchMode::Target && !results.is_empty() {
            let best_raw = results
                .iter()
                .map(|r| r.raw_score())
                .fold(f64::NEG_INFINITY, f64::max);
            results.retain(|r| r.raw_score() >= best_raw);
            let best_precursor = results
                .iter()
                .map(|r| r.extra_score(ScoreType::Precursor))
                .fold(f64::NEG_INFINITY, f64::max);
            results.retain(|r| r.extra_score(ScoreType::Precursor) >= best_precursor);
        }
        results.sort_by(|a, b| b.raw_score().total_cmp(&a.raw_score()));
        results.truncate(MAX_HITS);
        results
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn result(peptide: &str, score: [f64; 5], precursor: f64) -> SearchResult {
        let mut r = SearchResult::new(1, peptide.to_string(), "GlcNAc-2-".to_string(), 0, score, ScoringMode::Simple);
        r.set_extra_score(ScoreType::Precursor, precursor);
        r
    }

    #[test]
    fn test_precursor_score() {
        let score = precursor_score(1000.0, 500.0, 1500.0, 0);
        assert!((score - 1.0).abs() < 1e-12);
        let off = 1500.0 * 25.0 / 1e6;
        let score = precursor_score(1000.0, 500.0 - off, 1500.0, 0);
        assert!((score - 0.5).abs() < 1e-3);
        assert_eq!(precursor_score(1000.0, 400.0, 1500.0, 0), 0.0);
        let shifted = precursor_score(1000.0, 500.0 - ION_MASS, 1500.0, 1);
        assert!((shifted - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_target_selection() {
        let mut collector = ResultCollector::new(SearchMode::Target);
        collector.push(result("A", [1.0, 0.0, 0.0, 1.0, 1.0], 0.9));
        collector.push(result("B", [2.0, 0.0, 0.0, 1.0, 1.0], 0.5));
        collector.push(result("C", [1.0, 1.0, 0.0, 1.0, 1.0], 0.8));
        collector.push(result("D", [1.0, 0.0, 0.0, 1.0, 0.5], 1.0));
        assert_eq!(collector.len(), 2);
        let results = collector.finish();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].peptide, "C");
    }

    #[test]
    fn test_decoy_cap() {
        let mut collector = ResultCollector::new(SearchMode::Decoy);
        for i in 0..30 {
            collector.push(result(&format!("P{i}"), [i as f64, 0.0, 0.0, 0.0, 1.0], 0.0));
        }
        let results = collector.finish();
        assert_eq!(results.len(), MAX_HITS);
        assert_eq!(results[0].peptide, "P29");
        assert_eq!(results[MAX_HITS - 1].peptide, "P10");
    }

    #[test]
    fn test_best_isomer() {
        let mut evidence = EvidenceCollector::default();
        let a = GlycanState::root();
        let b = GlycanState::from_id("1 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0").unwrap();
        evidence.core.insert(a, 10.0);
        evidence.core.insert(b, 5.0);
        evidence.terminal.insert(b, 6.0);
        evidence.peptide.insert(3, 20.0);
        assert_eq!(evidence.best_isomer(), Some((b, 11.0)));
        let score = evidence.score(3, 4.0, 100.0).unwrap();
        assert_eq!(score, [0.05, 0.0, 0.06, 0.04, 0.2]);
        assert!(evidence.score(1, 4.0, 100.0).is_none());
        assert!((ScoringMode::Weighted.raw_score(&[1.0, 1.0, 1.0, 0.5, 0.5]) - 2.0).abs() < 1e-12);
    }
}
