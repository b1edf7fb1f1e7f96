//! Score glycopeptide candidates against the fragment peaks of one spectrum.
//!
//! A spectrum must first show glycan oxonium ions. Each candidate peptide and glycan
//! composition then needs backbone fragment evidence at one of its sequons and glycan
//! core fragment evidence for at least one isomer of the composition before it is
//! scored. See [`SpectrumMatcher::search`].
use std::collections::HashMap;

use mzpeaks::CentroidPeak;
use tracing::trace;

use crate::glycan::{GlycanDatabase, GlycanState, SubsetCategory};
use crate::index::{BucketIndex, IndexedValue, SortedIndex, ToleranceSearch};
use crate::mass::{mass_charge_ratio, neutral_mass, peptide_mass, WATER};
use crate::monosaccharide::{HEX, HEXNAC};
use crate::peptide::{find_n_glycan_sites, FragmentMasses};
use crate::precursor::MatchResultStore;
use crate::result::{
    precursor_score, EvidenceCollector, ResultCollector, ScoreType, ScoringMode, SearchMode,
    SearchResult,
};
use crate::spectrum::Spectrum;
use crate::tolerance::{self, Tolerance, ToleranceError};

/// Neutral masses of the diagnostic glycan oxonium ions
pub const OXONIUM_MASSES: [f64; 4] = [
    HEXNAC,
    HEXNAC - WATER,
    HEXNAC - 2.0 * WATER,
    HEXNAC + HEX,
];

/// Peaks indexed by m/z. Bucketed when the tolerance is absolute.
#[derive(Debug, Clone)]
pub enum PeakIndex {
    Bucketed(BucketIndex<CentroidPeak>),
    Sorted(SortedIndex<CentroidPeak>),
}

impl PeakIndex {
    pub fn new(peaks: &[CentroidPeak], tolerance: Tolerance) -> Self {
        let entries = peaks.iter().map(|p| (p.mz, p.clone()));
        match BucketIndex::new(entries, tolerance) {
            Ok(index) => Self::Bucketed(index),
            Err(_) => Self::Sorted(SortedIndex::new(
                peaks.iter().map(|p| (p.mz, p.clone())),
                tolerance,
            )),
        }
    }

    /// The most intense peak within tolerance of `mz`
    pub fn most_intense(&self, mz: f64) -> Option<&CentroidPeak> {
        self.query(mz)
            .into_iter()
            .max_by(|a, b| a.intensity.total_cmp(&b.intensity))
    }
}

impl ToleranceSearch<CentroidPeak> for PeakIndex {
    fn search(&self, target: f64) -> Vec<&IndexedValue<CentroidPeak>> {
        match self {
            Self::Bucketed(index) => index.search(target),
            Self::Sorted(index) => index.search(target),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Bucketed(index) => index.len(),
            Self::Sorted(index) => index.len(),
        }
    }
}

#[derive(Debug, Clone)]
struct FragmentIndex {
    with_glycan: SortedIndex,
    without_glycan: SortedIndex,
}

impl FragmentIndex {
    fn new(fragments: FragmentMasses, tolerance: Tolerance) -> Self {
        Self {
            with_glycan: SortedIndex::from_values(fragments.with_glycan, tolerance),
            without_glycan: SortedIndex::from_values(fragments.without_glycan, tolerance),
        }
    }
}

/// Does any charge state up to `max_charge` put `peak` within tolerance of a value
/// in `index` once `offset` is removed from its neutral mass?
fn matches_any_charge(index: &SortedIndex, peak: &CentroidPeak, offset: f64, max_charge: i32) -> bool {
    (1..=max_charge).any(|charge| {
        let mass = neutral_mass(peak.mz, charge);
        if mass <= offset {
            return false;
        }
        let matcher = index.matcher().for_charge(mass, charge);
        index.contains_with(&matcher, mass - offset)
    })
}

/// Scores candidates for one spectrum at a time. Each worker owns one, since it
/// caches fragment and subset mass indices across spectra.
#[derive(Debug, Clone)]
pub struct SpectrumMatcher<'a> {
    database: &'a GlycanDatabase,
    tolerance: Tolerance,
    isotope_count: u32,
    scoring: ScoringMode,
    mode: SearchMode,
    fragments: HashMap<(String, usize), FragmentIndex>,
    subsets: HashMap<(GlycanState, SubsetCategory), SortedIndex>,
    peptide_masses: HashMap<String, Option<f64>>,
}

impl<'a> SpectrumMatcher<'a> {
    pub fn new(
        database: &'a GlycanDatabase,
        tolerance: Tolerance,
        isotope_count: u32,
    ) -> Result<Self, ToleranceError> {
        let tolerance = tolerance::validate(tolerance)?;
        Ok(Self {
            database,
            tolerance,
            isotope_count,
            scoring: ScoringMode::default(),
            mode: SearchMode::default(),
            fragments: HashMap::new(),
            subsets: HashMap::new(),
            peptide_masses: HashMap::new(),
        })
    }

    pub fn with_scoring(mut self, scoring: ScoringMode) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    fn peptide_mass(&mut self, peptide: &str) -> Option<f64> {
        if let Some(mass) = self.peptide_masses.get(peptide) {
            return *mass;
        }
        let mass = peptide_mass(peptide).ok();
        self.peptide_masses.insert(peptide.to_string(), mass);
        mass
    }

    fn fragments(&mut self, peptide: &str, site: usize) -> Option<&FragmentIndex> {
        let key = (peptide.to_string(), site);
        if !self.fragments.contains_key(&key) {
            let masses = FragmentMasses::new(peptide, site).ok()?;
            self.fragments
                .insert(key.clone(), FragmentIndex::new(masses, self.tolerance));
        }
        self.fragments.get(&key)
    }

    fn subset_index(&mut self, isomer: &GlycanState, category: SubsetCategory) -> Option<&SortedIndex> {
        let database = self.database;
        let masses = database.subset_masses(isomer, category)?;
        let tolerance = self.tolerance;
        let index = self
            .subsets
            .entry((*isomer, category))
            .or_insert_with(|| SortedIndex::from_values(masses.iter().copied(), tolerance));
        Some(&*index)
    }

    /// The most intense peak for each oxonium ion at each fragment charge
    fn oxonium_evidence<'p>(peaks: &'p PeakIndex, max_charge: i32) -> Vec<&'p CentroidPeak> {
        let mut matched = Vec::new();
        for mass in OXONIUM_MASSES {
            for charge in 1..=max_charge {
                if let Some(peak) = peaks.most_intense(mass_charge_ratio(mass, charge)) {
                    matched.push(peak);
                }
            }
        }
        matched
    }

    /// Backbone fragment evidence for `peptide` carrying a glycan of `glycan_mass` at `site`
    fn peptide_evidence(
        &mut self,
        spectrum: &Spectrum,
        peptide: &str,
        site: usize,
        glycan_mass: f64,
    ) -> Option<f64> {
        let scoring = self.scoring;
        let max_charge = spectrum.max_fragment_charge();
        let fragments = self.fragments(peptide, site)?;
        let mut matched = Vec::new();
        for peak in spectrum.peaks.iter() {
            if matches_any_charge(&fragments.with_glycan, peak, glycan_mass, max_charge) {
                matched.push(peak);
            }
            if matches_any_charge(&fragments.without_glycan, peak, 0.0, max_charge) {
                matched.push(peak);
            }
        }
        (!matched.is_empty()).then(|| scoring.peak_value(matched))
    }

    /// Glycan fragment evidence for one isomer's subset masses in `category`
    fn subset_evidence(
        &mut self,
        spectrum: &Spectrum,
        isomer: &GlycanState,
        category: SubsetCategory,
        peptide_mass: f64,
    ) -> Option<f64> {
        let scoring = self.scoring;
        let max_charge = spectrum.max_fragment_charge();
        let index = self.subset_index(isomer, category)?;
        let matched: Vec<&CentroidPeak> = spectrum
            .peaks
            .iter()
            .filter(|peak| matches_any_charge(index, peak, peptide_mass, max_charge))
            .collect();
        (!matched.is_empty()).then(|| scoring.peak_value(matched))
    }

    /// Collect glycan evidence for every isomer of `glycan`. Isomers without core
    /// evidence are skipped. Returns whether any isomer had core evidence.
    fn glycan_evidence(
        &mut self,
        spectrum: &Spectrum,
        glycan: &str,
        peptide_mass: f64,
        evidence: &mut EvidenceCollector,
    ) -> bool {
        let database = self.database;
        for isomer in database.isomers.isomers(glycan) {
            let Some(core) =
                self.subset_evidence(spectrum, isomer, SubsetCategory::Core, peptide_mass)
            else {
                continue;
            };
            evidence.core.insert(*isomer, core);
            if let Some(branch) =
                self.subset_evidence(spectrum, isomer, SubsetCategory::Branch, peptide_mass)
            {
                evidence.branch.insert(*isomer, branch);
            }
            if let Some(terminal) =
                self.subset_evidence(spectrum, isomer, SubsetCategory::Terminal, peptide_mass)
            {
                evidence.terminal.insert(*isomer, terminal);
            }
        }
        !evidence.core.is_empty()
    }

    /// Score every candidate in `candidates` against `spectrum`.
    ///
    /// Returns nothing when the spectrum has no peaks or no oxonium ions. In
    /// [`SearchMode::Decoy`] every scored candidate is kept, in [`SearchMode::Target`]
    /// only the best. At most [`MAX_HITS`](crate::result::MAX_HITS) are returned.
    pub fn search(&mut self, spectrum: &Spectrum, candidates: &MatchResultStore) -> Vec<SearchResult> {
        if spectrum.is_empty() || candidates.is_empty() {
            return Vec::new();
        }
        let span = tracing::debug_span!("search", scan = spectrum.scan);
        let _entered = span.enter();

        let peaks = PeakIndex::new(&spectrum.peaks, self.tolerance);
        let oxonium_peaks = Self::oxonium_evidence(&peaks, spectrum.max_fragment_charge());
        if oxonium_peaks.is_empty() {
            trace!("No oxonium ions found");
            return Vec::new();
        }
        let oxonium = self.scoring.peak_value(oxonium_peaks);
        if oxonium <= 0.0 {
            return Vec::new();
        }
        let scale = match self.scoring {
            ScoringMode::Simple => 100.0,
            ScoringMode::Weighted => self.scoring.peak_value(spectrum.peaks.iter()),
        };
        let precursor_mass = spectrum.precursor_mass();

        let mut collector = ResultCollector::new(self.mode);
        let mut evidence = EvidenceCollector::default();
        for (peptide, glycans) in candidates.iter() {
            let Some(peptide_mass) = self.peptide_mass(peptide) else {
                continue;
            };
            let sites = find_n_glycan_sites(peptide);
            if sites.is_empty() {
                continue;
            }
            for glycan in glycans.iter() {
                let Some(glycan_mass) = self.database.glycan_mass(glycan) else {
                    continue;
                };
                evidence.clear();
                for site in sites.iter().copied() {
                    if let Some(value) = self.peptide_evidence(spectrum, peptide, site, glycan_mass) {
                        evidence.peptide.insert(site, value);
                    }
                }
                if evidence.peptide.is_empty() {
                    continue;
                }
                if !self.glycan_evidence(spectrum, glycan, peptide_mass, &mut evidence) {
                    continue;
                }
                let extra = precursor_score(peptide_mass, glycan_mass, precursor_mass, self.isotope_count);
                for site in sites.iter().copied() {
                    let Some(score) = evidence.score(site, oxonium, scale) else {
                        continue;
                    };
                    let mut result = SearchResult::new(
                        spectrum.scan,
                        peptide.to_string(),
                        glycan.clone(),
                        site,
                        score,
                        self.scoring,
                    );
                    result.set_extra_score(ScoreType::Precursor, extra);
                    collector.push(result);
                }
            }
        }
        trace!("{} candidates retained", collector.len());
        collector.finish()
    }
}
