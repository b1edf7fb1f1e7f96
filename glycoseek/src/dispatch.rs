//! Run precursor and spectrum matching over many spectra on a pool of worker threads.
//!
//! Spectra are fed to the workers through a channel and the channel closing ends the
//! run. Every worker clones its own [`PrecursorMatcher`] and [`SpectrumMatcher`] from
//! the dispatcher's, so the only shared state besides the channel is the output the
//! workers merge into once they have drained it.
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver};
use tracing::{debug, info, trace, warn};

use crate::glycan::GlycanDatabase;
use crate::matcher::SpectrumMatcher;
use crate::params::{ParameterError, SearchParameters};
use crate::precursor::PrecursorMatcher;
use crate::progress::DispatchProgress;
use crate::result::{SearchMode, SearchResult};
use crate::spectrum::Spectrum;

/// The results of a dispatch run. Results are grouped by worker, so their order
/// across spectra is not the input order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchOutput {
    pub results: Vec<SearchResult>,
    pub progress: DispatchProgress,
}

impl DispatchOutput {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    fn merge(&mut self, results: Vec<SearchResult>, progress: DispatchProgress) {
        self.results.extend(results);
        self.progress += progress;
    }
}

enum SpectrumOutcome {
    NoCandidates,
    Searched(Vec<SearchResult>),
}

/// Searches spectra against a glycan database and a peptide list
#[derive(Debug, Clone)]
pub struct Dispatcher<'a> {
    parameters: SearchParameters,
    precursor: PrecursorMatcher<'a>,
    matcher: SpectrumMatcher<'a>,
}

impl<'a> Dispatcher<'a> {
    /// Validate `parameters` and index `peptides` by mass
    pub fn new(
        database: &'a GlycanDatabase,
        peptides: &[String],
        parameters: SearchParameters,
    ) -> Result<Self, ParameterError> {
        parameters.validate()?;
        let mut precursor = PrecursorMatcher::new(parameters.precursor_tolerance, &database.isomers)
            .map_err(|e| ParameterError::Tolerance("precursor", e))?;
        let n_peptides = precursor.init(peptides);
        debug!("Indexed {n_peptides} peptides by mass");
        let matcher = SpectrumMatcher::new(
            database,
            parameters.fragment_tolerance,
            parameters.isotope_count,
        )
        .map_err(|e| ParameterError::Tolerance("fragment", e))?
        .with_scoring(parameters.scoring);
        Ok(Self {
            parameters,
            precursor,
            matcher,
        })
    }

    pub fn parameters(&self) -> &SearchParameters {
        &self.parameters
    }

    /// Search `spectra` keeping only each spectrum's best matches
    pub fn dispatch(&self, spectra: &[Spectrum]) -> DispatchOutput {
        self.run(spectra, SearchMode::Target)
    }

    /// Search `spectra` keeping every scored match, for building a null distribution
    pub fn decoy_dispatch(&self, spectra: &[Spectrum]) -> DispatchOutput {
        self.run(spectra, SearchMode::Decoy)
    }

    fn search_spectrum(
        &self,
        precursor: &PrecursorMatcher<'_>,
        matcher: &mut SpectrumMatcher<'_>,
        spectrum: &Spectrum,
    ) -> SpectrumOutcome {
        if spectrum.precursor_charge < 1 {
            trace!("Skipping scan {} without a precursor charge", spectrum.scan);
            return SpectrumOutcome::NoCandidates;
        }
        let candidates = precursor.match_precursor(
            spectrum.precursor_mass(),
            spectrum.precursor_charge,
            self.parameters.isotope_count,
        );
        if candidates.is_empty() {
            return SpectrumOutcome::NoCandidates;
        }
        let mut spectrum = spectrum.clone();
        spectrum.normalize();
        SpectrumOutcome::Searched(matcher.search(&spectrum, &candidates))
    }

    fn worker(&self, receiver: Receiver<&Spectrum>, mode: SearchMode, output: &Mutex<DispatchOutput>) {
        let precursor = self.precursor.clone();
        let mut matcher = self.matcher.clone().with_mode(mode);

        let mut results = Vec::new();
        let mut progress = DispatchProgress::default();
        for spectrum in receiver.iter() {
            progress.spectra += 1;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.search_spectrum(&precursor, &mut matcher, spectrum)
            }));
            match outcome {
                Ok(SpectrumOutcome::NoCandidates) => {}
                Ok(SpectrumOutcome::Searched(hits)) => {
                    progress.precursor_matched += 1;
                    if !hits.is_empty() {
                        progress.spectra_with_hits += 1;
                        progress.results += hits.len();
                        results.extend(hits);
                    }
                }
                Err(_) => {
                    warn!("Failed to search scan {}, skipping it", spectrum.scan);
                    progress.failed += 1;
                }
            }
        }
        trace!(
            "{:?} finished after {} spectra",
            thread::current().id(),
            progress.spectra
        );
        let mut output = output.lock().unwrap_or_else(|e| e.into_inner());
        output.merge(results, progress);
    }

    fn run(&self, spectra: &[Spectrum], mode: SearchMode) -> DispatchOutput {
        let started = Instant::now();
        let n_workers = self.parameters.threads.max(1);
        info!(
            "Searching {} spectra in {mode:?} mode with {n_workers} workers",
            spectra.len()
        );

        let output = Mutex::new(DispatchOutput::default());
        let (sender, receiver) = bounded(n_workers * 4);
        thread::scope(|scope| {
            for _ in 0..n_workers {
                let receiver = receiver.clone();
                let output = &output;
                scope.spawn(move || self.worker(receiver, mode, output));
            }
            drop(receiver);
            for spectrum in spectra {
                if let Err(e) = sender.send(spectrum) {
                    warn!("Failed to send spectrum: {}", e);
                    break;
                }
            }
            drop(sender);
        });

        let output = output.into_inner().unwrap_or_else(|e| e.into_inner());
        let elapsed = started.elapsed();
        let spectra_per_second = output.progress.spectra as f64 / elapsed.as_secs_f64().max(1e-9);
        info!(
            "Elapsed Time: {:0.3?} ({:0.2} spectra/sec)",
            elapsed, spectra_per_second
        );
        info!(
            "{} of {} spectra had precursor candidates, {} had matches ({} results)",
            output.progress.precursor_matched,
            output.progress.spectra,
            output.progress.spectra_with_hits,
            output.progress.results
        );
        output
    }
}

/// Search `spectra` in target mode
pub fn dispatch(
    database: &GlycanDatabase,
    peptides: &[String],
    spectra: &[Spectrum],
    parameters: SearchParameters,
) -> Result<DispatchOutput, ParameterError> {
    Ok(Dispatcher::new(database, peptides, parameters)?.dispatch(spectra))
}

/// Search `spectra` in decoy mode
pub fn decoy_dispatch(
    database: &GlycanDatabase,
    peptides: &[String],
    spectra: &[Spectrum],
    parameters: SearchParameters,
) -> Result<DispatchOutput, ParameterError> {
    Ok(Dispatcher::new(database, peptides, parameters)?.decoy_dispatch(spectra))
}
