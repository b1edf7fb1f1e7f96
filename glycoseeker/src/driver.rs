use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use glycoseek::glycan::{BoundsError, GlycanBuilder};
use glycoseek::tolerance::{self, Tolerance};
use glycoseek::{CoElution, Dispatcher, GlycanBounds, ParameterError, SearchParameters};

use crate::args::{non_negative_int, ArgScoringMode};
use crate::peptides::{load_peptides, make_decoys};
use crate::spectra::load_spectra;
use crate::write::write_report;

#[derive(Debug, Error)]
pub enum GlycoSeekerError {
    #[error("An IO error occurred: {0}")]
    IOError(
        #[source]
        #[from]
        io::Error,
    ),
    #[error("Invalid search parameters: {0}")]
    ParameterError(
        #[source]
        #[from]
        ParameterError,
    ),
    #[error("Failed to read the configuration: {0}")]
    ConfigError(
        #[source]
        #[from]
        figment::Error,
    ),
    #[error("No peptides with an N-glycosylation site were found in {0}")]
    NoPeptides(String),
}

impl From<BoundsError> for GlycoSeekerError {
    fn from(value: BoundsError) -> Self {
        Self::ParameterError(value.into())
    }
}

/// Glycopeptide identification from tandem mass spectra.
///
/// Enumerate N-glycan structures, match every tandem spectrum in a file against
/// glycosylated target and decoy peptides, and write the scored matches.
#[derive(Parser, Debug, Clone, Deserialize, Serialize)]
#[command(author, version)]
#[serde(default)]
pub struct GlycoSeeker {
    /// The path to read the spectra from
    #[arg()]
    pub spectra_file: String,

    /// The path to read candidate peptides from, one sequence per line
    #[arg(short = 'p', long = "peptide-file")]
    pub peptide_file: PathBuf,

    /// The path to read decoy peptides from. Reversed target peptides are used if
    /// this is not given.
    #[arg(short = 'd', long = "decoy-file")]
    pub decoy_file: Option<PathBuf>,

    /// The path to write the report to, or if '-' is passed, write CSV to STDOUT.
    ///
    /// Paths ending in `.json` are written as JSON, paths ending in `.gz` as
    /// gzip-compressed CSV, and anything else as CSV.
    #[arg(short = 'o', long = "output-file", default_value = "-")]
    pub output_file: String,

    /// The path to write a log file to, in addition to STDERR
    #[arg(short = 'l', long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// A TOML configuration file to read additional parameters from.
    ///
    /// Configurations are also read from `glycoseeker.toml` in the working directory.
    /// Environment variables prefixed with `GLYCOSEEKER_` will be read too.
    #[arg(long = "config-file")]
    pub config_file: Option<PathBuf>,

    /// The number of threads to use, passing a value < 1 to use all available threads
    #[arg(
        short='t',
        long="threads",
        default_value_t=-1,
    )]
    pub threads: i32,

    /// The most HexNAc residues an enumerated glycan may have
    #[arg(long = "hexnac", default_value_t = 12, value_parser = non_negative_int)]
    pub hexnac: i64,

    /// The most hexose residues an enumerated glycan may have
    #[arg(long = "hex", default_value_t = 12, value_parser = non_negative_int)]
    pub hex: i64,

    /// The most fucose residues an enumerated glycan may have
    #[arg(long = "fuc", default_value_t = 5, value_parser = non_negative_int)]
    pub fuc: i64,

    /// The most NeuAc residues an enumerated glycan may have
    #[arg(long = "neuac", default_value_t = 4, value_parser = non_negative_int)]
    pub neuac: i64,

    /// The most NeuGc residues an enumerated glycan may have
    #[arg(long = "neugc", default_value_t = 0, value_parser = non_negative_int)]
    pub neugc: i64,

    /// The precursor mass tolerance, denoted (value)ppm or (value)da
    #[arg(
        short = 'm',
        long = "precursor-tolerance",
        default_value_t = Tolerance::PPM(10.0),
        value_parser = tolerance::parse,
    )]
    #[serde(with = "glycoseek::tolerance::text")]
    pub precursor_tolerance: Tolerance,

    /// The fragment mass tolerance, denoted (value)ppm or (value)da
    #[arg(
        short = 'f',
        long = "fragment-tolerance",
        default_value_t = Tolerance::Da(0.01),
        value_parser = tolerance::parse,
    )]
    #[serde(with = "glycoseek::tolerance::text")]
    pub fragment_tolerance: Tolerance,

    /// The number of isotope peaks below the monoisotopic peak a precursor may have been picked from
    #[arg(short = 'i', long = "isotope-count", default_value_t = 0)]
    pub isotope_count: u32,

    /// How matched fragment intensities are scored
    #[arg(short = 's', long = "scoring", default_value = "simple")]
    pub scoring: ArgScoringMode,
}

impl Default for GlycoSeeker {
    fn default() -> Self {
        let params = SearchParameters::default();
        Self {
            spectra_file: String::new(),
            peptide_file: PathBuf::new(),
            decoy_file: None,
            output_file: "-".to_string(),
            log_file: None,
            config_file: None,
            threads: -1,
            hexnac: params.bounds.hexnac as i64,
            hex: params.bounds.hex as i64,
            fuc: params.bounds.fuc as i64,
            neuac: params.bounds.neuac as i64,
            neugc: params.bounds.neugc as i64,
            precursor_tolerance: params.precursor_tolerance,
            fragment_tolerance: params.fragment_tolerance,
            isotope_count: params.isotope_count,
            scoring: ArgScoringMode::default(),
        }
    }
}

impl GlycoSeeker {
    fn num_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads as usize
        } else {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }

    /// Gather and validate the search parameters
    pub fn parameters(&self) -> Result<SearchParameters, GlycoSeekerError> {
        let bounds = GlycanBounds::new(self.hexnac, self.hex, self.fuc, self.neuac, self.neugc)?;
        let params = SearchParameters::default()
            .with_threads(self.num_threads())
            .with_bounds(bounds)
            .with_tolerances(self.precursor_tolerance, self.fragment_tolerance)
            .with_isotope_count(self.isotope_count)
            .with_scoring(self.scoring.into());
        params.validate()?;
        Ok(params)
    }

    fn load_decoys(&self, targets: &[String]) -> Result<Vec<String>, GlycoSeekerError> {
        match self.decoy_file.as_ref() {
            Some(path) => Ok(load_peptides(path)?),
            None => {
                debug!("Reversing target peptides to make decoys");
                Ok(make_decoys(targets))
            }
        }
    }

    pub fn main(&self) -> Result<(), GlycoSeekerError> {
        info!(
            "glycoseeker v{}",
            option_env!("CARGO_PKG_VERSION").unwrap_or("unknown")
        );
        info!("Spectra: {}", self.spectra_file);
        info!("Peptides: {}", self.peptide_file.display());
        info!("Output: {}", self.output_file);
        let start = Instant::now();

        let params = self.parameters()?;
        debug!("Using {} cores", params.threads);
        debug!("{params:?}");

        let targets = load_peptides(&self.peptide_file)?;
        if targets.is_empty() {
            return Err(GlycoSeekerError::NoPeptides(
                self.peptide_file.display().to_string(),
            ));
        }
        let decoys = self.load_decoys(&targets)?;
        info!("{} target and {} decoy peptides", targets.len(), decoys.len());

        let spectra = load_spectra(&self.spectra_file)?;
        let database = GlycanBuilder::new(params.bounds).build();

        let mut target_output = Dispatcher::new(&database, &targets, params)?.dispatch(&spectra);
        let mut decoy_output = Dispatcher::new(&database, &decoys, params)?.decoy_dispatch(&spectra);

        let elution = CoElution::default();
        rayon::join(
            || elution.update(&mut target_output.results),
            || elution.update(&mut decoy_output.results),
        );
        info!(
            "Target Matches: {} | Decoy Matches: {}",
            target_output.len(),
            decoy_output.len()
        );

        write_report(&self.output_file, &target_output.results, &decoy_output.results)?;
        info!("Total Elapsed Time: {:0.3?}", start.elapsed());
        Ok(())
    }
}
