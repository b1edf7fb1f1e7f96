//! Enumerate N-glycan structures and identify glycopeptides in tandem mass spectra.
//!
//! A search starts by building a [`GlycanDatabase`] with [`build`], then hands the
//! database, a peptide list and the spectra to a [`Dispatcher`]. Each spectrum is
//! narrowed to candidate peptide and glycan pairs by precursor mass with a
//! [`PrecursorMatcher`] and those candidates are scored against the fragment peaks
//! by a [`SpectrumMatcher`].
pub mod coelution;
pub mod dispatch;
pub mod glycan;
pub mod index;
pub mod mass;
pub mod matcher;
pub mod monosaccharide;
pub mod params;
pub mod peptide;
pub mod precursor;
pub mod progress;
pub mod result;
pub mod spectrum;
pub mod tolerance;

pub use coelution::CoElution;
pub use dispatch::{decoy_dispatch, dispatch, DispatchOutput, Dispatcher};
pub use glycan::{build, GlycanBounds, GlycanDatabase, GlycanState};
pub use matcher::SpectrumMatcher;
pub use monosaccharide::{Composition, Monosaccharide};
pub use params::{ParameterError, SearchParameters};
pub use precursor::{MatchResultStore, PrecursorMatcher};
pub use progress::DispatchProgress;
pub use result::{ScoreType, ScoringMode, SearchMode, SearchResult};
pub use spectrum::Spectrum;
pub use tolerance::{Tolerance, ToleranceError};
