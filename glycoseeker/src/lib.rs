mod args;
mod driver;
mod peptides;
mod spectra;
mod write;

pub use args::{explicit_arguments, ArgScoringMode, ReportFormat};
pub use driver::{GlycoSeeker, GlycoSeekerError};
pub use peptides::{load_peptides, make_decoys, read_peptides};
pub use spectra::{load_spectra, to_spectrum, LoadProgress};
pub use write::{collate_rows, write_report, write_rows, ReportRow, CSV_HEADER};
