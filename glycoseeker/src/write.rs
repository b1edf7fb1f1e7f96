use std::fs;
use std::io::{self, Write};

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

use glycoseek::{ScoreType, SearchResult};

use crate::args::ReportFormat;

pub const CSV_HEADER: &str = "scan,peptide,glycan,site,score,precursor_score,elution_score,decoy";

/// One line of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow<'a> {
    pub scan: usize,
    pub peptide: &'a str,
    pub glycan: &'a str,
    pub site: usize,
    pub score: f64,
    pub precursor_score: f64,
    pub elution_score: f64,
    pub decoy: bool,
}

impl<'a> ReportRow<'a> {
    pub fn new(result: &'a SearchResult, decoy: bool) -> Self {
        Self {
            scan: result.scan,
            peptide: &result.peptide,
            glycan: &result.glycan,
            site: result.site,
            score: result.final_score(),
            precursor_score: result.extra_score(ScoreType::Precursor),
            elution_score: result.extra_score(ScoreType::Elution),
            decoy,
        }
    }

    fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(
            writer,
            "{},{},{},{},{:.6},{:.6},{:.6},{}",
            self.scan,
            self.peptide,
            self.glycan,
            self.site,
            self.score,
            self.precursor_score,
            self.elution_score,
            self.decoy
        )
    }
}

/// Target rows followed by decoy rows, each ordered by scan then descending score
pub fn collate_rows<'a>(targets: &'a [SearchResult], decoys: &'a [SearchResult]) -> Vec<ReportRow<'a>> {
    let order = |a: &ReportRow, b: &ReportRow| {
        a.scan
            .cmp(&b.scan)
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| a.peptide.cmp(b.peptide))
            .then_with(|| a.glycan.cmp(b.glycan))
    };
    let mut target_rows: Vec<_> = targets.iter().map(|r| ReportRow::new(r, false)).collect();
    target_rows.sort_by(order);
    let mut decoy_rows: Vec<_> = decoys.iter().map(|r| ReportRow::new(r, true)).collect();
    decoy_rows.sort_by(order);
    target_rows.extend(decoy_rows);
    target_rows
}

pub fn write_rows<W: Write>(mut writer: W, rows: &[ReportRow], format: ReportFormat) -> io::Result<()> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, rows)?;
            writeln!(writer)?;
        }
        ReportFormat::Csv | ReportFormat::CsvGz => {
            writeln!(writer, "{CSV_HEADER}")?;
            for row in rows {
                row.write_csv(&mut writer)?;
            }
        }
    }
    writer.flush()
}

/// Write the report to `output_file`, or to STDOUT if it is `-`
pub fn write_report(output_file: &str, targets: &[SearchResult], decoys: &[SearchResult]) -> io::Result<()> {
    let rows = collate_rows(targets, decoys);
    if output_file == "-" {
        let stdout = io::stdout();
        return write_rows(io::BufWriter::new(stdout.lock()), &rows, ReportFormat::Csv);
    }
    let handle = io::BufWriter::new(fs::File::create(output_file)?);
    match ReportFormat::infer(output_file) {
        ReportFormat::CsvGz => {
            let mut encoder = GzEncoder::new(handle, Compression::best());
            write_rows(&mut encoder, &rows, ReportFormat::CsvGz)?;
            encoder.finish()?.flush()
        }
        format => write_rows(handle, &rows, format),
    }
}
