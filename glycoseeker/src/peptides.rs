use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use itertools::Itertools;
use tracing::{debug, warn};

use glycoseek::peptide::{contains_n_glycan_site, reverse_decoy};

/// Read one peptide sequence per line. Blank lines and `#` comments are ignored,
/// sequences are upper-cased, duplicates are dropped and so are peptides without an
/// N-glycosylation sequon.
pub fn read_peptides<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        lines.push(line.to_ascii_uppercase());
    }
    let n_read = lines.len();
    let peptides: Vec<String> = lines
        .into_iter()
        .unique()
        .filter(|p| contains_n_glycan_site(p))
        .collect();
    debug!(
        "Read {n_read} peptides, {} unique with an N-glycosylation site",
        peptides.len()
    );
    Ok(peptides)
}

pub fn load_peptides<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let handle = io::BufReader::new(fs::File::open(path)?);
    read_peptides(handle)
}

/// Build decoys by reversing each target peptide
pub fn make_decoys(peptides: &[String]) -> Vec<String> {
    peptides
        .iter()
        .filter_map(|p| match reverse_decoy(p) {
            Ok(decoy) => Some(decoy),
            Err(e) => {
                warn!("No decoy for {p}: {e}");
                None
            }
        })
        .unique()
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_peptides() -> io::Result<()> {
        let text = "# targets\nAANGTK\n\nlcnvsk\nPEPTIDE\nAANGTK\n";
        let peptides = read_peptides(io::Cursor::new(text))?;
        assert_eq!(peptides, vec!["AANGTK".to_string(), "LCNVSK".to_string()]);
        let decoys = make_decoys(&peptides);
        assert_eq!(decoys, vec!["KANGTA".to_string(), "KCNVSL".to_string()]);

        let decoys = make_decoys(&["AANGTK".to_string(), "KÄNGTR".to_string()]);
        assert_eq!(decoys, vec!["KANGTA".to_string()]);
        Ok(())
    }
}
