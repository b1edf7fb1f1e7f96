//! N-glycosylation sequons, decoy sequences and the backbone fragments used as
//! peptide evidence.
use crate::mass::{residue_masses, IonType, MassError, WATER};

/// The backbone ion series searched as peptide evidence
pub const BACKBONE_IONS: [IonType; 4] = [IonType::B, IonType::C, IonType::Y, IonType::Z];

fn is_sequon(residues: &[u8], i: usize) -> bool {
    residues[i].eq_ignore_ascii_case(&b'N')
        && residues
            .get(i + 2)
            .is_some_and(|r| matches!(r.to_ascii_uppercase(), b'S' | b'T'))
}

/// Every position holding the N of an N-X-S/T motif
pub fn find_n_glycan_sites(sequence: &str) -> Vec<usize> {
    let residues = sequence.as_bytes();
    (0..residues.len())
        .filter(|i| is_sequon(residues, *i))
        .collect()
}

pub fn contains_n_glycan_site(sequence: &str) -> bool {
    let residues = sequence.as_bytes();
    (0..residues.len()).any(|i| is_sequon(residues, i))
}

/// Reverse a peptide to build a decoy. Residues of N-X-S/T motifs keep their
/// positions so the decoy retains the target's glycosylation sites.
pub fn reverse_decoy(sequence: &str) -> Result<String, MassError> {
    if let Some(c) = sequence.chars().find(|c| !c.is_ascii()) {
        return Err(MassError::UnknownResidue(c));
    }
    let residues = sequence.as_bytes();
    let mut fixed = vec![false; residues.len()];
    for i in 0..residues.len() {
        if is_sequon(residues, i) {
            for slot in fixed.iter_mut().skip(i).take(3) {
                *slot = true;
            }
        }
    }
    let mut movable = residues
        .iter()
        .zip(fixed.iter())
        .filter(|(_, f)| !**f)
        .map(|(r, _)| *r)
        .rev();
    Ok(residues
        .iter()
        .zip(fixed.iter())
        .map(|(r, f)| if *f { *r } else { movable.next().unwrap_or(*r) })
        .map(char::from)
        .collect())
}

/// Theoretical backbone fragment masses for a peptide glycosylated at one site.
///
/// `with_glycan` holds the fragments that span the site and therefore carry the
/// glycan, `without_glycan` those that don't. Both are sorted ascending and exclude
/// the glycan's own mass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FragmentMasses {
    pub with_glycan: Vec<f64>,
    pub without_glycan: Vec<f64>,
}

impl FragmentMasses {
    pub fn new(sequence: &str, site: usize) -> Result<Self, MassError> {
        let residues = residue_masses(sequence)?;
        let n = residues.len();
        let mut prefix = Vec::with_capacity(n + 1);
        prefix.push(0.0);
        for r in residues.iter() {
            prefix.push(prefix[prefix.len() - 1] + r);
        }
        // Neutral peptide mass of residues[start..end]
        let span = |start: usize, end: usize| prefix[end] - prefix[start] + WATER;

        let mut with_glycan = Vec::new();
        let mut without_glycan = Vec::new();

        // Cleaving before residue `cleavage` leaves residues[..cleavage] on the
        // N-terminal fragment and residues[cleavage..] on the C-terminal one
        for cleavage in 1..n {
            for ion in BACKBONE_IONS {
                let (mass, spans_site) = if ion.is_n_terminal() {
                    (span(0, cleavage), cleavage > site)
                } else {
                    (span(cleavage, n), cleavage <= site)
                };
                let dest = if spans_site {
                    &mut with_glycan
                } else {
                    &mut without_glycan
                };
                dest.push(mass + ion.offset());
            }
        }
        with_glycan.sort_by(|a, b| a.total_cmp(b));
        without_glycan.sort_by(|a, b| a.total_cmp(b));
        Ok(Self {
            with_glycan,
            without_glycan,
        })
    }
}
