//! Peptide, fragment ion and m/z mass arithmetic.
use thiserror::Error;

/// The mass of a charge carrier, used to convert between m/z and neutral mass
pub const ION_MASS: f64 = 1.007825;
pub const WATER: f64 = 18.0105;

pub const HYDROGEN: f64 = 1.007825;
pub const CARBON: f64 = 12.0;
pub const NITROGEN: f64 = 14.003074;
pub const OXYGEN: f64 = 15.99491463;

/// Fixed carbamidomethylation of cysteine
pub const CARBAMIDOMETHYL: f64 = 57.02146;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MassError {
    #[error("Unknown amino acid residue {0:?}")]
    UnknownResidue(char),
}

/// The monoisotopic residue mass of an amino acid. Cysteine carries a fixed
/// carbamidomethyl modification.
pub fn residue_mass(residue: char) -> Result<f64, MassError> {
    let mass = match residue.to_ascii_uppercase() {
        'A' => 71.0371,
        'C' => 103.00919 + CARBAMIDOMETHYL,
        'D' => 115.02694,
        'E' => 129.04259,
        'F' => 147.06841,
        'G' => 57.02146,
        'H' => 137.05891,
        'I' => 113.08406,
        'K' => 128.09496,
        'L' => 113.08406,
        'M' => 131.04049,
        'N' => 114.04293,
        'P' => 97.05276,
        'Q' => 128.05858,
        'R' => 156.10111,
        'S' => 87.03203,
        'T' => 101.04768,
        'V' => 99.06841,
        'W' => 186.07931,
        'Y' => 163.06333,
        _ => return Err(MassError::UnknownResidue(residue)),
    };
    Ok(mass)
}

/// The residue masses of every position of `sequence`
pub fn residue_masses(sequence: &str) -> Result<Vec<f64>, MassError> {
    sequence.chars().map(residue_mass).collect()
}

/// The neutral monoisotopic mass of an unmodified peptide, residues plus one water
pub fn peptide_mass(sequence: &str) -> Result<f64, MassError> {
    Ok(residue_masses(sequence)?.iter().sum::<f64>() + WATER)
}

/// Backbone fragment ion series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IonType {
    A,
    B,
    C,
    X,
    Y,
    Z,
}

impl IonType {
    /// The mass to add to a fragment's neutral peptide mass to reach the ion's neutral mass
    pub fn offset(&self) -> f64 {
        match self {
            Self::A => -OXYGEN * 2.0 - HYDROGEN * 2.0 - CARBON,
            Self::B => -OXYGEN - HYDROGEN * 2.0,
            Self::C => -OXYGEN + HYDROGEN + NITROGEN,
            Self::X => CARBON + OXYGEN - HYDROGEN * 2.0,
            Self::Y => 0.0,
            Self::Z => -NITROGEN - HYDROGEN * 3.0,
        }
    }

    pub fn is_n_terminal(&self) -> bool {
        matches!(self, Self::A | Self::B | Self::C)
    }
}

/// The neutral mass of a fragment ion carrying `sequence`
pub fn ion_mass(sequence: &str, ion_type: IonType) -> Result<f64, MassError> {
    Ok(peptide_mass(sequence)? + ion_type.offset())
}

/// Convert an observed m/z at `charge` into a neutral mass
#[inline]
pub fn neutral_mass(mz: f64, charge: i32) -> f64 {
    (mz - ION_MASS) * charge as f64
}

/// Convert a neutral mass into its m/z at `charge`
#[inline]
pub fn mass_charge_ratio(mass: f64, charge: i32) -> f64 {
    (mass + ION_MASS * charge as f64) / charge as f64
}

/// The absolute error between two masses in parts-per-million of `reference`
#[inline]
pub fn ppm_error(reference: f64, observed: f64) -> f64 {
    (reference - observed).abs() / reference * 1e6
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_peptide_mass() {
        let mass = peptide_mass("GG").unwrap();
        assert!((mass - (2.0 * 57.02146 + WATER)).abs() < 1e-9);
        let cys = peptide_mass("C").unwrap();
        assert!((cys - (160.03065 + WATER)).abs() < 1e-6);
        assert_eq!(peptide_mass("gg").unwrap(), mass);
        assert_eq!(peptide_mass("GXG"), Err(MassError::UnknownResidue('X')));
    }

    #[test]
    fn test_ion_offsets() {
        let y = ion_mass("PEPTIDE", IonType::Y).unwrap();
        let b = ion_mass("PEPTIDE", IonType::B).unwrap();
        assert!((y - b - WATER).abs() < 1e-3);
        let c = ion_mass("PEPTIDE", IonType::C).unwrap();
        assert!((c - b - 17.026549).abs() < 1e-4);
        let z = ion_mass("PEPTIDE", IonType::Z).unwrap();
        assert!((y - z - 17.026549).abs() < 1e-4);
        assert!(IonType::B.is_n_terminal());
        assert!(!IonType::Y.is_n_terminal());
    }

    #[test]
    fn test_mz_conversion() {
        let mass = 1500.0;
        for z in 1..4 {
            let mz = mass_charge_ratio(mass, z);
            assert!((neutral_mass(mz, z) - mass).abs() < 1e-9);
        }
        assert!((ppm_error(1000.0, 1000.01) - 10.0).abs() < 1e-6);
    }
}
