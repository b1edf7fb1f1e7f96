//! Monosaccharide residues and glycan compositions.
//!
//! A [`Composition`] is an order-free count of monosaccharides. Its canonical
//! name is written as `Name-Count-` pairs in a fixed monosaccharide order, e.g.
//! `GlcNAc-4-Man-3-Fuc-1-`, which is also the key glycan databases are indexed by.
use std::fmt::{self, Display};
use std::ops::Index;
use std::str::FromStr;

use thiserror::Error;

/// Monoisotopic residue mass of N-acetylhexosamine
pub const HEXNAC: f64 = 203.0794;
/// Monoisotopic residue mass of a hexose
pub const HEX: f64 = 162.0528;
/// Monoisotopic residue mass of fucose
pub const FUC: f64 = 146.0579;
/// Monoisotopic residue mass of N-acetylneuraminic acid
pub const NEUAC: f64 = 291.0954;
/// Monoisotopic residue mass of N-glycolylneuraminic acid
pub const NEUGC: f64 = 307.0903;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    #[error("Unknown monosaccharide {0:?}")]
    UnknownMonosaccharide(String),
    #[error("Could not parse the count {count:?} for {sugar} in {name:?}")]
    InvalidCount {
        name: String,
        sugar: Monosaccharide,
        count: String,
    },
    #[error("{0} appears more than once in {1:?}")]
    DuplicateMonosaccharide(Monosaccharide, String),
    #[error("{0} has no count in {1:?}")]
    MissingCount(Monosaccharide, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Monosaccharide {
    GlcNAc,
    Man,
    Gal,
    Fuc,
    NeuAc,
    NeuGc,
}

impl Monosaccharide {
    /// All monosaccharides, in canonical naming order
    pub const ALL: [Monosaccharide; 6] = [
        Self::GlcNAc,
        Self::Man,
        Self::Gal,
        Self::Fuc,
        Self::NeuAc,
        Self::NeuGc,
    ];

    pub const fn mass(&self) -> f64 {
        match self {
            Self::GlcNAc => HEXNAC,
            Self::Man | Self::Gal => HEX,
            Self::Fuc => FUC,
            Self::NeuAc => NEUAC,
            Self::NeuGc => NEUGC,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::GlcNAc => "GlcNAc",
            Self::Man => "Man",
            Self::Gal => "Gal",
            Self::Fuc => "Fuc",
            Self::NeuAc => "NeuAc",
            Self::NeuGc => "NeuGc",
        }
    }

    const fn offset(&self) -> usize {
        match self {
            Self::GlcNAc => 0,
            Self::Man => 1,
            Self::Gal => 2,
            Self::Fuc => 3,
            Self::NeuAc => 4,
            Self::NeuGc => 5,
        }
    }
}

impl Display for Monosaccharide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Monosaccharide {
    type Err = CompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|m| m.name() == s)
            .copied()
            .ok_or_else(|| CompositionError::UnknownMonosaccharide(s.to_string()))
    }
}

/// A count of each monosaccharide in a glycan, without any linkage information.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Composition {
    counts: [u32; 6],
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, sugar: Monosaccharide) -> u32 {
        self.counts[sugar.offset()]
    }

    pub fn set(&mut self, sugar: Monosaccharide, count: u32) {
        self.counts[sugar.offset()] = count;
    }

    pub fn add(&mut self, sugar: Monosaccharide, count: u32) {
        self.counts[sugar.offset()] += count;
    }

    pub fn with(mut self, sugar: Monosaccharide, count: u32) -> Self {
        self.set(sugar, count);
        self
    }

    /// Iterate over the monosaccharides present, in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Monosaccharide, u32)> + '_ {
        Monosaccharide::ALL
            .iter()
            .map(|m| (*m, self.get(*m)))
            .filter(|(_, c)| *c > 0)
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// The number of HexNAc residues, which is only ever GlcNAc here
    pub fn hexnac(&self) -> u32 {
        self.get(Monosaccharide::GlcNAc)
    }

    /// The number of hexose residues, mannose and galactose together
    pub fn hex(&self) -> u32 {
        self.get(Monosaccharide::Man) + self.get(Monosaccharide::Gal)
    }

    /// The residue mass of the composition, without a reducing-end water
    pub fn mass(&self) -> f64 {
        self.iter().map(|(m, c)| m.mass() * c as f64).sum()
    }

    /// Render the canonical composition name
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Parse a canonical composition name back into a [`Composition`].
    ///
    /// The trailing `-` is optional, and an empty string is the empty composition.
    pub fn interpret(name: &str) -> Result<Self, CompositionError> {
        let mut composition = Self::default();
        let mut seen = [false; 6];
        let mut tokens = name.split('-').filter(|t| !t.is_empty());
        while let Some(token) = tokens.next() {
            let sugar: Monosaccharide = token.parse()?;
            if seen[sugar.offset()] {
                return Err(CompositionError::DuplicateMonosaccharide(
                    sugar,
                    name.to_string(),
                ));
            }
            seen[sugar.offset()] = true;
            let count = tokens
                .next()
                .ok_or_else(|| CompositionError::MissingCount(sugar, name.to_string()))?;
            let count: u32 = count.parse().map_err(|_| CompositionError::InvalidCount {
                name: name.to_string(),
                sugar,
                count: count.to_string(),
            })?;
            composition.set(sugar, count);
        }
        Ok(composition)
    }
}

impl Index<Monosaccharide> for Composition {
    type Output = u32;

    fn index(&self, index: Monosaccharide) -> &Self::Output {
        &self.counts[index.offset()]
    }
}

impl Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (sugar, count) in self.iter() {
            write!(f, "{sugar}-{count}-")?;
        }
        Ok(())
    }
}

impl FromStr for Composition {
    type Err = CompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::interpret(s)
    }
}

impl FromIterator<(Monosaccharide, u32)> for Composition {
    fn from_iter<T: IntoIterator<Item = (Monosaccharide, u32)>>(iter: T) -> Self {
        let mut this = Self::default();
        for (sugar, count) in iter {
            this.add(sugar, count);
        }
        this
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_name() {
        let comp = Composition::new()
            .with(Monosaccharide::GlcNAc, 4)
            .with(Monosaccharide::Man, 3)
            .with(Monosaccharide::Fuc, 1);
        assert_eq!(comp.name(), "GlcNAc-4-Man-3-Fuc-1-");
        assert_eq!(Composition::new().name(), "");
    }

    #[test]
    fn test_interpret() {
        let comp = Composition::interpret("GlcNAc-5-Man-3-Gal-2-NeuAc-1-").unwrap();
        assert_eq!(comp.hexnac(), 5);
        assert_eq!(comp.hex(), 5);
        assert_eq!(comp[Monosaccharide::NeuAc], 1);
        assert_eq!(comp.name(), "GlcNAc-5-Man-3-Gal-2-NeuAc-1-");

        let comp2: Composition = "Man-3-GlcNAc-5-NeuAc-1-Gal-2".parse().unwrap();
        assert_eq!(comp, comp2);

        assert!(Composition::interpret("").unwrap().is_empty());
    }

    #[test]
    fn test_interpret_errors() {
        assert!(matches!(
            Composition::interpret("Xyl-1-"),
            Err(CompositionError::UnknownMonosaccharide(_))
        ));
        assert!(matches!(
            Composition::interpret("Man-x-"),
            Err(CompositionError::InvalidCount { .. })
        ));
        assert!(matches!(
            Composition::interpret("Man-1-Man-2-"),
            Err(CompositionError::DuplicateMonosaccharide(Monosaccharide::Man, _))
        ));
        assert!(matches!(
            Composition::interpret("Man-"),
            Err(CompositionError::MissingCount(Monosaccharide::Man, _))
        ));
    }

    #[test]
    fn test_mass() {
        let comp = Composition::interpret("GlcNAc-2-Man-3-").unwrap();
        let expected = 2.0 * HEXNAC + 3.0 * HEX;
        assert!((comp.mass() - expected).abs() < 1e-9);
        assert_eq!(Composition::new().mass(), 0.0);
    }
}
