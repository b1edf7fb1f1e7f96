//! The topology table of a complex N-glycan and its growth rules.
//!
//! A [`GlycanState`] is a fixed-length table of counts:
//!
//! | slots   | meaning                         |
//! |---------|---------------------------------|
//! | 0       | core GlcNAc (0-2)               |
//! | 1       | core Man (0-3)                  |
//! | 2       | core Fuc flag                   |
//! | 3       | bisecting GlcNAc flag           |
//! | 4..8    | GlcNAc on each of four branches |
//! | 8..12   | Gal on each branch              |
//! | 12..16  | terminal Fuc on each branch     |
//! | 16..20  | NeuAc on each branch            |
//! | 20..24  | NeuGc on each branch            |
//!
//! Within each branch column, counts never increase from branch `i - 1` to branch `i`,
//! so a multiset of branches has exactly one table.
use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

use crate::monosaccharide::{Composition, Monosaccharide};

pub const TABLE_SIZE: usize = 24;
pub const BRANCH_COUNT: usize = 4;

pub const CORE_GLCNAC: usize = 0;
pub const CORE_MAN: usize = 1;
pub const CORE_FUC: usize = 2;
pub const BISECT: usize = 3;
pub const BRANCH_GLCNAC: usize = 4;
pub const BRANCH_GAL: usize = 8;
pub const BRANCH_FUC: usize = 12;
pub const BRANCH_NEUAC: usize = 16;
pub const BRANCH_NEUGC: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlycanIdError {
    #[error("A glycan id must have 24 slots, found {0}")]
    WrongLength(usize),
    #[error("Invalid glycan id slot {0:?}")]
    InvalidSlot(String),
}

/// Which part of the structure a node's growth contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubsetCategory {
    Core,
    Branch,
    Terminal,
}

impl SubsetCategory {
    pub const ALL: [SubsetCategory; 3] = [Self::Core, Self::Branch, Self::Terminal];
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlycanState {
    table: [u8; TABLE_SIZE],
}

impl GlycanState {
    /// The empty structure every enumeration starts from
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_table(table: [u8; TABLE_SIZE]) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &[u8; TABLE_SIZE] {
        &self.table
    }

    #[inline]
    pub fn get(&self, slot: usize) -> u8 {
        self.table[slot]
    }

    /// The canonical id, the table's slots joined by spaces
    pub fn id(&self) -> String {
        self.to_string()
    }

    pub fn from_id(id: &str) -> Result<Self, GlycanIdError> {
        let slots: Vec<&str> = id.split_whitespace().collect();
        if slots.len() != TABLE_SIZE {
            return Err(GlycanIdError::WrongLength(slots.len()));
        }
        let mut table = [0u8; TABLE_SIZE];
        for (dest, slot) in table.iter_mut().zip(slots) {
            *dest = slot
                .parse()
                .map_err(|_| GlycanIdError::InvalidSlot(slot.to_string()))?;
        }
        Ok(Self { table })
    }

    fn sum_slots(&self, start: usize, count: usize) -> u32 {
        self.table[start..start + count]
            .iter()
            .map(|v| *v as u32)
            .sum()
    }

    pub fn composition(&self) -> Composition {
        let t = &self.table;
        Composition::new()
            .with(
                Monosaccharide::GlcNAc,
                t[CORE_GLCNAC] as u32
                    + t[BISECT] as u32
                    + self.sum_slots(BRANCH_GLCNAC, BRANCH_COUNT),
            )
            .with(Monosaccharide::Man, t[CORE_MAN] as u32)
            .with(Monosaccharide::Gal, self.sum_slots(BRANCH_GAL, BRANCH_COUNT))
            .with(
                Monosaccharide::Fuc,
                t[CORE_FUC] as u32 + self.sum_slots(BRANCH_FUC, BRANCH_COUNT),
            )
            .with(
                Monosaccharide::NeuAc,
                self.sum_slots(BRANCH_NEUAC, BRANCH_COUNT),
            )
            .with(
                Monosaccharide::NeuGc,
                self.sum_slots(BRANCH_NEUGC, BRANCH_COUNT),
            )
    }

    pub fn mass(&self) -> f64 {
        self.composition().mass()
    }

    /// Classify this node by the part of the structure it has reached: still
    /// building the core, carrying terminal residues, or extending branches.
    pub fn category(&self) -> SubsetCategory {
        let comp = self.composition();
        if comp[Monosaccharide::GlcNAc] < 2 || comp[Monosaccharide::Man] < 3 {
            SubsetCategory::Core
        } else if comp[Monosaccharide::Fuc] > 0
            || comp[Monosaccharide::NeuAc] > 0
            || comp[Monosaccharide::NeuGc] > 0
        {
            SubsetCategory::Terminal
        } else {
            SubsetCategory::Branch
        }
    }

    fn incremented(&self, slot: usize) -> Self {
        let mut child = *self;
        child.table[slot] += 1;
        child
    }

    fn flagged(&self, slot: usize) -> Self {
        let mut child = *self;
        child.table[slot] = 1;
        child
    }

    /// Branch `i` of the column starting at `column` may be extended without
    /// overtaking branch `i - 1`
    fn in_order(&self, column: usize, i: usize) -> bool {
        i == 0 || self.table[column + i] < self.table[column + i - 1]
    }

    fn has_terminal(&self, i: usize) -> bool {
        self.table[BRANCH_FUC + i] != 0
            || self.table[BRANCH_NEUAC + i] != 0
            || self.table[BRANCH_NEUGC + i] != 0
    }

    fn is_capped(&self, i: usize) -> bool {
        let glcnac = self.table[BRANCH_GLCNAC + i];
        glcnac > 0 && glcnac == self.table[BRANCH_GAL + i]
    }

    fn core_complete(&self) -> bool {
        self.table[CORE_GLCNAC] == 2 && self.table[CORE_MAN] == 3
    }

    fn grow_glcnac(&self, children: &mut Vec<Self>) {
        if self.table[CORE_GLCNAC] < 2 {
            children.push(self.incremented(CORE_GLCNAC));
            return;
        }
        if !self.core_complete() {
            return;
        }
        if self.table[BISECT] == 0 && self.table[BRANCH_GLCNAC] == 0 {
            children.push(self.flagged(BISECT));
        }
        for i in 0..BRANCH_COUNT {
            if self.in_order(BRANCH_GLCNAC, i)
                && self.table[BRANCH_GLCNAC + i] == self.table[BRANCH_GAL + i]
                && !self.has_terminal(i)
            {
                children.push(self.incremented(BRANCH_GLCNAC + i));
            }
        }
    }

    fn grow_man(&self, children: &mut Vec<Self>) {
        if self.table[CORE_GLCNAC] == 2 && self.table[CORE_MAN] < 3 {
            children.push(self.incremented(CORE_MAN));
        }
    }

    fn grow_gal(&self, children: &mut Vec<Self>) {
        for i in 0..BRANCH_COUNT {
            if self.in_order(BRANCH_GAL, i)
                && self.table[BRANCH_GLCNAC + i] == self.table[BRANCH_GAL + i] + 1
            {
                children.push(self.incremented(BRANCH_GAL + i));
            }
        }
    }

    fn grow_terminal(&self, column: usize, children: &mut Vec<Self>) {
        for i in 0..BRANCH_COUNT {
            if self.in_order(column, i) && self.is_capped(i) && !self.has_terminal(i) {
                children.push(self.flagged(column + i));
            }
        }
    }

    fn grow_fuc(&self, children: &mut Vec<Self>) {
        if self.table[CORE_GLCNAC] == 1 && self.table[CORE_MAN] == 0 && self.table[CORE_FUC] == 0
        {
            children.push(self.flagged(CORE_FUC));
        } else {
            self.grow_terminal(BRANCH_FUC, children);
        }
    }

    /// All valid successors of this state after attaching one `sugar` to a complex
    /// N-glycan. Zero children means the sugar cannot be attached anywhere.
    pub fn grow_complex(&self, sugar: Monosaccharide) -> Vec<Self> {
        let mut children = Vec::new();
        match sugar {
            Monosaccharide::GlcNAc => self.grow_glcnac(&mut children),
            Monosaccharide::Man => self.grow_man(&mut children),
            Monosaccharide::Gal => self.grow_gal(&mut children),
            Monosaccharide::Fuc => self.grow_fuc(&mut children),
            Monosaccharide::NeuAc => self.grow_terminal(BRANCH_NEUAC, &mut children),
            Monosaccharide::NeuGc => self.grow_terminal(BRANCH_NEUGC, &mut children),
        }
        children
    }

    /// The contents of branch `i` as (GlcNAc, Gal, Fuc, NeuAc, NeuGc)
    pub fn branch(&self, i: usize) -> [u8; 5] {
        [
            self.table[BRANCH_GLCNAC + i],
            self.table[BRANCH_GAL + i],
            self.table[BRANCH_FUC + i],
            self.table[BRANCH_NEUAC + i],
            self.table[BRANCH_NEUGC + i],
        ]
    }
}

impl Display for GlycanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.table.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl FromStr for GlycanState {
    type Err = GlycanIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s)
    }
}

/// The kinds of glycan topology the enumerator knows how to grow
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StructureKind {
    #[default]
    ComplexNGlycan,
}

impl StructureKind {
    pub fn grow(&self, state: &GlycanState, sugar: Monosaccharide) -> Vec<GlycanState> {
        match self {
            Self::ComplexNGlycan => state.grow_complex(sugar),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn state(prefix: &[u8]) -> GlycanState {
        let mut table = [0u8; TABLE_SIZE];
        table[..prefix.len()].copy_from_slice(prefix);
        GlycanState::from_table(table)
    }

    #[test]
    fn test_core_growth() {
        let root = GlycanState::root();
        let children = root.grow_complex(Monosaccharide::GlcNAc);
        assert_eq!(children, vec![state(&[1])]);
        assert!(root.grow_complex(Monosaccharide::Man).is_empty());
        assert!(root.grow_complex(Monosaccharide::Fuc).is_empty());

        let one = state(&[1]);
        assert_eq!(one.grow_complex(Monosaccharide::Fuc), vec![state(&[1, 0, 1])]);
        assert!(one.grow_complex(Monosaccharide::Man).is_empty());

        let two = state(&[2, 2]);
        assert_eq!(two.grow_complex(Monosaccharide::Man), vec![state(&[2, 3])]);
        assert!(two.grow_complex(Monosaccharide::GlcNAc).is_empty());
        assert!(state(&[2, 3]).grow_complex(Monosaccharide::Man).is_empty());
    }

    #[test]
    fn test_branch_glcnac() {
        let core = state(&[2, 3]);
        let children = core.grow_complex(Monosaccharide::GlcNAc);
        assert_eq!(children, vec![state(&[2, 3, 0, 1]), state(&[2, 3, 0, 0, 1])]);

        let grown = state(&[2, 3, 1, 1, 1, 1, 0, 0, 1, 1]);
        let children = grown.grow_complex(Monosaccharide::GlcNAc);
        assert_eq!(children.len(), 2);
        assert!(children.contains(&state(&[2, 3, 1, 1, 2, 1, 0, 0, 1, 1])));
        assert!(children.contains(&state(&[2, 3, 1, 1, 1, 1, 1, 0, 1, 1])));
    }

    #[test]
    fn test_gal_and_caps() {
        let one_branch = state(&[2, 3, 0, 0, 1]);
        assert_eq!(
            one_branch.grow_complex(Monosaccharide::Gal),
            vec![state(&[2, 3, 0, 0, 1, 0, 0, 0, 1])]
        );
        assert!(one_branch.grow_complex(Monosaccharide::NeuAc).is_empty());

        let capped = state(&[2, 3, 0, 0, 1, 0, 0, 0, 1]);
        let mut expected = capped;
        expected.table[BRANCH_NEUAC] = 1;
        assert_eq!(capped.grow_complex(Monosaccharide::NeuAc), vec![expected]);
        let mut fucosylated = capped;
        fucosylated.table[BRANCH_FUC] = 1;
        assert_eq!(capped.grow_complex(Monosaccharide::Fuc), vec![fucosylated]);

        assert!(expected.grow_complex(Monosaccharide::Fuc).is_empty());
        assert!(expected.grow_complex(Monosaccharide::GlcNAc).len() == 1);
    }

    #[test]
    fn test_composition_and_id() {
        let s = state(&[2, 3, 1, 1, 2, 1, 0, 0, 2, 1, 0, 0, 0, 0, 0, 0, 1]);
        let comp = s.composition();
        assert_eq!(comp[Monosaccharide::GlcNAc], 6);
        assert_eq!(comp[Monosaccharide::Man], 3);
        assert_eq!(comp[Monosaccharide::Gal], 3);
        assert_eq!(comp[Monosaccharide::Fuc], 1);
        assert_eq!(comp[Monosaccharide::NeuAc], 1);
        assert_eq!(s.category(), SubsetCategory::Terminal);

        let id = s.id();
        assert!(id.starts_with("2 3 1 1 2 1 0 0 2 1"));
        assert_eq!(GlycanState::from_id(&id).unwrap(), s);
        assert_eq!(
            GlycanState::from_id("1 2 3"),
            Err(GlycanIdError::WrongLength(3))
        );
    }

    #[test]
    fn test_category() {
        assert_eq!(state(&[2, 2]).category(), SubsetCategory::Core);
        assert_eq!(state(&[1, 0, 1]).category(), SubsetCategory::Core);
        assert_eq!(state(&[2, 3]).category(), SubsetCategory::Branch);
        assert_eq!(state(&[2, 3, 1]).category(), SubsetCategory::Terminal);
    }
}
