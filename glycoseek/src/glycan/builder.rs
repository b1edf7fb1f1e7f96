use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

use crate::monosaccharide::{Composition, Monosaccharide};

use super::state::{GlycanState, StructureKind, SubsetCategory};
use super::store::{GlycanMassStore, GlycanStore, MassSet};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundsError {
    #[error("The upper bound for {0} must not be negative, but {1} was given")]
    Negative(&'static str, i64),
}

/// Upper limits on the monosaccharide counts of an enumerated glycan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlycanBounds {
    pub hexnac: u32,
    pub hex: u32,
    pub fuc: u32,
    pub neuac: u32,
    pub neugc: u32,
}

impl Default for GlycanBounds {
    fn default() -> Self {
        Self {
            hexnac: 12,
            hex: 12,
            fuc: 5,
            neuac: 4,
            neugc: 0,
        }
    }
}

impl GlycanBounds {
    pub fn new(hexnac: i64, hex: i64, fuc: i64, neuac: i64, neugc: i64) -> Result<Self, BoundsError> {
        let check = |name: &'static str, value: i64| -> Result<u32, BoundsError> {
            u32::try_from(value).map_err(|_| BoundsError::Negative(name, value))
        };
        Ok(Self {
            hexnac: check("HexNAc", hexnac)?,
            hex: check("Hex", hex)?,
            fuc: check("Fuc", fuc)?,
            neuac: check("NeuAc", neuac)?,
            neugc: check("NeuGc", neugc)?,
        })
    }

    pub fn admits(&self, composition: &Composition) -> bool {
        composition.hexnac() <= self.hexnac
            && composition.hex() <= self.hex
            && composition[Monosaccharide::Fuc] <= self.fuc
            && composition[Monosaccharide::NeuAc] <= self.neuac
            && composition[Monosaccharide::NeuGc] <= self.neugc
    }
}

/// The enumerated glycan space: isomers grouped by composition, and each
/// topology's ancestor masses split by [`SubsetCategory`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GlycanDatabase {
    pub isomers: GlycanStore,
    pub core: GlycanMassStore,
    pub branch: GlycanMassStore,
    pub terminal: GlycanMassStore,
}

impl GlycanDatabase {
    pub fn subsets(&self, category: SubsetCategory) -> &GlycanMassStore {
        match category {
            SubsetCategory::Core => &self.core,
            SubsetCategory::Branch => &self.branch,
            SubsetCategory::Terminal => &self.terminal,
        }
    }

    fn subsets_mut(&mut self, category: SubsetCategory) -> &mut GlycanMassStore {
        match category {
            SubsetCategory::Core => &mut self.core,
            SubsetCategory::Branch => &mut self.branch,
            SubsetCategory::Terminal => &mut self.terminal,
        }
    }

    /// The subset masses of `state` in `category`, if it has any
    pub fn subset_masses(&self, state: &GlycanState, category: SubsetCategory) -> Option<&MassSet> {
        self.subsets(category).get(state)
    }

    pub fn glycan_mass(&self, name: &str) -> Option<f64> {
        self.isomers.mass(name)
    }
}

/// Breadth-first enumeration of glycan topologies from the empty root.
#[derive(Debug, Clone, PartialEq)]
pub struct GlycanBuilder {
    bounds: GlycanBounds,
    kind: StructureKind,
    candidates: Vec<Monosaccharide>,
}

impl GlycanBuilder {
    /// Sugars tried at every node unless overridden with [`GlycanBuilder::with_candidates`]
    pub const DEFAULT_CANDIDATES: [Monosaccharide; 5] = [
        Monosaccharide::GlcNAc,
        Monosaccharide::Man,
        Monosaccharide::Gal,
        Monosaccharide::Fuc,
        Monosaccharide::NeuAc,
    ];

    pub fn new(bounds: GlycanBounds) -> Self {
        Self {
            bounds,
            kind: StructureKind::default(),
            candidates: Self::DEFAULT_CANDIDATES.to_vec(),
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<Monosaccharide>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_kind(mut self, kind: StructureKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn bounds(&self) -> &GlycanBounds {
        &self.bounds
    }

    pub fn build(&self) -> GlycanDatabase {
        let start = Instant::now();
        let mut database = GlycanDatabase::default();
        let root = GlycanState::root();
        database
            .isomers
            .add(root.composition().name(), root, 0.0);
        let mut seen: HashSet<GlycanState> = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);

        while let Some(node) = queue.pop_front() {
            let category = node.category();
            let node_mass = node.mass();
            for sugar in self.candidates.iter() {
                for child in self.kind.grow(&node, *sugar) {
                    let composition = child.composition();
                    if !self.bounds.admits(&composition) {
                        continue;
                    }
                    database
                        .isomers
                        .add(composition.name(), child, composition.mass());
                    for target in SubsetCategory::ALL {
                        let mass = if target == category { node_mass } else { 0.0 };
                        database.subsets_mut(target).add_subset(child, &node, mass);
                    }
                    if seen.insert(child) {
                        queue.push_back(child);
                    }
                }
            }
        }

        let elapsed = start.elapsed();
        info!(
            "Enumerated {} glycan compositions with {} isomers",
            database.isomers.len(),
            database.isomers.isomer_count()
        );
        debug!("Glycan Enumeration Elapsed Time: {:0.3?}", elapsed);
        database
    }
}

/// Enumerate every glycan within `bounds` with the default builder settings
pub fn build(bounds: GlycanBounds) -> GlycanDatabase {
    GlycanBuilder::new(bounds).build()
}
