//! Enumeration of N-glycan topologies.
//!
//! [`GlycanState`] encodes one topology and knows which residues may be attached
//! to it. [`GlycanBuilder`] walks these growth rules breadth-first from the empty
//! root within a set of [`GlycanBounds`], producing a [`GlycanDatabase`] that groups
//! topologies by [`Composition`](crate::monosaccharide::Composition) and records the
//! masses of each topology's core, branch and terminal ancestors for fragment matching.
mod builder;
mod moiety;
mod state;
mod store;

pub use builder::{build, BoundsError, GlycanBounds, GlycanBuilder, GlycanDatabase};
pub use moiety::{Moiety, MoietyIndex, MoietyTree};
pub use state::{
    GlycanIdError, GlycanState, StructureKind, SubsetCategory, BRANCH_COUNT, TABLE_SIZE,
};
pub use store::{GlycanMassStore, GlycanStore, IsomerGroup, MassSet};
