use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use super::state::GlycanState;

/// The isomers sharing one composition and that composition's mass
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IsomerGroup {
    pub mass: f64,
    pub isomers: BTreeSet<GlycanState>,
}

/// Composition name to the set of enumerated topologies with that composition
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GlycanStore {
    groups: BTreeMap<String, IsomerGroup>,
}

impl GlycanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: String, state: GlycanState, mass: f64) {
        let group = self.groups.entry(name).or_insert_with(|| IsomerGroup {
            mass,
            isomers: BTreeSet::new(),
        });
        debug_assert!(
            (group.mass - mass).abs() < 1e-6,
            "{state} has mass {mass} but its composition was recorded with {}",
            group.mass
        );
        group.isomers.insert(state);
    }

    pub fn get(&self, name: &str) -> Option<&IsomerGroup> {
        self.groups.get(name)
    }

    pub fn isomers(&self, name: &str) -> impl Iterator<Item = &GlycanState> {
        self.groups
            .get(name)
            .into_iter()
            .flat_map(|group| group.isomers.iter())
    }

    pub fn mass(&self, name: &str) -> Option<f64> {
        self.groups.get(name).map(|group| group.mass)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Composition names in sorted order
    pub fn compositions(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, IsomerGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn isomer_count(&self) -> usize {
        self.groups.values().map(|g| g.isomers.len()).sum()
    }
}

/// A sorted, duplicate-free set of masses
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MassSet {
    masses: Vec<f64>,
}

impl MassSet {
    pub fn insert(&mut self, mass: f64) -> bool {
        match self.masses.binary_search_by(|m| m.total_cmp(&mass)) {
            Ok(_) => false,
            Err(i) => {
                self.masses.insert(i, mass);
                true
            }
        }
    }

    pub fn extend_from(&mut self, other: &MassSet) {
        for mass in other.iter() {
            self.insert(*mass);
        }
    }

    pub fn contains(&self, mass: f64) -> bool {
        self.masses
            .binary_search_by(|m| m.total_cmp(&mass))
            .is_ok()
    }

    pub fn is_superset(&self, other: &MassSet) -> bool {
        other.iter().all(|m| self.contains(*m))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.masses.iter()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.masses
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }
}

/// Each topology's accumulated ancestor masses for one [`SubsetCategory`](super::SubsetCategory)
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GlycanMassStore {
    subsets: BTreeMap<GlycanState, MassSet>,
}

impl GlycanMassStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `child` grew from `parent`: `child` inherits `parent`'s subset
    /// masses, plus `mass` when it is positive.
    pub fn add_subset(&mut self, child: GlycanState, parent: &GlycanState, mass: f64) {
        let inherited = self.subsets.get(parent).cloned();
        if mass <= 0.0 && inherited.as_ref().map_or(true, |s| s.is_empty()) {
            return;
        }
        let entry = self.subsets.entry(child).or_default();
        if mass > 0.0 {
            entry.insert(mass);
        }
        if let Some(inherited) = inherited {
            entry.extend_from(&inherited);
        }
    }

    pub fn get(&self, state: &GlycanState) -> Option<&MassSet> {
        self.subsets.get(state)
    }

    pub fn contains(&self, state: &GlycanState) -> bool {
        self.subsets.contains_key(state)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, GlycanState, MassSet> {
        self.subsets.iter()
    }

    pub fn len(&self) -> usize {
        self.subsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }
}
