//! An index-addressed tree of monosaccharide residues.
use crate::monosaccharide::{Composition, Monosaccharide};

use super::state::{
    GlycanState, BISECT, BRANCH_COUNT, BRANCH_FUC, BRANCH_GAL, BRANCH_GLCNAC, BRANCH_NEUAC,
    BRANCH_NEUGC, CORE_FUC, CORE_GLCNAC, CORE_MAN,
};

pub type MoietyIndex = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Moiety {
    pub sugar: Monosaccharide,
    parent: Option<MoietyIndex>,
    children: Vec<MoietyIndex>,
}

impl Moiety {
    fn new(sugar: Monosaccharide, parent: Option<MoietyIndex>) -> Self {
        Self {
            sugar,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<MoietyIndex> {
        self.parent
    }

    pub fn children(&self) -> &[MoietyIndex] {
        &self.children
    }
}

/// A glycan drawn as a tree of residues. Every node is owned by the arena and refers
/// to its parent and children by index.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MoietyTree {
    nodes: Vec<Moiety>,
}

impl MoietyTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: MoietyIndex) -> Option<&Moiety> {
        self.nodes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Moiety> {
        self.nodes.iter()
    }

    /// Add a node with no parent
    pub fn add_root(&mut self, sugar: Monosaccharide) -> MoietyIndex {
        self.nodes.push(Moiety::new(sugar, None));
        self.nodes.len() - 1
    }

    /// Attach a new node beneath `parent`, or return `None` if `parent` is not in this tree
    pub fn add_child(&mut self, parent: MoietyIndex, sugar: Monosaccharide) -> Option<MoietyIndex> {
        if parent >= self.nodes.len() {
            return None;
        }
        let index = self.nodes.len();
        self.nodes.push(Moiety::new(sugar, Some(parent)));
        self.nodes[parent].children.push(index);
        Some(index)
    }

    pub fn parent(&self, index: MoietyIndex) -> Option<MoietyIndex> {
        self.nodes.get(index).and_then(|n| n.parent)
    }

    pub fn children(&self, index: MoietyIndex) -> &[MoietyIndex] {
        self.nodes
            .get(index)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn children_names(&self, index: MoietyIndex) -> Vec<Monosaccharide> {
        self.children(index)
            .iter()
            .map(|i| self.nodes[*i].sugar)
            .collect()
    }

    /// The residues sharing a parent with `index`, including itself
    pub fn parent_children_names(&self, index: MoietyIndex) -> Vec<Monosaccharide> {
        self.parent(index)
            .map(|p| self.children_names(p))
            .unwrap_or_default()
    }

    /// Copy the subtree rooted at `index` into a new arena whose root is index 0
    pub fn clone_subtree(&self, index: MoietyIndex) -> MoietyTree {
        let mut tree = MoietyTree::new();
        let Some(node) = self.nodes.get(index) else {
            return tree;
        };
        let root = tree.add_root(node.sugar);
        let mut stack = vec![(index, root)];
        while let Some((source, dest)) = stack.pop() {
            for child in self.nodes[source].children.iter() {
                if let Some(added) = tree.add_child(dest, self.nodes[*child].sugar) {
                    stack.push((*child, added));
                }
            }
        }
        tree
    }

    pub fn composition(&self) -> Composition {
        self.nodes.iter().map(|n| (n.sugar, 1)).collect()
    }
}

impl GlycanState {
    /// Draw this state as a residue tree: the chitobiose core, the mannose core with
    /// its bisecting GlcNAc, then each branch as alternating GlcNAc and Gal with its
    /// terminal residue on the outermost sugar.
    pub fn to_moiety_tree(&self) -> MoietyTree {
        let mut tree = MoietyTree::new();
        if self.get(CORE_GLCNAC) == 0 {
            return tree;
        }
        let reducing_end = tree.add_root(Monosaccharide::GlcNAc);
        if self.get(CORE_FUC) != 0 {
            tree.add_child(reducing_end, Monosaccharide::Fuc);
        }
        if self.get(CORE_GLCNAC) < 2 {
            return tree;
        }
        let Some(chitobiose) = tree.add_child(reducing_end, Monosaccharide::GlcNAc) else {
            return tree;
        };

        let mut mannoses = Vec::new();
        if self.get(CORE_MAN) > 0 {
            if let Some(beta) = tree.add_child(chitobiose, Monosaccharide::Man) {
                mannoses.push(beta);
                for _ in 1..self.get(CORE_MAN) {
                    if let Some(alpha) = tree.add_child(beta, Monosaccharide::Man) {
                        mannoses.push(alpha);
                    }
                }
            }
        }
        let Some(&beta) = mannoses.first() else {
            return tree;
        };
        if self.get(BISECT) != 0 {
            tree.add_child(beta, Monosaccharide::GlcNAc);
        }

        for i in 0..BRANCH_COUNT {
            let glcnac = self.get(BRANCH_GLCNAC + i);
            if glcnac == 0 {
                continue;
            }
            let gal = self.get(BRANCH_GAL + i);
            let mut tip = mannoses.get(1 + i / 2).copied().unwrap_or(beta);
            for level in 0..glcnac {
                let Some(next) = tree.add_child(tip, Monosaccharide::GlcNAc) else {
                    break;
                };
                tip = next;
                if level < gal {
                    if let Some(next) = tree.add_child(tip, Monosaccharide::Gal) {
                        tip = next;
                    }
                }
            }
            for (column, sugar) in [
                (BRANCH_FUC, Monosaccharide::Fuc),
                (BRANCH_NEUAC, Monosaccharide::NeuAc),
                (BRANCH_NEUGC, Monosaccharide::NeuGc),
            ] {
                for _ in 0..self.get(column + i) {
                    tree.add_child(tip, sugar);
                }
            }
        }
        tree
    }
}
