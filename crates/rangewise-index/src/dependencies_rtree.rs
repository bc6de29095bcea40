use rangewise_common::{BoundingBox, CellPosition};

use crate::range_set::RangeSet;
use crate::rtree::{LeafPayload, SpreadsheetRTree};
use crate::traits::DependencyIndex;

impl LeafPayload for RangeSet {
    type Item = CellPosition;

    fn add(&mut self, item: CellPosition) {
        self.add_position(item);
    }

    fn merge(&mut self, other: Self) {
        self.union_with(&other);
    }

    fn release(&mut self, item: &CellPosition) -> bool {
        if !self.has_position(*item) {
            return false;
        }
        self.remove_position(*item);
        true
    }

    fn is_empty(&self) -> bool {
        RangeSet::is_empty(self)
    }
}

/// Formula-to-formula dependencies on a [`SpreadsheetRTree`].
///
/// Each leaf is one dependency rectangle; its payload is the set of formula
/// cells reading it.
#[derive(Default)]
pub struct DependenciesRTree {
    tree: SpreadsheetRTree<RangeSet>,
}

impl DependenciesRTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn pending_len(&self) -> usize {
        self.tree.pending_len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn flush(&mut self) {
        self.tree.flush();
    }
}

impl DependencyIndex for DependenciesRTree {
    fn insert(&mut self, dependency: &BoundingBox, dependent: CellPosition) {
        self.tree.insert(*dependency, dependent);
    }

    fn remove(&mut self, dependency: &BoundingBox, dependent: CellPosition) -> bool {
        self.tree.remove(dependency, &dependent)
    }

    fn search(&mut self, changed: &BoundingBox) -> RangeSet {
        let mut out = RangeSet::new();
        for payload in self.tree.search(changed) {
            out.union_with(payload);
        }
        out
    }

    fn insert_many(&mut self, items: &[(BoundingBox, CellPosition)]) {
        self.tree.insert_many(items.iter().copied());
    }
}
