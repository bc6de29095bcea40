//! Per-sheet R-trees with buffered inserts.
//!
//! Inserts are queued in `pending` and applied by [`SpreadsheetRTree::flush`],
//! which every read and remove calls first. Items sharing an exact rectangle
//! are coalesced into one leaf whose payload collects them, so a thousand
//! formulas reading `B1:B1000` cost one tree entry.

use rstar::{AABB, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use rangewise_common::{BoundingBox, SheetId, Zone};

/// What a leaf stores for the items sharing its rectangle.
pub trait LeafPayload: Default + Clone {
    type Item;

    fn add(&mut self, item: Self::Item);

    /// Fold another payload of the same rectangle into this one.
    fn merge(&mut self, other: Self);

    /// Remove one item. Returns whether it was present.
    fn release(&mut self, item: &Self::Item) -> bool;

    fn is_empty(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct RTreeLeaf<P> {
    pub zone: Zone,
    pub payload: P,
}

impl<P: Default> RTreeLeaf<P> {
    fn empty(zone: Zone) -> Self {
        Self {
            zone,
            payload: P::default(),
        }
    }
}

// Leaves are unique per rectangle, so the rectangle is the identity.
impl<P> PartialEq for RTreeLeaf<P> {
    fn eq(&self, other: &Self) -> bool {
        self.zone == other.zone
    }
}

impl<P> RTreeObject for RTreeLeaf<P> {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope(&self.zone)
    }
}

fn envelope(zone: &Zone) -> AABB<[i64; 2]> {
    AABB::from_corners(
        [zone.left as i64, zone.top as i64],
        [zone.right as i64, zone.bottom as i64],
    )
}

/// Exact key of a rectangle, packed into one integer.
#[inline]
fn zone_key(zone: &Zone) -> u128 {
    (zone.left as u128) << 96
        | (zone.top as u128) << 64
        | (zone.right as u128) << 32
        | zone.bottom as u128
}

struct PendingLeaves<P> {
    slots: FxHashMap<u128, usize>,
    leaves: Vec<RTreeLeaf<P>>,
}

impl<P> Default for PendingLeaves<P> {
    fn default() -> Self {
        Self {
            slots: FxHashMap::default(),
            leaves: Vec::new(),
        }
    }
}

pub struct SpreadsheetRTree<P: LeafPayload> {
    trees: FxHashMap<SheetId, RTree<RTreeLeaf<P>>>,
    pending: Vec<(BoundingBox, P::Item)>,
}

impl<P: LeafPayload> Default for SpreadsheetRTree<P> {
    fn default() -> Self {
        Self {
            trees: FxHashMap::default(),
            pending: Vec::new(),
        }
    }
}

impl<P: LeafPayload> SpreadsheetRTree<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `item` under `bbox`. Nothing touches the trees until the next flush.
    pub fn insert(&mut self, bbox: BoundingBox, item: P::Item) {
        self.pending.push((bbox, item));
    }

    pub fn insert_many(&mut self, items: impl IntoIterator<Item = (BoundingBox, P::Item)>) {
        self.pending.extend(items);
    }

    /// Apply every queued insert.
    ///
    /// Queued items are grouped by sheet and exact rectangle first. Each group
    /// either merges into the leaf already holding that rectangle or becomes a
    /// new leaf. A sheet whose tree is empty, or smaller than the batch of new
    /// leaves, is rebuilt with a bulk load instead of leaf-by-leaf inserts.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        #[cfg(feature = "tracing")]
        let pending_items = pending.len();

        let mut by_sheet: FxHashMap<SheetId, PendingLeaves<P>> = FxHashMap::default();
        for (bbox, item) in pending {
            let group = by_sheet.entry(bbox.sheet_id).or_default();
            let key = zone_key(&bbox.zone);
            let slot = match group.slots.get(&key) {
                Some(&slot) => slot,
                None => {
                    group.leaves.push(RTreeLeaf::empty(bbox.zone));
                    group.slots.insert(key, group.leaves.len() - 1);
                    group.leaves.len() - 1
                }
            };
            group.leaves[slot].payload.add(item);
        }

        #[cfg(feature = "tracing")]
        let (mut created, mut merged, mut rebuilt) = (0usize, 0usize, 0usize);
        for (sheet_id, group) in by_sheet {
            let tree = self.trees.entry(sheet_id).or_default();
            let mut fresh = Vec::with_capacity(group.leaves.len());
            for leaf in group.leaves {
                let env = leaf.envelope();
                let existing = tree
                    .locate_in_envelope_intersecting_mut(&env)
                    .find(|candidate| candidate.zone == leaf.zone);
                match existing {
                    Some(existing) => {
                        existing.payload.merge(leaf.payload);
                        #[cfg(feature = "tracing")]
                        {
                            merged += 1;
                        }
                    }
                    None => fresh.push(leaf),
                }
            }
            #[cfg(feature = "tracing")]
            {
                created += fresh.len();
            }
            if tree.size() == 0 || fresh.len() > tree.size() {
                fresh.extend(tree.iter().cloned());
                *tree = RTree::bulk_load(fresh);
                #[cfg(feature = "tracing")]
                {
                    rebuilt += 1;
                }
            } else {
                for leaf in fresh {
                    tree.insert(leaf);
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            pending = pending_items,
            created,
            merged,
            rebuilt,
            "flushed r-tree inserts"
        );
    }

    /// Payloads of every leaf whose rectangle intersects `bbox`.
    pub fn search(&mut self, bbox: &BoundingBox) -> Vec<&P> {
        self.flush();
        match self.trees.get(&bbox.sheet_id) {
            Some(tree) => tree
                .locate_in_envelope_intersecting(&envelope(&bbox.zone))
                .map(|leaf| &leaf.payload)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Like [`SpreadsheetRTree::search`], also yielding each leaf's rectangle.
    pub fn search_leaves(&mut self, bbox: &BoundingBox) -> Vec<&RTreeLeaf<P>> {
        self.flush();
        match self.trees.get(&bbox.sheet_id) {
            Some(tree) => tree
                .locate_in_envelope_intersecting(&envelope(&bbox.zone))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Remove `item` from the leaf at exactly `bbox`. A leaf left empty is
    /// dropped from its tree.
    pub fn remove(&mut self, bbox: &BoundingBox, item: &P::Item) -> bool {
        self.flush();
        let Some(tree) = self.trees.get_mut(&bbox.sheet_id) else {
            return false;
        };
        let Some(leaf) = tree
            .locate_in_envelope_intersecting_mut(&envelope(&bbox.zone))
            .find(|leaf| leaf.zone == bbox.zone)
        else {
            return false;
        };
        if !leaf.payload.release(item) {
            return false;
        }
        if leaf.payload.is_empty() {
            tree.remove(&RTreeLeaf::empty(bbox.zone));
            if tree.size() == 0 {
                self.trees.remove(&bbox.sheet_id);
            }
        }
        true
    }

    /// Number of leaves across all sheets, excluding queued inserts.
    pub fn len(&self) -> usize {
        self.trees.values().map(|tree| tree.size()).sum()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.trees.is_empty()
    }

    pub fn clear(&mut self) {
        self.trees.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug, Clone)]
    struct Ids(Vec<u32>);

    impl LeafPayload for Ids {
        type Item = u32;

        fn add(&mut self, item: u32) {
            self.0.push(item);
        }

        fn merge(&mut self, other: Self) {
            self.0.extend(other.0);
        }

        fn release(&mut self, item: &u32) -> bool {
            match self.0.iter().position(|id| id == item) {
                Some(index) => {
                    self.0.swap_remove(index);
                    true
                }
                None => false,
            }
        }

        fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    fn bbox(sheet_id: SheetId, left: u32, top: u32, right: u32, bottom: u32) -> BoundingBox {
        BoundingBox::new(sheet_id, Zone::new(left, top, right, bottom))
    }

    #[test]
    fn identical_rectangles_coalesce_into_one_leaf() {
        let mut tree = SpreadsheetRTree::<Ids>::new();
        for id in 0..1000 {
            tree.insert(bbox(0, 1, 0, 1, 999), id);
        }
        assert_eq!(tree.pending_len(), 1000);
        assert_eq!(tree.len(), 0);

        let hits = tree.search(&bbox(0, 1, 10, 1, 10));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.len(), 1000);
        assert_eq!(tree.pending_len(), 0);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn later_batches_merge_into_existing_leaves() {
        let mut tree = SpreadsheetRTree::<Ids>::new();
        tree.insert(bbox(0, 0, 0, 3, 3), 1);
        tree.insert(bbox(0, 10, 10, 12, 12), 2);
        tree.flush();
        tree.insert(bbox(0, 0, 0, 3, 3), 3);
        tree.flush();
        assert_eq!(tree.len(), 2);
        let hits = tree.search(&bbox(0, 2, 2, 2, 2));
        let mut ids = hits[0].0.clone();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn sheets_are_separate_trees() {
        let mut tree = SpreadsheetRTree::<Ids>::new();
        tree.insert(bbox(0, 0, 0, 0, 0), 1);
        tree.insert(bbox(1, 0, 0, 0, 0), 2);
        assert_eq!(tree.search(&bbox(1, 0, 0, 5, 5))[0].0, vec![2]);
        assert!(tree.search(&bbox(2, 0, 0, 5, 5)).is_empty());
    }

    #[test]
    fn remove_drops_empty_leaves() {
        let mut tree = SpreadsheetRTree::<Ids>::new();
        tree.insert(bbox(0, 0, 0, 1, 1), 7);
        tree.insert(bbox(0, 0, 0, 1, 1), 8);
        assert!(tree.remove(&bbox(0, 0, 0, 1, 1), &7));
        assert_eq!(tree.len(), 1);
        assert!(!tree.remove(&bbox(0, 0, 0, 1, 1), &7));
        assert!(tree.remove(&bbox(0, 0, 0, 1, 1), &8));
        assert!(tree.is_empty());
    }

    #[test]
    fn remove_needs_the_exact_rectangle() {
        let mut tree = SpreadsheetRTree::<Ids>::new();
        tree.insert(bbox(0, 0, 0, 4, 4), 1);
        assert!(!tree.remove(&bbox(0, 2, 2, 2, 2), &1));
        assert_eq!(tree.len(), 1);
        assert!(tree.remove(&bbox(0, 0, 0, 4, 4), &1));
        assert!(tree.is_empty());
    }

    #[test]
    fn incremental_inserts_after_bulk_load() {
        let mut tree = SpreadsheetRTree::<Ids>::new();
        for i in 0..50 {
            tree.insert(bbox(0, i, i, i, i), i);
        }
        tree.flush();
        tree.insert(bbox(0, 100, 100, 100, 100), 100);
        tree.flush();
        assert_eq!(tree.len(), 51);
        let hits = tree.search(&bbox(0, 40, 40, 100, 100));
        assert_eq!(hits.len(), 11);
    }
}
