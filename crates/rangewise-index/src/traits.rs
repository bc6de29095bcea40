use rangewise_common::{BoundingBox, CellPosition};

use crate::range_set::RangeSet;

/// "Which formulas read from this rectangle?"
///
/// Both index engines implement this, and callers are expected to depend on
/// the trait rather than on a concrete engine. `search` takes `&mut self`
/// because engines may do bookkeeping on read (query counters, flushing
/// buffered inserts).
pub trait DependencyIndex {
    /// Record that the formula at `dependent` reads `dependency`.
    fn insert(&mut self, dependency: &BoundingBox, dependent: CellPosition);

    /// Forget one `(dependency, dependent)` pair. Returns whether it was present.
    fn remove(&mut self, dependency: &BoundingBox, dependent: CellPosition) -> bool;

    /// Cells of every formula whose dependency intersects `changed`.
    fn search(&mut self, changed: &BoundingBox) -> RangeSet;

    fn insert_many(&mut self, items: &[(BoundingBox, CellPosition)]) {
        for (dependency, dependent) in items {
            self.insert(dependency, *dependent);
        }
    }

    /// Union of [`DependencyIndex::search`] over several changed rectangles.
    fn search_many(&mut self, changed: &[BoundingBox]) -> RangeSet {
        let mut out = RangeSet::new();
        for bbox in changed {
            out.union_with(&self.search(bbox));
        }
        out
    }
}
