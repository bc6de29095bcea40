//! Range dependencies of non-formula entities: charts, pivots, conditional
//! formats, data validations.
//!
//! Entities declare the ranges they read. When cells change, the registry
//! finds the entities reading them and calls the invalidation callback
//! registered for each entity's type. What invalidation means for a chart or
//! a pivot is up to the callback.

use rustc_hash::{FxHashMap, FxHashSet};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rangewise_adapt::{AdaptContext, RangeProvider};
use rangewise_common::{BoundingBox, Range, SheetResolver};

use crate::rtree::{LeafPayload, SpreadsheetRTree};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Chart,
    Pivot,
    ConditionalFormat,
    DataValidation,
}

pub type InvalidationCallback = Box<dyn FnMut(&str)>;

/// Ids of the entities reading one rectangle.
#[derive(Debug, Default, Clone)]
struct EntityIds(Vec<String>);

impl LeafPayload for EntityIds {
    type Item = String;

    fn add(&mut self, item: String) {
        if !self.0.contains(&item) {
            self.0.push(item);
        }
    }

    fn merge(&mut self, other: Self) {
        for id in other.0 {
            self.add(id);
        }
    }

    fn release(&mut self, item: &String) -> bool {
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

#[derive(Debug, Clone)]
struct EntityRecord {
    entity_type: EntityType,
    ranges: Vec<Range>,
    indexed: Vec<BoundingBox>,
}

#[derive(Default)]
pub struct EntityDependencyRegistry {
    tree: SpreadsheetRTree<EntityIds>,
    entities: FxHashMap<String, EntityRecord>,
    callbacks: FxHashMap<EntityType, InvalidationCallback>,
}

impl EntityDependencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback run for invalidated entities of `entity_type`.
    /// Replaces any earlier callback for that type.
    pub fn on_invalidate(&mut self, entity_type: EntityType, callback: impl FnMut(&str) + 'static) {
        self.callbacks.insert(entity_type, Box::new(callback));
    }

    /// Declare the full set of ranges `id` depends on, replacing whatever it
    /// declared before.
    ///
    /// Ranges without geometry (invalid text, or a sheet that no longer
    /// resolves) are stored but not indexed, so a later edit can still repair
    /// them.
    pub fn register_entity(
        &mut self,
        id: impl Into<String>,
        entity_type: EntityType,
        ranges: Vec<Range>,
        sheets: &(impl SheetResolver + ?Sized),
    ) {
        let id = id.into();
        self.unregister_entity(&id);
        let indexed: Vec<BoundingBox> = ranges
            .iter()
            .filter_map(|range| range.bounding_box(sheets).ok())
            .collect();
        for bbox in &indexed {
            self.tree.insert(*bbox, id.clone());
        }
        self.entities.insert(
            id,
            EntityRecord {
                entity_type,
                ranges,
                indexed,
            },
        );
    }

    /// Forget `id` and all its dependencies. Returns whether it was registered.
    pub fn unregister_entity(&mut self, id: &str) -> bool {
        let Some(record) = self.entities.remove(id) else {
            return false;
        };
        let id = id.to_string();
        for bbox in &record.indexed {
            self.tree.remove(bbox, &id);
        }
        true
    }

    /// Notify every entity reading any of `changed`, once each.
    ///
    /// Returns the notified ids in notification order.
    pub fn invalidate_entities_depending_on(&mut self, changed: &[BoundingBox]) -> Vec<String> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut notified = Vec::new();
        for bbox in changed {
            for payload in self.tree.search(bbox) {
                for id in &payload.0 {
                    if seen.insert(id.clone()) {
                        notified.push(id.clone());
                    }
                }
            }
        }

        for id in &notified {
            let Some(record) = self.entities.get(id) else {
                continue;
            };
            match self.callbacks.get_mut(&record.entity_type) {
                Some(callback) => callback(id),
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        entity = %id,
                        entity_type = ?record.entity_type,
                        "no invalidation callback registered"
                    );
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            changed = changed.len(),
            notified = notified.len(),
            "entity invalidation pass"
        );
        notified
    }

    pub fn entity_ranges(&self, id: &str) -> Option<&[Range]> {
        self.entities.get(id).map(|record| record.ranges.as_slice())
    }

    pub fn entity_type(&self, id: &str) -> Option<EntityType> {
        self.entities.get(id).map(|record| record.entity_type)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl RangeProvider for EntityDependencyRegistry {
    /// Adapt every entity's ranges to the edit and re-register it. Ranges
    /// removed by a row/column deletion are dropped; ranges whose sheet was
    /// deleted stay stored, unindexed, until a rename repairs them.
    fn adapt_ranges(&mut self, ctx: &AdaptContext<'_>) {
        let entities = std::mem::take(&mut self.entities);
        self.tree.clear();
        for (id, record) in entities {
            let ranges = record
                .ranges
                .iter()
                .filter_map(|range| ctx.apply(range).retained(range))
                .collect();
            self.register_entity(id, record.entity_type, ranges, ctx.sheets);
        }
    }
}

impl std::fmt::Debug for EntityDependencyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityDependencyRegistry")
            .field("entities", &self.entities.len())
            .field("leaves", &self.tree.len())
            .field("pending", &self.tree.pending_len())
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
