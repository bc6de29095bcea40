//! Answering "which formulas and entities read these cells?".
//!
//! [`ZoneSet`] and [`RangeSet`] are exact sets of cells whose size follows
//! the number of shape boundaries, not the number of cells. Two engines
//! implement [`DependencyIndex`]: the [`DependencyGrid`] bucket grid and the
//! R-tree backed [`DependenciesRTree`]. [`new_dependency_index`] picks one
//! from an [`IndexConfig`]. [`EntityDependencyRegistry`] does the same job
//! for charts, pivots and other non-formula consumers.

pub mod bucket_grid;
pub mod config;
pub mod dependencies_rtree;
pub mod entity_registry;
pub mod range_set;
pub mod rtree;
pub mod traits;
pub mod zone_set;

pub use bucket_grid::{DependencyGrid, DependencyGroup, GridStats, GroupId};
pub use config::{BucketGridConfig, IndexConfig, IndexEngine, new_dependency_index};
pub use dependencies_rtree::DependenciesRTree;
pub use entity_registry::{EntityDependencyRegistry, EntityType, InvalidationCallback};
pub use range_set::RangeSet;
pub use rtree::{LeafPayload, RTreeLeaf, SpreadsheetRTree};
pub use traits::DependencyIndex;
pub use zone_set::ZoneSet;
