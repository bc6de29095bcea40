//! Meta crate that re-exports the rangewise layers. Depend on this crate and
//! opt into layers with feature flags, or depend on the layer crates
//! directly for deeper integration.
//!
//! ```rust
//! use rangewise::{
//!     BoundingBox, CellPosition, DependencyIndex, Dimension, IndexConfig, Range,
//!     SheetDimensions, SheetRegistry, StructuralEdit, Zone, get_apply_range_change,
//!     new_dependency_index,
//! };
//!
//! let mut sheets = SheetRegistry::new();
//! let sheet = sheets.add_sheet("Sheet1", SheetDimensions::new(26, 100))?;
//!
//! // F1 reads B1:D1.
//! let dependency = Range::from_sheet_xc(sheet, "B1:D1", &sheets);
//! let mut index = new_dependency_index(IndexConfig::default());
//! index.insert(&dependency.bounding_box(&sheets)?, CellPosition::new(sheet, 5, 0));
//!
//! let dirty = index.search(&BoundingBox::new(sheet, Zone::from_xc("C1")?));
//! assert_eq!(dirty.positions(), vec![CellPosition::new(sheet, 5, 0)]);
//!
//! // Deleting columns B and C shrinks the reference to B1.
//! let edit = StructuralEdit::RemoveColumnsRows {
//!     sheet_id: sheet,
//!     sheet_name: "Sheet1".into(),
//!     dimension: Dimension::Col,
//!     elements: vec![1, 2],
//! };
//! let adapted = get_apply_range_change(&edit).apply(&dependency);
//! assert_eq!(adapted.range().map(|r| r.xc()), Some("B1".to_string()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(feature = "common")]
pub use rangewise_common as common;

#[cfg(feature = "adapt")]
pub use rangewise_adapt as adapt;

#[cfg(feature = "index")]
pub use rangewise_index as index;

#[cfg(feature = "common")]
pub use rangewise_common::{
    BoundingBox, CellPosition, CoordParseError, Range, RangeError, RangeStringOptions,
    SheetDimensions, SheetId, SheetRegistry, SheetResolver, UnboundedZone, Zone,
};

#[cfg(feature = "adapt")]
pub use rangewise_adapt::{
    AdapterError, ChangeType, Dimension, InsertPosition, RangeAdapter, RangeChange,
    RangeProvider, StructuralEdit, get_apply_range_change,
};

#[cfg(feature = "index")]
pub use rangewise_index::{
    DependencyIndex, EntityDependencyRegistry, EntityType, IndexConfig, RangeSet, ZoneSet,
    new_dependency_index,
};
