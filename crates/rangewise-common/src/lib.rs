//! Shared value types for rangewise: the A1 codec, zones, sheets, and ranges.

pub mod coord;
pub mod error;
pub mod range;
pub mod sheet;
pub mod zone;

pub use coord::{
    MAX_COL, MAX_ROW, Position, RangePart, letters_to_number, number_to_letters, to_cartesian,
    to_cartesian_with_part, to_xc,
};
pub use error::{CoordParseError, RangeError, SheetError};
pub use range::{
    INVALID_REFERENCE, Range, RangeParts, RangeStringOptions, canonical_sheet_name,
    is_reference, split_reference,
};
pub use sheet::{SheetDimensions, SheetId, SheetRegistry, SheetResolver};
pub use zone::{BoundingBox, CellPosition, UnboundedZone, Zone};
