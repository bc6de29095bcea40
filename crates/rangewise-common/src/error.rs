//! Error types for address parsing and range materialisation.
//!
//! Parse failures stay inside this crate's API surface: `Range` construction
//! turns a [`CoordParseError`] into an invalid range that echoes its text back,
//! so callers only meet these errors when they use the low-level codec directly.

use thiserror::Error;

use crate::sheet::SheetId;

/// Malformed single-cell address text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordParseError {
    #[error("invalid cell description '{0}': missing column letters")]
    MissingColumn(String),
    #[error("invalid cell description '{0}': missing row digits")]
    MissingRow(String),
    #[error("invalid cell description '{0}': unexpected trailing characters")]
    TrailingCharacters(String),
    #[error("invalid cell description '{0}': row numbers start at 1")]
    ZeroRow(String),
    #[error("invalid cell description '{0}': column exceeds ZZZ")]
    ColumnOutOfBounds(String),
    #[error("invalid cell description '{0}': row exceeds 9999999")]
    RowOutOfBounds(String),
}

/// Errors raised when a range is asked for something its validity state cannot provide.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The range never parsed; only its original text is known.
    #[error("range '{0}' is not a valid reference")]
    InvalidReference(String),
    /// The range points at a sheet that no longer exists.
    #[error("sheet '{0}' does not exist")]
    UnresolvedSheet(String),
    /// The sheet id is not known to the resolver.
    #[error("unknown sheet id {0}")]
    UnknownSheetId(SheetId),
}

/// Errors from the in-memory sheet table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    /// Every sheet id has been handed out; ids of deleted sheets are not reused.
    #[error("cannot create sheet '{0}': sheet ids are exhausted")]
    IdsExhausted(String),
}
