//! Rectangles of cells by integer coordinates.
//!
//! A [`Zone`] is always bounded and inclusive on every side. An
//! [`UnboundedZone`] may leave `right` and/or `bottom` open, which is how
//! whole-row (`3:3`) and whole-column (`A:A`) references are stored until a
//! sheet size is known.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coord::{RangePart, number_to_letters, to_cartesian, to_xc};
use crate::error::CoordParseError;
use crate::sheet::{SheetDimensions, SheetId};

/// Inclusive, zero-based rectangle. Invariant: `left <= right`, `top <= bottom`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Zone {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Zone {
    /// Build a zone from two opposite corners in any order.
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left: left.min(right),
            top: top.min(bottom),
            right: left.max(right),
            bottom: top.max(bottom),
        }
    }

    #[inline]
    pub const fn cell(col: u32, row: u32) -> Self {
        Self {
            left: col,
            top: row,
            right: col,
            bottom: row,
        }
    }

    /// Parse `"B2"` or `"B2:C10"` into a zone. Anchors are ignored.
    pub fn from_xc(xc: &str) -> Result<Self, CoordParseError> {
        match xc.split_once(':') {
            Some((a, b)) => {
                let a = to_cartesian(a)?;
                let b = to_cartesian(b)?;
                Ok(Self::new(a.col, a.row, b.col, b.row))
            }
            None => {
                let p = to_cartesian(xc)?;
                Ok(Self::cell(p.col, p.row))
            }
        }
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    pub const fn cell_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    #[inline]
    pub const fn is_single_cell(&self) -> bool {
        self.left == self.right && self.top == self.bottom
    }

    #[inline]
    pub const fn contains(&self, col: u32, row: u32) -> bool {
        self.left <= col && col <= self.right && self.top <= row && row <= self.bottom
    }

    /// `other` lies entirely inside `self`.
    #[inline]
    pub const fn contains_zone(&self, other: &Zone) -> bool {
        self.left <= other.left
            && other.right <= self.right
            && self.top <= other.top
            && other.bottom <= self.bottom
    }

    #[inline]
    pub const fn intersects(&self, other: &Zone) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top <= other.bottom
            && other.top <= self.bottom
    }

    pub fn intersection(&self, other: &Zone) -> Option<Zone> {
        if !self.intersects(other) {
            return None;
        }
        Some(Zone {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        })
    }

    /// Smallest zone covering both.
    pub fn union(&self, other: &Zone) -> Zone {
        Zone {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", to_xc(self.left, self.top, RangePart::RELATIVE))?;
        if !self.is_single_cell() {
            write!(f, ":{}", to_xc(self.right, self.bottom, RangePart::RELATIVE))?;
        }
        Ok(())
    }
}

/// A zone whose `right` (whole rows) or `bottom` (whole columns) may be open.
///
/// `has_header` marks the anchored variants such as `A2:A` or `B3:5`, where
/// the open extent starts from an explicit cell instead of the sheet edge.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct UnboundedZone {
    pub left: u32,
    pub top: u32,
    pub right: Option<u32>,
    pub bottom: Option<u32>,
    pub has_header: bool,
}

impl UnboundedZone {
    /// Whole columns `left..=right`.
    pub const fn full_columns(left: u32, right: u32) -> Self {
        Self {
            left,
            top: 0,
            right: Some(right),
            bottom: None,
            has_header: false,
        }
    }

    /// Whole rows `top..=bottom`.
    pub const fn full_rows(top: u32, bottom: u32) -> Self {
        Self {
            left: 0,
            top,
            right: None,
            bottom: Some(bottom),
            has_header: false,
        }
    }

    #[inline]
    pub const fn is_full_col(&self) -> bool {
        self.bottom.is_none()
    }

    #[inline]
    pub const fn is_full_row(&self) -> bool {
        self.right.is_none()
    }

    #[inline]
    pub const fn is_bounded(&self) -> bool {
        self.right.is_some() && self.bottom.is_some()
    }

    /// Bounded view, when no extent is open.
    pub fn as_zone(&self) -> Option<Zone> {
        Some(Zone {
            left: self.left,
            top: self.top,
            right: self.right?,
            bottom: self.bottom?,
        })
    }

    /// Close any open extent at the sheet's last row/column.
    pub fn bounded(&self, dims: SheetDimensions) -> Zone {
        let right = self
            .right
            .unwrap_or_else(|| dims.number_of_cols.saturating_sub(1).max(self.left));
        let bottom = self
            .bottom
            .unwrap_or_else(|| dims.number_of_rows.saturating_sub(1).max(self.top));
        Zone {
            left: self.left,
            top: self.top,
            right,
            bottom,
        }
    }

    /// `left <= right` and `top <= bottom` wherever the extent is closed.
    pub fn is_ordered(&self) -> bool {
        self.right.is_none_or(|r| self.left <= r) && self.bottom.is_none_or(|b| self.top <= b)
    }
}

impl From<Zone> for UnboundedZone {
    fn from(zone: Zone) -> Self {
        Self {
            left: zone.left,
            top: zone.top,
            right: Some(zone.right),
            bottom: Some(zone.bottom),
            has_header: false,
        }
    }
}

impl fmt::Display for UnboundedZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.right, self.bottom) {
            (Some(right), Some(bottom)) => {
                write!(f, "{}", Zone::new(self.left, self.top, right, bottom))
            }
            (Some(right), None) => {
                if self.has_header {
                    write!(f, "{}{}", number_to_letters(self.left), self.top + 1)?;
                } else {
                    write!(f, "{}", number_to_letters(self.left))?;
                }
                write!(f, ":{}", number_to_letters(right))
            }
            (None, Some(bottom)) => {
                if self.has_header {
                    write!(f, "{}{}", number_to_letters(self.left), self.top + 1)?;
                } else {
                    write!(f, "{}", self.top + 1)?;
                }
                write!(f, ":{}", bottom + 1)
            }
            (None, None) => write!(f, "{}{}:", number_to_letters(self.left), self.top + 1),
        }
    }
}

/// A zone pinned to a sheet. This is the key type of every dependency index.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct BoundingBox {
    pub sheet_id: SheetId,
    pub zone: Zone,
}

impl BoundingBox {
    #[inline]
    pub const fn new(sheet_id: SheetId, zone: Zone) -> Self {
        Self { sheet_id, zone }
    }

    #[inline]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.sheet_id == other.sheet_id && self.zone.intersects(&other.zone)
    }
}

/// A single cell on a sheet, typically the position of a formula.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CellPosition {
    pub sheet_id: SheetId,
    pub col: u32,
    pub row: u32,
}

impl CellPosition {
    #[inline]
    pub const fn new(sheet_id: SheetId, col: u32, row: u32) -> Self {
        Self { sheet_id, col, row }
    }

    #[inline]
    pub const fn zone(&self) -> Zone {
        Zone::cell(self.col, self.row)
    }

    #[inline]
    pub const fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.sheet_id, self.zone())
    }
}
