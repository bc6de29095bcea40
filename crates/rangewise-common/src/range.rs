//! Sheet-scoped range references.
//!
//! A [`Range`] is a value: parsing and every structural adaptation produce a
//! new one, nothing mutates an existing range. Two failure states are kept as
//! data instead of errors:
//!
//! * `invalid_xc` - the text never parsed; it is echoed back verbatim when the
//!   range is serialised so a formula can still show what the user typed.
//! * `invalid_sheet_name` - the geometry is fine but the sheet is gone. The
//!   name is retained so re-creating (or renaming another sheet to) that name
//!   repairs the reference.

use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::coord::{
    RangePart, number_to_letters, parse_column_reference, parse_row_reference,
    to_cartesian_with_part,
};
use crate::error::RangeError;
use crate::sheet::{SheetDimensions, SheetId, SheetResolver};
use crate::zone::{BoundingBox, UnboundedZone, Zone};

/// Text rendered in place of a reference that cannot be resolved.
pub const INVALID_REFERENCE: &str = "#REF";

pub type RangeParts = SmallVec<[RangePart; 2]>;

/// Serialisation switches for [`Range::to_range_string`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RangeStringOptions {
    /// Render every corner with `$` anchors.
    pub use_fixed_reference: bool,
    /// Render whole rows/columns as explicit rectangles using the sheet size.
    pub use_bounded_reference: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Range {
    sheet_id: SheetId,
    zone: UnboundedZone,
    parts: RangeParts,
    prefix_sheet: bool,
    invalid_xc: Option<String>,
    invalid_sheet_name: Option<String>,
}

impl Range {
    /// Build a range from a zone with relative corners.
    pub fn from_zone(sheet_id: SheetId, zone: impl Into<UnboundedZone>) -> Self {
        let zone = zone.into();
        let single = zone.as_zone().is_some_and(|z| z.is_single_cell());
        let parts = if single {
            smallvec![RangePart::RELATIVE]
        } else {
            smallvec![RangePart::RELATIVE, RangePart::RELATIVE]
        };
        Self {
            sheet_id,
            zone,
            parts,
            prefix_sheet: false,
            invalid_xc: None,
            invalid_sheet_name: None,
        }
    }

    /// A range that failed to parse. Only its text survives.
    pub fn invalid(sheet_id: SheetId, xc: impl Into<String>) -> Self {
        Self {
            sheet_id,
            zone: Zone::cell(0, 0).into(),
            parts: SmallVec::new(),
            prefix_sheet: false,
            invalid_xc: Some(xc.into()),
            invalid_sheet_name: None,
        }
    }

    /// Parse `[Sheet!]A1[:B2]` (or whole rows/columns) relative to `default_sheet`.
    ///
    /// Never fails: malformed text yields an `invalid_xc` range and an unknown
    /// sheet name yields an `invalid_sheet_name` range on `default_sheet`.
    pub fn from_sheet_xc(
        default_sheet: SheetId,
        sheet_xc: &str,
        sheets: &(impl SheetResolver + ?Sized),
    ) -> Self {
        let (sheet_name, xc) = split_reference(sheet_xc);
        if sheet_name.as_deref() == Some("") {
            return Self::invalid(default_sheet, sheet_xc);
        }
        let Some((zone, parts)) = parse_unbounded_xc(xc) else {
            return Self::invalid(default_sheet, sheet_xc);
        };
        let (sheet_id, invalid_sheet_name) = match &sheet_name {
            Some(name) => match sheets.sheet_id(name) {
                Some(id) => (id, None),
                None => (default_sheet, Some(name.clone())),
            },
            None => (default_sheet, None),
        };
        let range = Self {
            sheet_id,
            zone,
            parts,
            prefix_sheet: sheet_name.is_some(),
            invalid_xc: None,
            invalid_sheet_name,
        };
        range.order_zone()
    }

    #[inline]
    pub fn sheet_id(&self) -> SheetId {
        self.sheet_id
    }

    /// The stored zone, open extents included.
    #[inline]
    pub fn unbounded_zone(&self) -> &UnboundedZone {
        &self.zone
    }

    #[inline]
    pub fn parts(&self) -> &[RangePart] {
        &self.parts
    }

    #[inline]
    pub fn prefix_sheet(&self) -> bool {
        self.prefix_sheet
    }

    #[inline]
    pub fn invalid_xc(&self) -> Option<&str> {
        self.invalid_xc.as_deref()
    }

    #[inline]
    pub fn invalid_sheet_name(&self) -> Option<&str> {
        self.invalid_sheet_name.as_deref()
    }

    /// Parsed successfully and points at an existing sheet.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.invalid_xc.is_none() && self.invalid_sheet_name.is_none()
    }

    #[inline]
    pub fn is_full_col(&self) -> bool {
        self.zone.is_full_col()
    }

    #[inline]
    pub fn is_full_row(&self) -> bool {
        self.zone.is_full_row()
    }

    /// Bounded zone, closing open extents at the sheet's current size.
    pub fn zone(&self, dims: SheetDimensions) -> Zone {
        self.zone.bounded(dims)
    }

    /// Bounded zone pinned to its sheet, resolving the sheet size through `sheets`.
    pub fn bounding_box(
        &self,
        sheets: &(impl SheetResolver + ?Sized),
    ) -> Result<BoundingBox, RangeError> {
        if let Some(xc) = &self.invalid_xc {
            return Err(RangeError::InvalidReference(xc.clone()));
        }
        if let Some(name) = &self.invalid_sheet_name {
            return Err(RangeError::UnresolvedSheet(name.clone()));
        }
        let dims = sheets
            .sheet_dimensions(self.sheet_id)
            .ok_or(RangeError::UnknownSheetId(self.sheet_id))?;
        Ok(BoundingBox::new(self.sheet_id, self.zone(dims)))
    }

    pub fn with_unbounded_zone(&self, zone: UnboundedZone) -> Self {
        Self {
            zone,
            ..self.clone()
        }
    }

    pub fn with_sheet_id(&self, sheet_id: SheetId) -> Self {
        Self {
            sheet_id,
            ..self.clone()
        }
    }

    pub fn with_prefix_sheet(&self, prefix_sheet: bool) -> Self {
        Self {
            prefix_sheet,
            ..self.clone()
        }
    }

    pub fn with_invalid_sheet_name(&self, invalid_sheet_name: Option<String>) -> Self {
        Self {
            invalid_sheet_name,
            ..self.clone()
        }
    }

    pub fn with_parts(&self, parts: &[RangePart]) -> Self {
        Self {
            parts: parts.iter().copied().collect(),
            ..self.clone()
        }
    }

    /// Swap inverted corners so `left <= right` and `top <= bottom`.
    ///
    /// Anchors travel with the coordinate they belong to: swapping columns
    /// swaps the `col_fixed` flags of the two parts, swapping rows swaps the
    /// `row_fixed` flags.
    pub fn order_zone(self) -> Self {
        if self.zone.is_ordered() {
            return self;
        }
        let mut zone = self.zone;
        let p0 = self.parts.first().copied().unwrap_or_default();
        let p1 = self.parts.get(1).copied().unwrap_or_default();
        let mut parts = [p0, p1];
        if let Some(right) = zone.right
            && right < zone.left
        {
            zone.right = Some(zone.left);
            zone.left = right;
            parts = [
                RangePart::new(parts[1].col_fixed, parts[0].row_fixed),
                RangePart::new(parts[0].col_fixed, parts[1].row_fixed),
            ];
        }
        if let Some(bottom) = zone.bottom
            && bottom < zone.top
        {
            zone.bottom = Some(zone.top);
            zone.top = bottom;
            parts = [
                RangePart::new(parts[0].col_fixed, parts[1].row_fixed),
                RangePart::new(parts[1].col_fixed, parts[0].row_fixed),
            ];
        }
        Self {
            zone,
            parts: SmallVec::from_slice(&parts),
            ..self
        }
    }

    /// Serialise as seen from a formula living on `for_sheet`.
    ///
    /// The sheet prefix is written when the range lives elsewhere or was
    /// explicitly prefixed. A two-part range whose corners coincide collapses
    /// to one part unless one of them is anchored.
    pub fn to_range_string(
        &self,
        for_sheet: SheetId,
        sheets: &(impl SheetResolver + ?Sized),
        options: RangeStringOptions,
    ) -> String {
        if let Some(xc) = &self.invalid_xc {
            return xc.clone();
        }
        if self.invalid_sheet_name.is_some() {
            return INVALID_REFERENCE.to_string();
        }
        let prefix = self.sheet_id != for_sheet || self.prefix_sheet;
        let sheet_name = if prefix {
            match sheets.sheet_name(self.sheet_id) {
                Some(name) => Some(canonical_sheet_name(name)),
                None => return INVALID_REFERENCE.to_string(),
            }
        } else {
            None
        };
        let bounded = if options.use_bounded_reference {
            let dims = sheets
                .sheet_dimensions(self.sheet_id)
                .unwrap_or_default();
            Some(self.zone(dims))
        } else {
            None
        };
        let body = self.body_string(options, bounded);
        match sheet_name {
            Some(name) => format!("{name}!{body}"),
            None => body,
        }
    }

    /// Serialise without any sheet prefix and without resolving sheet sizes.
    pub fn xc(&self) -> String {
        if let Some(xc) = &self.invalid_xc {
            return xc.clone();
        }
        self.body_string(RangeStringOptions::default(), None)
    }

    fn body_string(&self, options: RangeStringOptions, bounded: Option<Zone>) -> String {
        let mut out = self.part_string(0, options, bounded);
        if self.parts.len() == 2 {
            let collapses = self.zone.as_zone().is_some_and(|z| z.is_single_cell())
                && self.parts.iter().all(|p| p.is_relative());
            if !collapses {
                out.push(':');
                out.push_str(&self.part_string(1, options, bounded));
            }
        }
        out
    }

    fn part_string(&self, index: usize, options: RangeStringOptions, bounded: Option<Zone>) -> String {
        let part = if options.use_fixed_reference {
            RangePart::FIXED
        } else {
            self.parts.get(index).copied().unwrap_or_default()
        };
        let zone = &self.zone;
        let (col, row) = match bounded {
            Some(z) if index == 0 => (z.left, z.top),
            Some(z) => (z.right, z.bottom),
            None if index == 0 => (zone.left, zone.top),
            None => (
                zone.right.unwrap_or(zone.left),
                zone.bottom.unwrap_or(zone.top),
            ),
        };
        let col_text = || {
            let mut s = String::new();
            if part.col_fixed {
                s.push('$');
            }
            s.push_str(&number_to_letters(col));
            s
        };
        let row_text = || {
            let mut s = String::new();
            if part.row_fixed {
                s.push('$');
            }
            s.push_str(&(row + 1).to_string());
            s
        };
        let header = index == 0 && zone.has_header;
        if bounded.is_none() && zone.is_full_col() && !header {
            col_text()
        } else if bounded.is_none() && zone.is_full_row() && !header {
            row_text()
        } else {
            col_text() + &row_text()
        }
    }
}

/// Split `"Sheet!A1"` into the (unquoted) sheet name and the address part.
pub fn split_reference(reference: &str) -> (Option<String>, &str) {
    match reference.rfind('!') {
        Some(idx) => (
            Some(unquote_sheet_name(&reference[..idx])),
            &reference[idx + 1..],
        ),
        None => (None, reference),
    }
}

/// Quote a sheet name when it cannot appear bare in a reference.
pub fn canonical_sheet_name(name: &str) -> Cow<'_, str> {
    let needs_quotes = name.is_empty()
        || name.starts_with(|c: char| c.is_ascii_digit())
        || name
            .chars()
            .any(|c| !(c.is_alphanumeric() || c == '_' || c == '.'));
    if needs_quotes {
        Cow::Owned(format!("'{}'", name.replace('\'', "''")))
    } else {
        Cow::Borrowed(name)
    }
}

/// Whether `reference` (optionally sheet-prefixed) is syntactically a range reference.
pub fn is_reference(reference: &str) -> bool {
    let (sheet, xc) = split_reference(reference);
    sheet.as_deref() != Some("") && parse_unbounded_xc(xc).is_some()
}

fn unquote_sheet_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        trimmed[1..trimmed.len() - 1].replace("''", "'")
    } else {
        trimmed.to_string()
    }
}

#[derive(Clone, Copy)]
enum XcPart {
    Cell { col: u32, row: u32, part: RangePart },
    Col { col: u32, fixed: bool },
    Row { row: u32, fixed: bool },
}

fn parse_xc_part(text: &str) -> Option<XcPart> {
    if let Ok((pos, part)) = to_cartesian_with_part(text) {
        return Some(XcPart::Cell {
            col: pos.col,
            row: pos.row,
            part,
        });
    }
    if let Some((col, fixed)) = parse_column_reference(text) {
        return Some(XcPart::Col { col, fixed });
    }
    parse_row_reference(text).map(|(row, fixed)| XcPart::Row { row, fixed })
}

/// Parse the address part of a reference (no sheet prefix). Corners are not ordered yet.
fn parse_unbounded_xc(xc: &str) -> Option<(UnboundedZone, RangeParts)> {
    let (first, second) = match xc.split_once(':') {
        Some((a, b)) => (parse_xc_part(a)?, Some(parse_xc_part(b)?)),
        None => (parse_xc_part(xc)?, None),
    };
    match (first, second) {
        (XcPart::Cell { col, row, part }, None) => {
            Some((Zone::cell(col, row).into(), smallvec![part]))
        }
        // A bare column or row is a name, not a reference.
        (_, None) => None,
        (
            XcPart::Cell { col, row, part },
            Some(XcPart::Cell {
                col: col2,
                row: row2,
                part: part2,
            }),
        ) => {
            let zone = UnboundedZone {
                left: col,
                top: row,
                right: Some(col2),
                bottom: Some(row2),
                has_header: false,
            };
            Some((zone, smallvec![part, part2]))
        }
        (XcPart::Col { col, fixed }, Some(XcPart::Col { col: col2, fixed: fixed2 })) => Some((
            UnboundedZone::full_columns(col, col2),
            smallvec![RangePart::new(fixed, false), RangePart::new(fixed2, false)],
        )),
        (XcPart::Row { row, fixed }, Some(XcPart::Row { row: row2, fixed: fixed2 })) => Some((
            UnboundedZone::full_rows(row, row2),
            smallvec![RangePart::new(false, fixed), RangePart::new(false, fixed2)],
        )),
        (XcPart::Cell { col, row, part }, Some(XcPart::Col { col: col2, fixed }))
        | (XcPart::Col { col: col2, fixed }, Some(XcPart::Cell { col, row, part })) => {
            let zone = UnboundedZone {
                left: col,
                top: row,
                right: Some(col2),
                bottom: None,
                has_header: true,
            };
            Some((zone, smallvec![part, RangePart::new(fixed, false)]))
        }
        (XcPart::Cell { col, row, part }, Some(XcPart::Row { row: row2, fixed }))
        | (XcPart::Row { row: row2, fixed }, Some(XcPart::Cell { col, row, part })) => {
            let zone = UnboundedZone {
                left: col,
                top: row,
                right: None,
                bottom: Some(row2),
                has_header: true,
            };
            Some((zone, smallvec![part, RangePart::new(false, fixed)]))
        }
        (XcPart::Col { .. }, Some(XcPart::Row { .. }))
        | (XcPart::Row { .. }, Some(XcPart::Col { .. })) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::SheetRegistry;

    fn registry() -> (SheetRegistry, SheetId, SheetId) {
        let mut reg = SheetRegistry::new();
        let s1 = reg.add_sheet("Sheet1", SheetDimensions::new(26, 100)).unwrap();
        let s2 = reg.add_sheet("My Data", SheetDimensions::new(10, 20)).unwrap();
        (reg, s1, s2)
    }

    fn roundtrip(text: &str) -> String {
        let (reg, s1, _) = registry();
        Range::from_sheet_xc(s1, text, &reg).to_range_string(s1, &reg, Default::default())
    }

    #[test]
    fn parses_single_cell() {
        let (reg, s1, _) = registry();
        let r = Range::from_sheet_xc(s1, "$B$3", &reg);
        assert!(r.is_valid());
        assert_eq!(r.unbounded_zone().as_zone(), Some(Zone::cell(1, 2)));
        assert_eq!(r.parts(), &[RangePart::FIXED]);
        assert!(!r.prefix_sheet());
    }

    #[test]
    fn serialisation_round_trips() {
        for text in ["A1", "$A$1", "B2:C10", "A$1:$B2", "A:A", "$A:B", "3:5", "A2:A", "B3:5"] {
            assert_eq!(roundtrip(text), text);
        }
    }

    #[test]
    fn collapses_identical_relative_corners() {
        assert_eq!(roundtrip("A1:A1"), "A1");
        assert_eq!(roundtrip("A1:$A$1"), "A1:$A$1");
    }

    #[test]
    fn orders_inverted_corners_with_their_anchors() {
        let (reg, s1, _) = registry();
        let r = Range::from_sheet_xc(s1, "$C1:A$3", &reg);
        assert_eq!(r.unbounded_zone().as_zone(), Some(Zone::new(0, 0, 2, 2)));
        assert_eq!(r.to_range_string(s1, &reg, Default::default()), "A1:$C$3");
    }

    #[test]
    fn sheet_prefix_and_quoting() {
        let (reg, s1, s2) = registry();
        let r = Range::from_sheet_xc(s1, "'My Data'!A1:B2", &reg);
        assert_eq!(r.sheet_id(), s2);
        assert!(r.prefix_sheet());
        assert_eq!(
            r.to_range_string(s1, &reg, Default::default()),
            "'My Data'!A1:B2"
        );

        let local = Range::from_zone(s1, Zone::new(0, 0, 1, 1));
        assert_eq!(local.to_range_string(s1, &reg, Default::default()), "A1:B2");
        assert_eq!(
            local.to_range_string(s2, &reg, Default::default()),
            "Sheet1!A1:B2"
        );
    }

    #[test]
    fn unknown_sheet_keeps_geometry() {
        let (reg, s1, _) = registry();
        let r = Range::from_sheet_xc(s1, "Gone!C4", &reg);
        assert_eq!(r.invalid_sheet_name(), Some("Gone"));
        assert_eq!(r.sheet_id(), s1);
        assert_eq!(r.unbounded_zone().as_zone(), Some(Zone::cell(2, 3)));
        assert_eq!(
            r.to_range_string(s1, &reg, Default::default()),
            INVALID_REFERENCE
        );
        assert!(matches!(
            r.bounding_box(&reg),
            Err(RangeError::UnresolvedSheet(_))
        ));
    }

    #[test]
    fn malformed_text_is_echoed() {
        let (reg, s1, _) = registry();
        for text in ["A", "hello", "A1:", "A:1", "AAAA1", "A10000000", "!A1"] {
            let r = Range::from_sheet_xc(s1, text, &reg);
            assert_eq!(r.invalid_xc(), Some(text), "{text}");
            assert_eq!(r.to_range_string(s1, &reg, Default::default()), text);
        }
    }

    #[test]
    fn reference_syntax_check() {
        assert!(is_reference("A1"));
        assert!(is_reference("'My Data'!$B:$C"));
        assert!(is_reference("3:5"));
        assert!(!is_reference("SUM"));
        assert!(!is_reference("12"));
        assert!(!is_reference("!A1"));
    }

    #[test]
    fn options_fix_and_bound() {
        let (reg, s1, _) = registry();
        let r = Range::from_sheet_xc(s1, "A:B", &reg);
        let fixed = RangeStringOptions {
            use_fixed_reference: true,
            ..Default::default()
        };
        assert_eq!(r.to_range_string(s1, &reg, fixed), "$A:$B");
        let bounded = RangeStringOptions {
            use_bounded_reference: true,
            ..Default::default()
        };
        assert_eq!(r.to_range_string(s1, &reg, bounded), "A1:B100");
        assert_eq!(
            r.bounding_box(&reg),
            Ok(BoundingBox::new(s1, Zone::new(0, 0, 1, 99)))
        );
    }
}
