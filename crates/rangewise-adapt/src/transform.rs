//! Range transformation algebra.
//!
//! Every structural edit is turned into a pure function from a range to a
//! [`RangeChange`]. The per-edit rules compute in signed coordinates on a
//! draft zone; a single wrapper then decides whether the draft is still a
//! valid rectangle. Anything that ended up with a negative coordinate, past
//! `MAX_COL`/`MAX_ROW`, or with `right < left` / `bottom < top` is reported as
//! a removal, so no rule has to special-case "shrunk to nothing".

use rangewise_common::{MAX_COL, MAX_ROW, Range, SheetId, UnboundedZone, Zone};
use smallvec::SmallVec;

use crate::change::{ChangeType, RangeChange};
use crate::command::{Dimension, InsertPosition, StructuralEdit};

/// Boxed transformation produced for one edit.
pub type ApplyRangeChange = Box<dyn Fn(&Range) -> RangeChange>;

/// Name of the edited sheet before and after the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    pub old: String,
    pub current: String,
}

/// Everything a range holder needs to adapt its ranges to one edit.
pub struct RangeAdapterFunctions {
    pub sheet_id: SheetId,
    pub sheet_name: SheetNames,
    apply: ApplyRangeChange,
}

impl RangeAdapterFunctions {
    #[inline]
    pub fn apply(&self, range: &Range) -> RangeChange {
        (self.apply)(range)
    }
}

impl std::fmt::Debug for RangeAdapterFunctions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeAdapterFunctions")
            .field("sheet_id", &self.sheet_id)
            .field("sheet_name", &self.sheet_name)
            .finish_non_exhaustive()
    }
}

/// Build the transformation for `edit`, already wrapped with the geometry check.
pub fn get_apply_range_change(edit: &StructuralEdit) -> RangeAdapterFunctions {
    let raw: Box<dyn Fn(&Range) -> RawChange> = match edit.clone() {
        StructuralEdit::AddColumnsRows {
            sheet_id,
            dimension,
            base,
            quantity,
            position,
            ..
        } => Box::new(move |range| {
            add_columns_rows(range, sheet_id, dimension, base, quantity, position)
        }),
        StructuralEdit::RemoveColumnsRows {
            sheet_id,
            dimension,
            elements,
            ..
        } => {
            let groups = group_consecutive(&elements);
            Box::new(move |range| remove_columns_rows(range, sheet_id, dimension, &groups))
        }
        StructuralEdit::RenameSheet {
            sheet_id,
            old_name,
            new_name,
        } => Box::new(move |range| rename_sheet(range, sheet_id, &old_name, &new_name)),
        StructuralEdit::MoveSheet { .. } => Box::new(|_| RawChange::None),
        StructuralEdit::DeleteSheet {
            sheet_id,
            sheet_name,
        } => Box::new(move |range| delete_sheet(range, sheet_id, &sheet_name)),
        StructuralEdit::MoveRanges {
            sheet_id,
            source,
            target_sheet_id,
            col,
            row,
            ..
        } => Box::new(move |range| {
            move_ranges(range, sheet_id, source, target_sheet_id, col, row)
        }),
    };
    RangeAdapterFunctions {
        sheet_id: edit.sheet_id(),
        sheet_name: SheetNames {
            old: edit.sheet_name().to_string(),
            current: edit.current_sheet_name().to_string(),
        },
        apply: Box::new(move |range| verify_range_removed(raw(range), range)),
    }
}

/// Sort `elements` descending and split them into runs of consecutive indexes.
///
/// Each run is returned as `(min, max)`. Duplicates are ignored.
pub fn group_consecutive(elements: &[u32]) -> SmallVec<[(u32, u32); 4]> {
    let mut sorted: SmallVec<[u32; 8]> = elements.iter().copied().collect();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let mut groups: SmallVec<[(u32, u32); 4]> = SmallVec::new();
    for index in sorted {
        match groups.last_mut() {
            Some((min, _)) if index + 1 == *min => *min = index,
            _ => groups.push((index, index)),
        }
    }
    groups
}

/// Signed working copy of a zone. May be degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DraftZone {
    left: i64,
    top: i64,
    right: Option<i64>,
    bottom: Option<i64>,
    has_header: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    /// Translate the start and any closed end.
    Move,
    /// Only stretch the closed end.
    Resize,
}

impl From<&UnboundedZone> for DraftZone {
    fn from(zone: &UnboundedZone) -> Self {
        Self {
            left: zone.left as i64,
            top: zone.top as i64,
            right: zone.right.map(i64::from),
            bottom: zone.bottom.map(i64::from),
            has_header: zone.has_header,
        }
    }
}

impl From<Zone> for DraftZone {
    fn from(zone: Zone) -> Self {
        DraftZone::from(&UnboundedZone::from(zone))
    }
}

impl DraftZone {
    fn axis(&self, dimension: Dimension) -> (i64, Option<i64>) {
        match dimension {
            Dimension::Col => (self.left, self.right),
            Dimension::Row => (self.top, self.bottom),
        }
    }

    fn shifted(mut self, dimension: Dimension, shift: Shift, offset: i64) -> Self {
        let (start, end) = match dimension {
            Dimension::Col => (&mut self.left, &mut self.right),
            Dimension::Row => (&mut self.top, &mut self.bottom),
        };
        if shift == Shift::Move {
            *start += offset;
        }
        if let Some(end) = end {
            *end += offset;
        }
        self
    }

    /// Back to unsigned coordinates, or `None` when the draft is no longer an
    /// addressable rectangle.
    fn finish(self) -> Option<UnboundedZone> {
        let left = addressable(self.left, MAX_COL)?;
        let top = addressable(self.top, MAX_ROW)?;
        let right = match self.right {
            Some(r) if r < self.left => return None,
            Some(r) => Some(addressable(r, MAX_COL)?),
            None => None,
        };
        let bottom = match self.bottom {
            Some(b) if b < self.top => return None,
            Some(b) => Some(addressable(b, MAX_ROW)?),
            None => None,
        };
        Some(UnboundedZone {
            left,
            top,
            right,
            bottom,
            has_header: self.has_header,
        })
    }
}

fn addressable(coord: i64, max: u32) -> Option<u32> {
    u32::try_from(coord).ok().filter(|&c| c <= max)
}

/// Result of a rule before the geometry check.
enum RawChange {
    None,
    Move(Range, DraftZone),
    Resize(Range, DraftZone),
    Remove(Range),
    Change(Range),
}

fn verify_range_removed(raw: RawChange, original: &Range) -> RangeChange {
    match raw {
        RawChange::None => RangeChange::None,
        RawChange::Remove(range) => RangeChange::Remove(range),
        RawChange::Change(range) => RangeChange::Change(range),
        RawChange::Move(range, draft) => match draft.finish() {
            Some(zone) => RangeChange::Move(range.with_unbounded_zone(zone)),
            None => RangeChange::Remove(original.clone()),
        },
        RawChange::Resize(range, draft) => match draft.finish() {
            Some(zone) => RangeChange::Resize(range.with_unbounded_zone(zone)),
            None => RangeChange::Remove(original.clone()),
        },
    }
}

/// A whole column seen along rows (or a whole row seen along columns) has no
/// start to move and no end to resize.
fn spans_whole_axis(zone: &UnboundedZone, dimension: Dimension) -> bool {
    !zone.has_header
        && match dimension {
            Dimension::Col => zone.right.is_none(),
            Dimension::Row => zone.bottom.is_none(),
        }
}

/// Ranges a geometric edit on `sheet_id` can touch.
fn is_geometric_target(range: &Range, sheet_id: SheetId, dimension: Dimension) -> bool {
    range.sheet_id() == sheet_id
        && range.is_valid()
        && !spans_whole_axis(range.unbounded_zone(), dimension)
}

fn add_columns_rows(
    range: &Range,
    sheet_id: SheetId,
    dimension: Dimension,
    base: u32,
    quantity: u32,
    position: InsertPosition,
) -> RawChange {
    if !is_geometric_target(range, sheet_id, dimension) {
        return RawChange::None;
    }
    let draft = DraftZone::from(range.unbounded_zone());
    let (start, end) = draft.axis(dimension);
    let base = base as i64;
    let quantity = quantity as i64;
    // An open end reaches past any insertion point. It stays open on resize.
    let (resizes, moves) = match position {
        InsertPosition::After => (
            start <= base && end.is_none_or(|end| base < end),
            base < start,
        ),
        InsertPosition::Before => (
            start < base && end.is_none_or(|end| base <= end),
            base <= start,
        ),
    };
    if resizes {
        RawChange::Resize(
            range.clone(),
            draft.shifted(dimension, Shift::Resize, quantity),
        )
    } else if moves {
        RawChange::Move(range.clone(), draft.shifted(dimension, Shift::Move, quantity))
    } else {
        RawChange::None
    }
}

fn remove_columns_rows(
    range: &Range,
    sheet_id: SheetId,
    dimension: Dimension,
    groups: &[(u32, u32)],
) -> RawChange {
    if !is_geometric_target(range, sheet_id, dimension) {
        return RawChange::None;
    }
    // Cases are decided on the original span; runs are visited from the
    // highest index down, so a run never shifts the coordinates a later
    // (lower) run is compared against.
    let original = DraftZone::from(range.unbounded_zone());
    let (start, end) = original.axis(dimension);
    let open_end = end.unwrap_or(i64::MAX);
    let mut draft = original;
    let mut change = ChangeType::None;

    for &(min, max) in groups {
        let (min, max) = (min as i64, max as i64);
        if start <= min && min <= open_end {
            // Run starts inside the span. An open end stays open.
            let removed = open_end.min(max) - min + 1;
            draft = draft.shifted(dimension, Shift::Resize, -removed);
            change = ChangeType::Resize;
        } else if start >= min && end.is_some_and(|end| end <= max) {
            return RawChange::Remove(range.clone());
        } else if start <= max && open_end >= max {
            // Run overlaps the start of the span.
            draft = draft
                .shifted(dimension, Shift::Resize, -(max - start + 1))
                .shifted(dimension, Shift::Move, -(start - min));
            change = ChangeType::Resize;
        } else if max < start {
            draft = draft.shifted(dimension, Shift::Move, -(max - min + 1));
            if change == ChangeType::None {
                change = ChangeType::Move;
            }
        }
    }

    match change {
        ChangeType::Resize => RawChange::Resize(range.clone(), draft),
        ChangeType::Move => RawChange::Move(range.clone(), draft),
        _ => RawChange::None,
    }
}

/// Sheet names compare case-insensitively, like sheet lookups do.
fn same_sheet_name(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Every range on the deleted sheet is removed. A range that already lost its
/// sheet keeps the name it is waiting for.
fn delete_sheet(range: &Range, sheet_id: SheetId, sheet_name: &str) -> RawChange {
    let orphaned_here = range
        .invalid_sheet_name()
        .is_some_and(|name| same_sheet_name(name, sheet_name));
    if range.sheet_id() != sheet_id && !orphaned_here {
        return RawChange::None;
    }
    let name = range.invalid_sheet_name().unwrap_or(sheet_name).to_string();
    RawChange::Remove(range.with_invalid_sheet_name(Some(name)))
}

fn rename_sheet(range: &Range, sheet_id: SheetId, old_name: &str, new_name: &str) -> RawChange {
    match range.invalid_sheet_name() {
        None if range.sheet_id() == sheet_id => RawChange::Change(range.clone()),
        Some(name) if same_sheet_name(name, new_name) || same_sheet_name(name, old_name) => {
            RawChange::Change(range.with_sheet_id(sheet_id).with_invalid_sheet_name(None))
        }
        _ => RawChange::None,
    }
}

fn move_ranges(
    range: &Range,
    sheet_id: SheetId,
    source: Zone,
    target_sheet_id: SheetId,
    col: u32,
    row: u32,
) -> RawChange {
    if range.sheet_id() != sheet_id || !range.is_valid() {
        return RawChange::None;
    }
    // Whole rows/columns cannot fit inside a finite source.
    let Some(zone) = range.unbounded_zone().as_zone() else {
        return RawChange::None;
    };
    if !source.contains_zone(&zone) {
        return RawChange::None;
    }
    let draft = DraftZone::from(zone)
        .shifted(
            Dimension::Col,
            Shift::Move,
            col as i64 - source.left as i64,
        )
        .shifted(Dimension::Row, Shift::Move, row as i64 - source.top as i64);
    let prefix_sheet = target_sheet_id != sheet_id || range.prefix_sheet();
    let moved = range
        .with_sheet_id(target_sheet_id)
        .with_prefix_sheet(prefix_sheet);
    RawChange::Move(moved, draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangewise_common::{SheetDimensions, SheetRegistry};

    struct Fixture {
        sheets: SheetRegistry,
        s1: SheetId,
        s2: SheetId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut sheets = SheetRegistry::new();
            let s1 = sheets.add_sheet("Sheet1", SheetDimensions::new(26, 100)).unwrap();
            let s2 = sheets.add_sheet("Sheet2", SheetDimensions::new(26, 100)).unwrap();
            Self { sheets, s1, s2 }
        }

        fn range(&self, xc: &str) -> Range {
            Range::from_sheet_xc(self.s1, xc, &self.sheets)
        }

        /// Apply `edit` to `xc` (on Sheet1) and render the outcome from Sheet1.
        fn apply(&self, edit: &StructuralEdit, xc: &str) -> (ChangeType, String) {
            let change = get_apply_range_change(edit).apply(&self.range(xc));
            let text = change
                .range()
                .map(|r| r.to_range_string(self.s1, &self.sheets, Default::default()))
                .unwrap_or_default();
            (change.change_type(), text)
        }

        fn add(&self, dimension: Dimension, base: u32, position: InsertPosition) -> StructuralEdit {
            StructuralEdit::AddColumnsRows {
                sheet_id: self.s1,
                sheet_name: "Sheet1".into(),
                dimension,
                base,
                quantity: 1,
                position,
            }
        }

        fn remove(&self, dimension: Dimension, elements: &[u32]) -> StructuralEdit {
            StructuralEdit::RemoveColumnsRows {
                sheet_id: self.s1,
                sheet_name: "Sheet1".into(),
                dimension,
                elements: elements.to_vec(),
            }
        }
    }

    fn none() -> (ChangeType, String) {
        (ChangeType::None, String::new())
    }

    #[test]
    fn groups_consecutive_runs_descending() {
        assert_eq!(
            group_consecutive(&[1, 2, 5, 3, 9, 8]).as_slice(),
            &[(8, 9), (5, 5), (1, 3)]
        );
        assert_eq!(group_consecutive(&[4, 4, 3]).as_slice(), &[(3, 4)]);
        assert!(group_consecutive(&[]).is_empty());
    }

    #[test]
    fn add_columns_after_base() {
        let f = Fixture::new();
        let edit = f.add(Dimension::Col, 2, InsertPosition::After);
        assert_eq!(f.apply(&edit, "A1:B1"), none());
        assert_eq!(f.apply(&edit, "A1:C1"), none());
        assert_eq!(f.apply(&edit, "C1"), none());
        assert_eq!(f.apply(&edit, "A1:D1"), (ChangeType::Resize, "A1:E1".into()));
        assert_eq!(f.apply(&edit, "C1:D1"), (ChangeType::Resize, "C1:E1".into()));
        assert_eq!(f.apply(&edit, "D1:E1"), (ChangeType::Move, "E1:F1".into()));
        assert_eq!(f.apply(&edit, "$D$1"), (ChangeType::Move, "$E$1".into()));
    }

    #[test]
    fn add_columns_before_base() {
        let f = Fixture::new();
        let edit = f.add(Dimension::Col, 2, InsertPosition::Before);
        assert_eq!(f.apply(&edit, "A1:B1"), none());
        assert_eq!(f.apply(&edit, "A1:C1"), (ChangeType::Resize, "A1:D1".into()));
        assert_eq!(f.apply(&edit, "B1:C1"), (ChangeType::Resize, "B1:D1".into()));
        assert_eq!(f.apply(&edit, "C1:D1"), (ChangeType::Move, "D1:E1".into()));
        assert_eq!(f.apply(&edit, "C1"), (ChangeType::Move, "D1".into()));
    }

    #[test]
    fn add_rows_boundaries() {
        let f = Fixture::new();
        let after = f.add(Dimension::Row, 1, InsertPosition::After);
        assert_eq!(f.apply(&after, "A1:A2"), none());
        assert_eq!(f.apply(&after, "A2:A3"), (ChangeType::Resize, "A2:A4".into()));
        assert_eq!(f.apply(&after, "A3"), (ChangeType::Move, "A4".into()));

        let before = f.add(Dimension::Row, 1, InsertPosition::Before);
        assert_eq!(f.apply(&before, "A1"), none());
        assert_eq!(f.apply(&before, "A1:A2"), (ChangeType::Resize, "A1:A3".into()));
        assert_eq!(f.apply(&before, "A2:A3"), (ChangeType::Move, "A3:A4".into()));
    }

    #[test]
    fn add_on_other_sheet_is_none() {
        let f = Fixture::new();
        let edit = StructuralEdit::AddColumnsRows {
            sheet_id: f.s2,
            sheet_name: "Sheet2".into(),
            dimension: Dimension::Col,
            base: 0,
            quantity: 3,
            position: InsertPosition::Before,
        };
        assert_eq!(f.apply(&edit, "B2:C3"), none());
    }

    #[test]
    fn whole_rows_and_columns_on_insert() {
        let f = Fixture::new();
        let rows = f.add(Dimension::Row, 0, InsertPosition::Before);
        assert_eq!(f.apply(&rows, "A:A"), none());
        assert_eq!(f.apply(&rows, "A2:A"), (ChangeType::Move, "A3:A".into()));
        assert_eq!(f.apply(&rows, "2:3"), (ChangeType::Move, "3:4".into()));

        let cols = f.add(Dimension::Col, 1, InsertPosition::Before);
        assert_eq!(f.apply(&cols, "B:C"), (ChangeType::Move, "C:D".into()));
        assert_eq!(f.apply(&cols, "A:C"), (ChangeType::Resize, "A:D".into()));
        assert_eq!(f.apply(&cols, "3:5"), none());
    }

    #[test]
    fn remove_columns_reference_scenarios() {
        let f = Fixture::new();
        let resize = f.remove(Dimension::Col, &[1, 2]);
        assert_eq!(f.apply(&resize, "B1:D1"), (ChangeType::Resize, "B1".into()));

        let shift = f.remove(Dimension::Col, &[0]);
        assert_eq!(f.apply(&shift, "B1:D1"), (ChangeType::Move, "A1:C1".into()));
    }

    #[test]
    fn remove_columns_cases() {
        let f = Fixture::new();
        // Run past the span.
        assert_eq!(f.apply(&f.remove(Dimension::Col, &[4]), "B1:D1"), none());
        // Run covering the span.
        let (kind, _) = f.apply(&f.remove(Dimension::Col, &[0, 1, 2, 3, 4]), "B1:D1");
        assert_eq!(kind, ChangeType::Remove);
        // Run starting on the span start and covering it: caught by the geometry check.
        let (kind, _) = f.apply(&f.remove(Dimension::Col, &[1, 2, 3]), "B1:D1");
        assert_eq!(kind, ChangeType::Remove);
        // Run overlapping the span start.
        assert_eq!(
            f.apply(&f.remove(Dimension::Col, &[0, 1, 2]), "C1:E1"),
            (ChangeType::Resize, "A1:B1".into())
        );
        // Two runs: one inside, one before.
        assert_eq!(
            f.apply(&f.remove(Dimension::Col, &[2, 0]), "B1:D1"),
            (ChangeType::Resize, "A1:B1".into())
        );
    }

    #[test]
    fn remove_rows_with_open_extents() {
        let f = Fixture::new();
        let edit = f.remove(Dimension::Row, &[1, 2, 3]);
        assert_eq!(f.apply(&edit, "A:B"), none());
        assert_eq!(f.apply(&edit, "A3:A"), (ChangeType::Resize, "A2:A".into()));
        assert_eq!(f.apply(&edit, "A6:A"), (ChangeType::Move, "A3:A".into()));
        assert_eq!(f.apply(&edit, "A1:A"), (ChangeType::Resize, "A1:A".into()));
        assert_eq!(f.apply(&edit, "1:8"), (ChangeType::Resize, "1:5".into()));
    }

    #[test]
    fn header_ranges_resize_when_the_edit_lands_inside() {
        let f = Fixture::new();
        let header = "A2:A";
        let before = |base| f.add(Dimension::Row, base, InsertPosition::Before);
        let after = |base| f.add(Dimension::Row, base, InsertPosition::After);
        assert_eq!(f.apply(&before(5), header), (ChangeType::Resize, "A2:A".into()));
        assert_eq!(f.apply(&before(1), header), (ChangeType::Move, "A3:A".into()));
        assert_eq!(f.apply(&after(1), header), (ChangeType::Resize, "A2:A".into()));
        assert_eq!(f.apply(&after(0), header), (ChangeType::Move, "A3:A".into()));

        assert_eq!(
            f.apply(&f.remove(Dimension::Row, &[4, 5]), header),
            (ChangeType::Resize, "A2:A".into())
        );
        assert_eq!(
            f.apply(&f.remove(Dimension::Row, &[0]), header),
            (ChangeType::Move, "A1:A".into())
        );

        let cols = f.add(Dimension::Col, 3, InsertPosition::Before);
        assert_eq!(f.apply(&cols, "B3:5"), (ChangeType::Resize, "B3:5".into()));
        assert_eq!(
            f.apply(&f.add(Dimension::Col, 1, InsertPosition::Before), "B3:5"),
            (ChangeType::Move, "C3:5".into())
        );
        assert_eq!(
            f.apply(&f.remove(Dimension::Col, &[2]), "B3:5"),
            (ChangeType::Resize, "B3:5".into())
        );
    }

    #[test]
    fn edits_past_the_address_ceiling_remove_the_range() {
        let f = Fixture::new();
        let cols = f.add(Dimension::Col, 0, InsertPosition::Before);
        assert_eq!(f.apply(&cols, "ZZZ1").0, ChangeType::Remove);
        assert_eq!(f.apply(&cols, "ZZX1").0, ChangeType::Move);
        assert_eq!(f.apply(&cols, "A1:ZZZ1").0, ChangeType::Remove);

        let rows = f.add(Dimension::Row, 0, InsertPosition::Before);
        assert_eq!(f.apply(&rows, "B9999999").0, ChangeType::Remove);
        assert_eq!(f.apply(&rows, "B9999998"), (ChangeType::Move, "B9999999".into()));
        assert_eq!(f.apply(&rows, "C:C"), none());
    }

    #[test]
    fn delete_sheet_orphans_ranges() {
        let f = Fixture::new();
        let edit = StructuralEdit::DeleteSheet {
            sheet_id: f.s1,
            sheet_name: "Sheet1".into(),
        };
        let change = get_apply_range_change(&edit).apply(&f.range("B2"));
        let RangeChange::Remove(removed) = change else {
            panic!("expected removal, got {change:?}");
        };
        assert_eq!(removed.invalid_sheet_name(), Some("Sheet1"));

        let elsewhere = Range::from_sheet_xc(f.s2, "B2", &f.sheets);
        assert_eq!(get_apply_range_change(&edit).apply(&elsewhere), RangeChange::None);
    }

    #[test]
    fn delete_sheet_keeps_the_name_an_orphan_waits_for() {
        let f = Fixture::new();
        let orphan = f.range("Gone!C4");
        assert_eq!(orphan.sheet_id(), f.s1);
        let edit = StructuralEdit::DeleteSheet {
            sheet_id: f.s1,
            sheet_name: "Sheet1".into(),
        };
        let change = get_apply_range_change(&edit).apply(&orphan);
        let RangeChange::Remove(removed) = change else {
            panic!("expected removal, got {change:?}");
        };
        assert_eq!(removed.invalid_sheet_name(), Some("Gone"));
    }

    #[test]
    fn rename_repairs_orphaned_ranges() {
        let mut f = Fixture::new();
        let orphan = Range::from_sheet_xc(f.s1, "Budget!C3", &f.sheets);
        assert_eq!(orphan.invalid_sheet_name(), Some("Budget"));

        f.sheets.rename(f.s2, "Budget");
        let edit = StructuralEdit::RenameSheet {
            sheet_id: f.s2,
            old_name: "Sheet2".into(),
            new_name: "Budget".into(),
        };
        let adapter = get_apply_range_change(&edit);
        let RangeChange::Change(fixed) = adapter.apply(&orphan) else {
            panic!("orphan should be repaired");
        };
        assert!(fixed.is_valid());
        assert_eq!(fixed.sheet_id(), f.s2);
        assert_eq!(
            fixed.to_range_string(f.s1, &f.sheets, Default::default()),
            "Budget!C3"
        );

        let on_sheet = Range::from_sheet_xc(f.s2, "A1", &f.sheets);
        assert_eq!(adapter.apply(&on_sheet), RangeChange::Change(on_sheet.clone()));
        assert_eq!(adapter.apply(&f.range("A1")), RangeChange::None);
    }

    #[test]
    fn move_sheet_changes_nothing() {
        let f = Fixture::new();
        let edit = StructuralEdit::MoveSheet {
            sheet_id: f.s1,
            sheet_name: "Sheet1".into(),
            delta: 1,
        };
        assert_eq!(f.apply(&edit, "A1:B2"), none());
    }

    #[test]
    fn move_ranges_translates_contained_ranges() {
        let f = Fixture::new();
        let edit = StructuralEdit::MoveRanges {
            sheet_id: f.s1,
            sheet_name: "Sheet1".into(),
            source: Zone::new(1, 1, 3, 3),
            target_sheet_id: f.s1,
            col: 5,
            row: 0,
        };
        assert_eq!(f.apply(&edit, "C3:D4"), (ChangeType::Move, "G2:H3".into()));
        assert_eq!(f.apply(&edit, "C3:E5"), none());
        assert_eq!(f.apply(&edit, "B:B"), none());

        let cross = StructuralEdit::MoveRanges {
            sheet_id: f.s1,
            sheet_name: "Sheet1".into(),
            source: Zone::new(1, 1, 3, 3),
            target_sheet_id: f.s2,
            col: 5,
            row: 0,
        };
        assert_eq!(f.apply(&cross, "B2"), (ChangeType::Move, "Sheet2!F1".into()));
    }

    #[test]
    fn invalid_text_is_never_touched() {
        let f = Fixture::new();
        let edit = f.add(Dimension::Col, 0, InsertPosition::Before);
        assert_eq!(
            get_apply_range_change(&edit).apply(&f.range("nonsense")),
            RangeChange::None
        );
    }
}
