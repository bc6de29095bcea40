use proptest::prelude::*;
use rangewise_adapt::{
    ChangeType, Dimension, InsertPosition, RangeChange, StructuralEdit, get_apply_range_change,
};
use rangewise_common::{Range, SheetDimensions, SheetId, SheetRegistry, UnboundedZone, Zone};

fn sheet() -> (SheetRegistry, SheetId) {
    let mut sheets = SheetRegistry::new();
    let id = sheets.add_sheet("Sheet1", SheetDimensions::new(200, 200)).unwrap();
    (sheets, id)
}

fn insert(sheet_id: SheetId, dimension: Dimension, base: u32, quantity: u32) -> StructuralEdit {
    insert_at(sheet_id, dimension, base, quantity, InsertPosition::Before)
}

fn insert_at(
    sheet_id: SheetId,
    dimension: Dimension,
    base: u32,
    quantity: u32,
    position: InsertPosition,
) -> StructuralEdit {
    StructuralEdit::AddColumnsRows {
        sheet_id,
        sheet_name: "Sheet1".into(),
        dimension,
        base,
        quantity,
        position,
    }
}

fn remove(sheet_id: SheetId, dimension: Dimension, from: u32, count: u32) -> StructuralEdit {
    StructuralEdit::RemoveColumnsRows {
        sheet_id,
        sheet_name: "Sheet1".into(),
        dimension,
        elements: (from..from + count).collect(),
    }
}

fn arb_dimension() -> impl Strategy<Value = Dimension> {
    prop_oneof![Just(Dimension::Col), Just(Dimension::Row)]
}

fn arb_zone() -> impl Strategy<Value = Zone> {
    (0u32..40, 0u32..40, 0u32..40, 0u32..40).prop_map(|(l, t, r, b)| Zone::new(l, t, r, b))
}

fn resolve(change: RangeChange, original: &Range) -> Option<UnboundedZone> {
    change.survivor(original).map(|r| *r.unbounded_zone())
}

proptest! {
    #[test]
    fn insert_then_remove_restores_zone(
        zone in arb_zone(),
        dimension in arb_dimension(),
        base in 0u32..45,
        quantity in 1u32..6,
    ) {
        let (_sheets, id) = sheet();
        let original = Range::from_zone(id, zone);

        let inserted = get_apply_range_change(&insert(id, dimension, base, quantity)).apply(&original);
        prop_assert_ne!(inserted.change_type(), ChangeType::Remove);
        let grown = inserted.survivor(&original).unwrap();

        let removed = get_apply_range_change(&remove(id, dimension, base, quantity)).apply(&grown);
        prop_assert_eq!(resolve(removed, &grown), Some(*original.unbounded_zone()));
    }

    #[test]
    fn insert_after_then_remove_restores_zone(
        zone in arb_zone(),
        dimension in arb_dimension(),
        base in 0u32..45,
        quantity in 1u32..6,
    ) {
        let (_sheets, id) = sheet();
        let original = Range::from_zone(id, zone);
        let edit = insert_at(id, dimension, base, quantity, InsertPosition::After);

        let inserted = get_apply_range_change(&edit).apply(&original);
        prop_assert_ne!(inserted.change_type(), ChangeType::Remove);
        let grown = inserted.survivor(&original).unwrap();

        // The new elements sit right after `base`.
        let removed = get_apply_range_change(&remove(id, dimension, base + 1, quantity)).apply(&grown);
        prop_assert_eq!(resolve(removed, &grown), Some(*original.unbounded_zone()));
    }

    #[test]
    fn removal_never_resizes_disjoint_ranges(
        zone in arb_zone(),
        dimension in arb_dimension(),
        from in 0u32..45,
        count in 1u32..6,
    ) {
        let (_sheets, id) = sheet();
        let range = Range::from_zone(id, zone);
        let change = get_apply_range_change(&remove(id, dimension, from, count)).apply(&range);
        let (start, end) = match dimension {
            Dimension::Col => (zone.left, zone.right),
            Dimension::Row => (zone.top, zone.bottom),
        };
        let last = from + count - 1;
        if end < from || last < start {
            prop_assert!(matches!(change.change_type(), ChangeType::None | ChangeType::Move));
        }
        if from <= start && end <= last {
            prop_assert_eq!(change.change_type(), ChangeType::Remove);
        }
    }

    #[test]
    fn edits_elsewhere_leave_ranges_alone(zone in arb_zone(), base in 0u32..45) {
        let (mut sheets, id) = sheet();
        let other = sheets.id_for("Other").unwrap();
        let range = Range::from_zone(id, zone);
        let change = get_apply_range_change(&insert(other, Dimension::Col, base, 3)).apply(&range);
        prop_assert_eq!(change, RangeChange::None);
    }
}

#[test]
fn adapted_ranges_are_always_well_formed() {
    let (sheets, id) = sheet();
    let edits = [
        remove(id, Dimension::Col, 0, 10),
        remove(id, Dimension::Row, 3, 2),
        insert(id, Dimension::Col, 5, 4),
    ];
    for text in ["A1:J1", "C3:E9", "$B$2", "A:C", "2:7", "D4:D"] {
        let range = Range::from_sheet_xc(id, text, &sheets);
        for edit in &edits {
            let change = get_apply_range_change(edit).apply(&range);
            if let Some(adapted) = change.range() {
                assert!(adapted.unbounded_zone().is_ordered(), "{text} after {edit:?}");
            }
        }
    }
}
