use proptest::prelude::*;
use rangewise_common::{
    MAX_COL, MAX_ROW, Range, RangePart, SheetDimensions, SheetRegistry, Zone, letters_to_number,
    number_to_letters, to_cartesian_with_part, to_xc,
};

fn arb_part() -> impl Strategy<Value = RangePart> {
    (any::<bool>(), any::<bool>()).prop_map(|(c, r)| RangePart::new(c, r))
}

fn arb_zone() -> impl Strategy<Value = Zone> {
    (0u32..200, 0u32..500, 0u32..200, 0u32..500).prop_map(|(l, t, r, b)| Zone::new(l, t, r, b))
}

proptest! {
    #[test]
    fn column_letters_are_bijective(col in 0u32..=MAX_COL) {
        let letters = number_to_letters(col);
        prop_assert!(letters.len() <= 3);
        prop_assert_eq!(letters_to_number(&letters), Some(col));
        prop_assert_eq!(letters_to_number(&letters.to_lowercase()), Some(col));
    }

    #[test]
    fn cell_text_round_trips(col in 0u32..=MAX_COL, row in 0u32..=MAX_ROW, part in arb_part()) {
        let xc = to_xc(col, row, part);
        let (pos, parsed) = to_cartesian_with_part(&xc).unwrap();
        prop_assert_eq!((pos.col, pos.row), (col, row));
        prop_assert_eq!(parsed, part);
    }

    #[test]
    fn bounded_range_text_is_stable(zone in arb_zone(), a in arb_part(), b in arb_part()) {
        let mut sheets = SheetRegistry::new();
        let sheet = sheets.add_sheet("Sheet1", SheetDimensions::new(200, 500)).unwrap();
        let text = if zone.is_single_cell() {
            to_xc(zone.left, zone.top, a)
        } else {
            format!("{}:{}", to_xc(zone.left, zone.top, a), to_xc(zone.right, zone.bottom, b))
        };
        let range = Range::from_sheet_xc(sheet, &text, &sheets);
        prop_assert!(range.is_valid());
        prop_assert_eq!(range.unbounded_zone().as_zone(), Some(zone));
        prop_assert_eq!(range.to_range_string(sheet, &sheets, Default::default()), text);
    }
}

#[test]
fn cross_sheet_reference_survives_rename_of_the_other_sheet() {
    let mut sheets = SheetRegistry::new();
    let main = sheets.id_for("Main").unwrap();
    let data = sheets.id_for("Data").unwrap();
    let range = Range::from_sheet_xc(main, "Data!B2:C3", &sheets);
    assert_eq!(range.sheet_id(), data);

    sheets.rename(data, "Raw data");
    assert_eq!(
        range.to_range_string(main, &sheets, Default::default()),
        "'Raw data'!B2:C3"
    );
}
