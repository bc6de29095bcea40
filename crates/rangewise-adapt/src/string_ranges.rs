//! Adapting references that are stored as text rather than as [`Range`] values.

use rangewise_common::{INVALID_REFERENCE, Range, SheetId, SheetResolver, split_reference};

use crate::change::RangeChange;
use crate::tokens::FormulaCompiler;
use crate::transform::{RangeAdapterFunctions, SheetNames};

fn names_sheet(name: &str, names: &SheetNames) -> bool {
    let name = name.to_lowercase();
    name == names.old.to_lowercase() || name == names.current.to_lowercase()
}

/// Adapt a single reference such as `"B2:C4"` or `"Data!A:A"`.
///
/// `default_sheet` is the sheet the text is relative to when it carries no
/// prefix. References the edit cannot concern, unaffected references, and
/// text that does not parse come back unchanged; removed references become
/// `#REF`. `sheets` must reflect the workbook after the edit.
pub fn adapt_string_range(
    default_sheet: SheetId,
    sheet_xc: &str,
    functions: &RangeAdapterFunctions,
    sheets: &(impl SheetResolver + ?Sized),
) -> String {
    let (sheet_name, _) = split_reference(sheet_xc);
    let concerned = match &sheet_name {
        Some(name) => names_sheet(name, &functions.sheet_name),
        None => default_sheet == functions.sheet_id,
    };
    if !concerned {
        return sheet_xc.to_string();
    }
    let range = Range::from_sheet_xc(default_sheet, sheet_xc, sheets);
    if range.invalid_xc().is_some() {
        return sheet_xc.to_string();
    }
    match functions.apply(&range) {
        RangeChange::None => sheet_xc.to_string(),
        RangeChange::Remove(_) => INVALID_REFERENCE.to_string(),
        RangeChange::Move(adapted) | RangeChange::Resize(adapted) | RangeChange::Change(adapted) => {
            adapted.to_range_string(default_sheet, sheets, Default::default())
        }
    }
}

/// Adapt every reference inside formula text.
///
/// Text that is not a formula (no leading `=`) is returned as is. The
/// compiler is skipped entirely when the formula lives on another sheet and
/// never mentions the edited sheet by name.
pub fn adapt_formula_string_ranges(
    default_sheet: SheetId,
    formula: &str,
    functions: &RangeAdapterFunctions,
    compiler: &(impl FormulaCompiler + ?Sized),
    sheets: &(impl SheetResolver + ?Sized),
) -> String {
    if !formula.starts_with('=') {
        return formula.to_string();
    }
    if default_sheet != functions.sheet_id {
        let lowered = formula.to_lowercase();
        let names = &functions.sheet_name;
        if !lowered.contains(&names.old.to_lowercase())
            && !lowered.contains(&names.current.to_lowercase())
        {
            return formula.to_string();
        }
    }
    compiler
        .compile(formula)
        .render(|reference| adapt_string_range(default_sheet, reference, functions, sheets))
}
