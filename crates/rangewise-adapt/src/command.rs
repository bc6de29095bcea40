//! Structural edits that force stored ranges to be adapted.

use rangewise_common::{SheetId, Zone};

/// Axis affected by an insertion or deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Col,
    Row,
}

/// Side of `base` on which new columns/rows are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertPosition {
    Before,
    After,
}

/// The minimal set of workbook edits the range engine reacts to.
///
/// Sheet names are carried alongside ids because formula text refers to
/// sheets by name: adapting text after a rename or a delete needs the name
/// as it was before the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralEdit {
    AddColumnsRows {
        sheet_id: SheetId,
        sheet_name: String,
        dimension: Dimension,
        base: u32,
        quantity: u32,
        position: InsertPosition,
    },
    /// `elements` are the zero-based indexes to delete, in any order.
    RemoveColumnsRows {
        sheet_id: SheetId,
        sheet_name: String,
        dimension: Dimension,
        elements: Vec<u32>,
    },
    RenameSheet {
        sheet_id: SheetId,
        old_name: String,
        new_name: String,
    },
    MoveSheet {
        sheet_id: SheetId,
        sheet_name: String,
        delta: i32,
    },
    DeleteSheet {
        sheet_id: SheetId,
        sheet_name: String,
    },
    /// Cut `source` on `sheet_id` and paste it with its top-left corner at
    /// (`col`, `row`) on `target_sheet_id`.
    MoveRanges {
        sheet_id: SheetId,
        sheet_name: String,
        source: Zone,
        target_sheet_id: SheetId,
        col: u32,
        row: u32,
    },
}

impl StructuralEdit {
    /// Sheet the edit is anchored to.
    pub fn sheet_id(&self) -> SheetId {
        match self {
            StructuralEdit::AddColumnsRows { sheet_id, .. }
            | StructuralEdit::RemoveColumnsRows { sheet_id, .. }
            | StructuralEdit::RenameSheet { sheet_id, .. }
            | StructuralEdit::MoveSheet { sheet_id, .. }
            | StructuralEdit::DeleteSheet { sheet_id, .. }
            | StructuralEdit::MoveRanges { sheet_id, .. } => *sheet_id,
        }
    }

    /// Name of that sheet before the edit was applied.
    pub fn sheet_name(&self) -> &str {
        match self {
            StructuralEdit::RenameSheet { old_name, .. } => old_name,
            StructuralEdit::AddColumnsRows { sheet_name, .. }
            | StructuralEdit::RemoveColumnsRows { sheet_name, .. }
            | StructuralEdit::MoveSheet { sheet_name, .. }
            | StructuralEdit::DeleteSheet { sheet_name, .. }
            | StructuralEdit::MoveRanges { sheet_name, .. } => sheet_name,
        }
    }

    /// Name of that sheet once the edit is applied.
    pub fn current_sheet_name(&self) -> &str {
        match self {
            StructuralEdit::RenameSheet { new_name, .. } => new_name,
            _ => self.sheet_name(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StructuralEdit::AddColumnsRows { .. } => "add_columns_rows",
            StructuralEdit::RemoveColumnsRows { .. } => "remove_columns_rows",
            StructuralEdit::RenameSheet { .. } => "rename_sheet",
            StructuralEdit::MoveSheet { .. } => "move_sheet",
            StructuralEdit::DeleteSheet { .. } => "delete_sheet",
            StructuralEdit::MoveRanges { .. } => "move_ranges",
        }
    }
}
