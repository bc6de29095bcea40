//! Keeping stored ranges correct across structural edits.
//!
//! A [`StructuralEdit`] (insert/remove rows or columns, rename/move/delete a
//! sheet, move a block of cells) is turned into a transformation by
//! [`get_apply_range_change`]. The [`RangeAdapter`] hands that transformation
//! to every registered [`RangeProvider`]; text references go through
//! [`adapt_string_range`] and [`adapt_formula_string_ranges`].

pub mod adapter;
pub mod change;
pub mod command;
pub mod string_ranges;
pub mod tokens;
pub mod transform;

pub use adapter::{AdaptContext, AdapterError, AdapterPhase, CommandGate, RangeAdapter, RangeProvider};
pub use change::{ChangeType, RangeChange};
pub use command::{Dimension, InsertPosition, StructuralEdit};
pub use string_ranges::{adapt_formula_string_ranges, adapt_string_range};
pub use tokens::{CompiledFormula, FormulaCompiler, ReferenceTokenizer, Token, TokenSubType, TokenType};
pub use transform::{
    ApplyRangeChange, RangeAdapterFunctions, SheetNames, get_apply_range_change, group_consecutive,
};
