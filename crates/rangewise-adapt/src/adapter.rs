//! Fan-out of structural edits to every subsystem that stores ranges.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rangewise_common::{Range, SheetId, SheetResolver};
use thiserror::Error;

use crate::change::RangeChange;
use crate::command::StructuralEdit;
use crate::string_ranges::{adapt_formula_string_ranges, adapt_string_range};
use crate::tokens::FormulaCompiler;
use crate::transform::{RangeAdapterFunctions, get_apply_range_change};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// A structural edit was dispatched by a provider while ranges were being adapted.
    #[error("cannot dispatch '{command}' while ranges are being adapted")]
    DispatchDuringAdaptation { command: &'static str },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdapterPhase {
    #[default]
    Idle,
    Adapting,
}

/// Shared view of the adapter's phase.
///
/// Command entry points hold a clone and call [`CommandGate::check_dispatch`]
/// before accepting a structural edit, so a provider that tries to start a new
/// edit from inside an adaptation pass gets an error instead of observing a
/// half-adapted workbook.
#[derive(Debug, Clone, Default)]
pub struct CommandGate {
    phase: Rc<Cell<AdapterPhase>>,
}

impl CommandGate {
    #[inline]
    pub fn phase(&self) -> AdapterPhase {
        self.phase.get()
    }

    pub fn check_dispatch(&self, command: &'static str) -> Result<(), AdapterError> {
        match self.phase.get() {
            AdapterPhase::Idle => Ok(()),
            AdapterPhase::Adapting => Err(AdapterError::DispatchDuringAdaptation { command }),
        }
    }

    fn enter(&self, command: &'static str) -> Result<PhaseGuard, AdapterError> {
        self.check_dispatch(command)?;
        self.phase.set(AdapterPhase::Adapting);
        Ok(PhaseGuard {
            phase: Rc::clone(&self.phase),
        })
    }
}

/// Puts the gate back to idle, even if a provider panics.
struct PhaseGuard {
    phase: Rc<Cell<AdapterPhase>>,
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        self.phase.set(AdapterPhase::Idle);
    }
}

/// Everything a provider receives for one adaptation pass.
pub struct AdaptContext<'a> {
    pub edit: &'a StructuralEdit,
    pub functions: &'a RangeAdapterFunctions,
    /// Workbook state after the edit.
    pub sheets: &'a dyn SheetResolver,
    gate: &'a CommandGate,
}

impl AdaptContext<'_> {
    #[inline]
    pub fn apply(&self, range: &Range) -> RangeChange {
        self.functions.apply(range)
    }

    pub fn adapt_string_range(&self, default_sheet: SheetId, sheet_xc: &str) -> String {
        adapt_string_range(default_sheet, sheet_xc, self.functions, self.sheets)
    }

    pub fn adapt_formula(
        &self,
        default_sheet: SheetId,
        formula: &str,
        compiler: &dyn FormulaCompiler,
    ) -> String {
        adapt_formula_string_ranges(default_sheet, formula, self.functions, compiler, self.sheets)
    }

    pub fn gate(&self) -> &CommandGate {
        self.gate
    }
}

/// A subsystem that owns ranges and keeps them in step with structural edits.
pub trait RangeProvider {
    fn adapt_ranges(&mut self, ctx: &AdaptContext<'_>);
}

impl<P: RangeProvider + ?Sized> RangeProvider for Rc<RefCell<P>> {
    fn adapt_ranges(&mut self, ctx: &AdaptContext<'_>) {
        self.borrow_mut().adapt_ranges(ctx);
    }
}

impl<P: RangeProvider + ?Sized> RangeProvider for Box<P> {
    fn adapt_ranges(&mut self, ctx: &AdaptContext<'_>) {
        (**self).adapt_ranges(ctx);
    }
}

/// Owns the registered providers and drives one pass per structural edit.
#[derive(Default)]
pub struct RangeAdapter {
    providers: Vec<Box<dyn RangeProvider>>,
    gate: CommandGate,
}

impl RangeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Providers are called in registration order.
    pub fn register(&mut self, provider: impl RangeProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub fn gate(&self) -> CommandGate {
        self.gate.clone()
    }

    pub fn phase(&self) -> AdapterPhase {
        self.gate.phase()
    }

    /// Adapt every provider's ranges to `edit`.
    ///
    /// `sheets` must already reflect the edit (renamed or deleted sheets, new
    /// dimensions).
    pub fn dispatch(
        &mut self,
        edit: &StructuralEdit,
        sheets: &dyn SheetResolver,
    ) -> Result<(), AdapterError> {
        let _guard = self.gate.enter(edit.kind())?;
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "adapt_ranges",
            command = edit.kind(),
            providers = self.providers.len()
        )
        .entered();

        let functions = get_apply_range_change(edit);
        let ctx = AdaptContext {
            edit,
            functions: &functions,
            sheets,
            gate: &self.gate,
        };
        for provider in &mut self.providers {
            provider.adapt_ranges(&ctx);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RangeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeAdapter")
            .field("providers", &self.providers.len())
            .field("phase", &self.gate.phase())
            .finish()
    }
}
