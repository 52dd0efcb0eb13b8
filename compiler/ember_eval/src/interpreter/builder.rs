//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use ember_ir::Program;

use super::Interpreter;
use crate::diagnostics::EvalCounters;
use crate::eval_mode::EvalMode;
use crate::print_handler::{buffer_handler, stdout_handler, SharedPrintHandler};
use crate::stack::CallStack;

/// Builder for creating Interpreter instances.
///
/// The mode decides the defaults:
/// - `EvalMode::Interpret` for `ember run`: stdout, depth 10,000 on native
/// - `EvalMode::TestRun` for tests: captured output, depth 500
pub struct InterpreterBuilder<'p> {
    program: &'p Program,
    mode: EvalMode,
    print_handler: Option<SharedPrintHandler>,
    max_depth: Option<usize>,
    profile: bool,
}

impl<'p> InterpreterBuilder<'p> {
    /// Create a new builder with default `Interpret` mode.
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            mode: EvalMode::default(),
            print_handler: None,
            max_depth: None,
            profile: false,
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: EvalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the print handler. Overrides the mode-based default.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Limit the frame depth. Overrides the mode-based default.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Collect [`EvalCounters`] during evaluation.
    #[must_use]
    pub fn profile(mut self, enabled: bool) -> Self {
        self.profile = enabled;
        self
    }

    pub fn build(self) -> Interpreter<'p> {
        let print_handler = self.print_handler.unwrap_or_else(|| {
            if self.mode.allows_io() {
                stdout_handler()
            } else {
                buffer_handler()
            }
        });
        let max_depth = self.max_depth.or(self.mode.max_recursion_depth());

        Interpreter {
            program: self.program,
            stack: CallStack::new(max_depth),
            mode: self.mode,
            print_handler,
            counters: self.profile.then(EvalCounters::default),
            print_name: self.program.interner().intern("print"),
        }
    }
}
