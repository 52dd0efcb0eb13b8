//! Frame boundary: handler search, handler dispatch and the cleanup guarantee.
//!
//! Every invocation ends in [`Interpreter::settle`] with the innermost frame
//! still on the stack. From there exactly one of three exits is taken:
//!
//! ```text
//! Ok(value)                        -> conclude(Normal, value)
//! Err(signal), clause i matches    -> run clause i -> Ok  -> conclude(Handled, v)
//!                                                  -> Err -> unwind(new signal)
//! Err(signal), nothing matches     -> unwind(signal)
//! ```
//!
//! `conclude` and `unwind` both run the cleanup clause once and pop the
//! frame. An `Err` leaving `unwind` is settled again by the invoker's frame,
//! which is how the search moves outward one frame at a time.

use ember_ir::HandlerClause;
use ember_patterns::{match_pattern, Bindings, Value};

use super::Interpreter;
use crate::frame::{CallFrame, FrameExit};
use crate::signal::{EvalResult, ExceptionSignal};

impl<'p> Interpreter<'p> {
    /// Decide the fate of the innermost frame once its body has finished.
    pub(super) fn settle(&mut self, outcome: EvalResult) -> EvalResult {
        match outcome {
            Ok(value) => self.conclude(FrameExit::Normal, value),
            Err(signal) => self.intercept(signal),
        }
    }

    /// Search the innermost frame's handler clauses for `signal`.
    fn intercept(&mut self, mut signal: ExceptionSignal) -> EvalResult {
        let Some(depth) = self.current_depth() else {
            return Err(signal);
        };
        signal.mark_searching(depth);

        let Some((clause, bindings)) = self.find_handler(signal.value()) else {
            return self.unwind(signal);
        };

        if let Some(counters) = &mut self.counters {
            counters.count_handler_match();
        }
        tracing::debug!(
            value = %signal.value().inspect(),
            frame = self.frame_name(),
            depth,
            "handler matched"
        );
        // The signal ends here. Anything raised by the clause body is a new search.
        let _handled: Value = signal.consume();

        match self.run_handler(clause, bindings) {
            Ok(value) => self.conclude(FrameExit::Handled, value),
            Err(raised) => self.unwind(raised),
        }
    }

    /// First clause of the innermost frame, in declaration order, whose
    /// pattern matches `value`.
    fn find_handler(&self, value: &Value) -> Option<(&'p HandlerClause, Bindings)> {
        let frame = self.stack.current()?;
        let interner = self.program.interner();
        frame.handlers().iter().find_map(|clause| {
            match_pattern(&clause.effective_pattern(), value, frame, interner)
                .into_bindings()
                .map(|bindings| (clause, bindings))
        })
    }

    /// Evaluate a matched clause body in a fresh scope holding its bindings.
    fn run_handler(&mut self, clause: &'p HandlerClause, bindings: Bindings) -> EvalResult {
        let mut scoped = self.scoped_frame(bindings);
        let outcome = scoped.eval_seq(&clause.body);
        drop(scoped);
        outcome
    }

    /// Set the innermost frame's result, run its cleanup clause and pop it.
    ///
    /// A raise from the cleanup clause replaces the result; the frame is
    /// then popped as unwound.
    fn conclude(&mut self, exit: FrameExit, value: Value) -> EvalResult {
        let Some(frame) = self.stack.current_mut() else {
            return Ok(value);
        };
        let began = frame.begin_exit(exit);
        debug_assert!(began, "frame exited twice");
        frame.set_result(value);

        match self.run_cleanup() {
            Ok(()) => Ok(self
                .stack
                .pop()
                .and_then(CallFrame::finish)
                .unwrap_or(Value::Nil)),
            Err(raised) => Err(self.pop_unwound(raised)),
        }
    }

    /// Run the innermost frame's cleanup clause, if any, while `signal`
    /// passes through it, then pop the frame.
    fn unwind(&mut self, signal: ExceptionSignal) -> EvalResult {
        let Some(frame) = self.stack.current_mut() else {
            return Err(signal);
        };
        let began = frame.begin_exit(FrameExit::Unwound);
        debug_assert!(began, "frame exited twice");

        let signal = match self.run_cleanup() {
            Ok(()) => signal,
            Err(superseding) => {
                tracing::debug!(
                    dropped = %signal.value().inspect(),
                    raised = %superseding.value().inspect(),
                    frame = self.frame_name(),
                    "cleanup raise supersedes in-flight signal"
                );
                superseding
            }
        };
        Err(self.pop_unwound(signal))
    }

    /// Evaluate the cleanup clause of the innermost frame. Its value is dropped.
    fn run_cleanup(&mut self) -> Result<(), ExceptionSignal> {
        let Some(cleanup) = self.stack.current().and_then(CallFrame::cleanup) else {
            return Ok(());
        };
        if let Some(counters) = &mut self.counters {
            counters.count_cleanup();
        }
        tracing::trace!(frame = self.frame_name(), "running cleanup clause");

        let mut scoped = self.scoped_frame(Bindings::new());
        let outcome = scoped.eval_seq(&cleanup.body);
        outcome.map(|_discarded| ())
    }

    /// Pop the innermost frame and add it to the signal's trace.
    fn pop_unwound(&mut self, mut signal: ExceptionSignal) -> ExceptionSignal {
        if let Some(frame) = self.stack.pop() {
            if let Some(counters) = &mut self.counters {
                counters.count_unwound();
            }
            let entry = frame.trace_entry(self.program.interner());
            tracing::debug!(frame = %entry, "frame unwound");
            signal.record_unwound(entry);
        }
        signal
    }

    fn frame_name(&self) -> &'static str {
        self.stack
            .current()
            .map_or("<top>", |frame| self.program.lookup(frame.name()))
    }
}
