//! Ember Eval - Frame model, raise propagation and handler dispatch.
//!
//! # Architecture
//!
//! - `CallStack` / `CallFrame`: explicit stack of activations, one per
//!   function call, closure application or inline block
//! - `EvalResult = Result<Value, ExceptionSignal>`: a raise is the `Err` arm,
//!   returned through every invocation step
//! - `Interpreter::settle`: the frame boundary. Searches the frame's
//!   `rescue` clauses in order, runs the first match, and guarantees the
//!   `ensure` clause runs exactly once on every exit path
//! - `FatalTermination`: a raise that left the outermost frame
//!
//! # Re-exports
//!
//! Value types come from `ember_patterns`: `Value`, `RecordValue`, `ClosureValue`.

mod diagnostics;
pub mod errors;
mod eval_mode;
mod frame;
pub mod interpreter;
mod print_handler;
mod signal;
mod stack;

pub use ember_patterns::{ClosureValue, RecordValue, Value};

pub use errors::RuntimeFault;

pub use diagnostics::EvalCounters;
pub use eval_mode::EvalMode;
pub use frame::{CallFrame, FrameExit, FrameState};
pub use interpreter::{Interpreter, InterpreterBuilder, ScopedInterpreter};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use signal::{EvalResult, ExceptionSignal, FatalTermination, TraceFrame};
pub use stack::{ensure_sufficient_stack, CallStack, DepthExceeded};
