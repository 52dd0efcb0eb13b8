//! The evaluator.
//!
//! `Interpreter` walks expression trees of a validated [`Program`], pushing a
//! [`CallFrame`] onto its [`CallStack`] for every function call, closure
//! application and inline block. Every invocation returns an [`EvalResult`];
//! the frame boundary logic that decides what happens to a raise lives in
//! `propagate.rs`.

mod builder;
mod propagate;
mod scope_guard;

pub use builder::InterpreterBuilder;
pub use scope_guard::ScopedInterpreter;

use ember_ir::{BodyId, ExprId, ExprKind, Name, Program};
use ember_patterns::{literal_value, Value};
use rustc_hash::FxHashMap;

use crate::diagnostics::EvalCounters;
use crate::errors::{self, RuntimeFault};
use crate::eval_mode::EvalMode;
use crate::frame::CallFrame;
use crate::print_handler::SharedPrintHandler;
use crate::signal::{EvalResult, ExceptionSignal, FatalTermination};
use crate::stack::{ensure_sufficient_stack, CallStack, DepthExceeded};

/// Tree-walking evaluator over one program.
pub struct Interpreter<'p> {
    program: &'p Program,
    pub(crate) stack: CallStack<'p>,
    mode: EvalMode,
    print_handler: SharedPrintHandler,
    /// `Some` when profiling is on.
    counters: Option<EvalCounters>,
    /// Pre-interned `print` for builtin dispatch.
    print_name: Name,
}

impl<'p> Interpreter<'p> {
    /// Create an interpreter with the default `Interpret` configuration.
    pub fn new(program: &'p Program) -> Self {
        InterpreterBuilder::new(program).build()
    }

    #[inline]
    pub fn program(&self) -> &'p Program {
        self.program
    }

    #[inline]
    pub fn mode(&self) -> EvalMode {
        self.mode
    }

    #[inline]
    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    #[inline]
    pub fn counters(&self) -> Option<&EvalCounters> {
        self.counters.as_ref()
    }

    /// Number of live frames. Zero between top-level runs.
    #[inline]
    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    /// Run the program's entry body.
    pub fn run_entry(&mut self) -> Result<Value, FatalTermination> {
        let Some(entry) = self.program.entry() else {
            return Err(FatalTermination::from(ExceptionSignal::new(
                errors::undefined_function("<entry>").into_value(),
                None,
            )));
        };
        self.run_body(entry, Vec::new())
    }

    /// Call a named function from outside any frame.
    pub fn call_function(
        &mut self,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, FatalTermination> {
        let program = self.program;
        let Some(body) = program.interner().get(name).and_then(|func| program.function(func))
        else {
            return Err(FatalTermination::from(
                self.raise_fault(errors::undefined_function(name)),
            ));
        };
        self.run_body(body, args)
    }

    fn run_body(&mut self, body: BodyId, args: Vec<Value>) -> Result<Value, FatalTermination> {
        debug_assert!(self.stack.is_empty(), "top-level run with live frames");
        self.invoke(body, FxHashMap::default(), args).map_err(|signal| {
            tracing::debug!(
                value = %signal.value().inspect(),
                origin = ?signal.origin(),
                last_searched = ?signal.searching(),
                unwound = signal.unwound().len(),
                "unhandled raise"
            );
            FatalTermination::from(signal)
        })
    }

    /// Enter a frame for `body_id`, evaluate its body and settle the outcome.
    ///
    /// Arity and depth faults are raised in the invoking frame; no frame is
    /// pushed for them.
    pub(crate) fn invoke(
        &mut self,
        body_id: BodyId,
        captures: FxHashMap<Name, Value>,
        args: Vec<Value>,
    ) -> EvalResult {
        let program = self.program;
        let body = program.body(body_id);
        let name = program.lookup(body.name);

        if body.params.len() != args.len() {
            return Err(self.raise_fault(errors::arity_mismatch(
                name,
                body.params.len(),
                args.len(),
            )));
        }

        let frame = CallFrame::new(body, captures, body.params.iter().copied().zip(args));
        if let Err(DepthExceeded { limit }) = self.stack.push(frame) {
            return Err(self.raise_fault(errors::stack_overflow(limit)));
        }
        if let Some(counters) = &mut self.counters {
            counters.count_frame();
        }

        let span = tracing::trace_span!(
            "frame",
            name,
            kind = %body.kind,
            depth = self.stack.depth()
        );
        let _enter = span.enter();

        let outcome = self.eval_seq(&body.exprs);
        self.settle(outcome)
    }

    /// Evaluate expressions in order. The value is the last one, `nil` if empty.
    pub(crate) fn eval_seq(&mut self, exprs: &[ExprId]) -> EvalResult {
        let mut last = Value::Nil;
        for &expr in exprs {
            last = self.eval(expr)?;
        }
        Ok(last)
    }

    /// Evaluate one expression in the innermost frame.
    pub fn eval(&mut self, expr_id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(expr_id))
    }

    fn eval_inner(&mut self, expr_id: ExprId) -> EvalResult {
        let program = self.program;
        match program.arena().get(expr_id) {
            ExprKind::Literal(lit) => Ok(literal_value(*lit, program.interner())),

            ExprKind::Ident(name) => match self.lookup(*name) {
                Some(value) => Ok(value),
                None => Err(self.raise_fault(errors::undefined_variable(program.lookup(*name)))),
            },

            ExprKind::Let { name, value } => {
                let value = self.eval(*value)?;
                if let Some(frame) = self.stack.current_mut() {
                    frame.define(*name, value.clone());
                }
                Ok(value)
            }

            ExprKind::Seq(exprs) => self.eval_seq(exprs),

            ExprKind::Raise(operand) => {
                let value = match operand {
                    Some(expr) => self.eval(*expr)?,
                    None => Value::Nil,
                };
                Err(self.raise_value(value))
            }

            ExprKind::Call { func, args } => {
                let args = self.eval_args(args)?;
                if *func == self.print_name {
                    self.print(&args);
                    return Ok(Value::Nil);
                }
                match program.function(*func) {
                    Some(body) => self.invoke(body, FxHashMap::default(), args),
                    None => Err(self.raise_fault(errors::undefined_function(program.lookup(*func)))),
                }
            }

            ExprKind::Lambda(body) => Ok(Value::closure(*body, self.visible_bindings())),

            ExprKind::Apply { callee, args } => {
                let callee = self.eval(*callee)?;
                let args = self.eval_args(args)?;
                match callee.as_closure() {
                    Some(closure) => self.invoke(closure.body, closure.captures.clone(), args),
                    None => Err(self.raise_fault(errors::not_callable(&callee))),
                }
            }

            ExprKind::Begin(body) => {
                let captures = self.visible_bindings();
                self.invoke(*body, captures, Vec::new())
            }

            ExprKind::Record { type_name, fields } => {
                let mut values = Vec::with_capacity(fields.len());
                for (field, expr) in fields {
                    let value = self.eval(*expr)?;
                    values.push((program.lookup(*field).to_string(), value));
                }
                Ok(Value::record(program.lookup(*type_name), values))
            }

            ExprKind::Field { target, field } => {
                let target = self.eval(*target)?;
                let field = program.lookup(*field);
                match target.as_record().and_then(|record| record.get(field)) {
                    Some(value) => Ok(value.clone()),
                    None => Err(self.raise_fault(errors::no_such_field(field, &target))),
                }
            }
        }
    }

    fn eval_args(&mut self, args: &[ExprId]) -> Result<Vec<Value>, ExceptionSignal> {
        let mut values = Vec::with_capacity(args.len());
        for &arg in args {
            values.push(self.eval(arg)?);
        }
        Ok(values)
    }

    fn print(&self, args: &[Value]) {
        let line = args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        self.print_handler.println(&line);
    }

    fn lookup(&self, name: Name) -> Option<Value> {
        self.stack.current().and_then(|frame| frame.lookup(name))
    }

    fn visible_bindings(&self) -> FxHashMap<Name, Value> {
        self.stack
            .current()
            .map(CallFrame::visible_bindings)
            .unwrap_or_default()
    }

    /// Depth index of the innermost frame, `None` outside any frame.
    fn current_depth(&self) -> Option<usize> {
        self.stack.depth().checked_sub(1)
    }

    /// Start a raise of `value` anchored at the innermost frame.
    pub(crate) fn raise_value(&mut self, value: Value) -> ExceptionSignal {
        if let Some(counters) = &mut self.counters {
            counters.count_raise();
        }
        let origin = self.current_depth();
        tracing::debug!(
            value = %value.inspect(),
            frame = self
                .stack
                .current()
                .map_or("<top>", |frame| self.program.lookup(frame.name())),
            "raise"
        );
        ExceptionSignal::new(value, origin)
    }

    pub(crate) fn raise_fault(&mut self, fault: RuntimeFault) -> ExceptionSignal {
        self.raise_value(fault.into_value())
    }
}

#[cfg(test)]
mod tests;
