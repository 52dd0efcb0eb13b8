//! Call frames.
//!
//! One frame per active function, block or closure invocation. A frame owns
//! its bindings and borrows its clause declarations from the program body.
//!
//! # Lifecycle
//!
//! ```text
//! ACTIVE ──┬── body returned ──────────── Exiting(Normal)  ──┐
//!          ├── own clause matched ─────── Exiting(Handled) ──┼── cleanup ── CONCLUDED
//!          └── signal passing through ─── Exiting(Unwound) ──┘
//! ```
//!
//! `begin_exit` only succeeds from `Active`, which is what makes the
//! cleanup clause run at most once per activation.

use ember_ir::{Body, BodyKind, CleanupClause, HandlerClause, Name, StringInterner};
use ember_patterns::{BindingLookup, Value};
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

use crate::signal::TraceFrame;

/// How a frame is leaving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameExit {
    /// The body evaluated to a value.
    Normal,
    /// One of the frame's own handler clauses consumed a signal.
    Handled,
    /// A signal is passing through this frame.
    Unwound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    Active,
    Exiting(FrameExit),
    Concluded,
}

/// Activation record of one body invocation.
#[derive(Debug)]
pub struct CallFrame<'p> {
    body: &'p Body,
    /// Scope stack; index 0 holds captures and parameters, later entries are
    /// handler-body and cleanup scopes.
    scopes: SmallVec<[FxHashMap<Name, Value>; 2]>,
    result: Option<Value>,
    state: FrameState,
}

impl<'p> CallFrame<'p> {
    /// Create an active frame. Parameters shadow captures of the same name.
    pub fn new(
        body: &'p Body,
        captures: FxHashMap<Name, Value>,
        params: impl IntoIterator<Item = (Name, Value)>,
    ) -> Self {
        let mut locals = captures;
        locals.extend(params);
        Self {
            body,
            scopes: smallvec![locals],
            result: None,
            state: FrameState::Active,
        }
    }

    /// The declaration this frame was entered from.
    #[inline]
    pub fn body(&self) -> &'p Body {
        self.body
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.body.name
    }

    #[inline]
    pub fn kind(&self) -> BodyKind {
        self.body.kind
    }

    /// Handler clauses in declaration order.
    #[inline]
    pub fn handlers(&self) -> &'p [HandlerClause] {
        &self.body.handlers
    }

    #[inline]
    pub fn cleanup(&self) -> Option<&'p CleanupClause> {
        self.body.cleanup.as_ref()
    }

    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    #[inline]
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Bind in the innermost scope.
    pub fn define(&mut self, name: Name, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    /// Resolve innermost scope outward.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).cloned())
    }

    /// Open a nested scope (handler body or cleanup body).
    pub fn push_scope(&mut self, bindings: impl IntoIterator<Item = (Name, Value)>) {
        self.scopes.push(bindings.into_iter().collect());
    }

    /// Close the innermost nested scope. The frame's own locals are never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    #[inline]
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Snapshot of every visible binding, inner scopes winning.
    pub fn visible_bindings(&self) -> FxHashMap<Name, Value> {
        let mut out = FxHashMap::default();
        for scope in self.scopes.iter().rev() {
            for (name, value) in scope {
                out.entry(*name).or_insert_with(|| value.clone());
            }
        }
        out
    }

    /// Move from `Active` to `Exiting(exit)`.
    ///
    /// Returns `false`, changing nothing, if the frame already started exiting.
    pub fn begin_exit(&mut self, exit: FrameExit) -> bool {
        if self.state == FrameState::Active {
            self.state = FrameState::Exiting(exit);
            true
        } else {
            false
        }
    }

    /// Set the result slot. Only the first write sticks.
    pub fn set_result(&mut self, value: Value) {
        debug_assert!(self.result.is_none(), "frame result set twice");
        if self.result.is_none() {
            self.result = Some(value);
        }
    }

    /// Mark the frame concluded and hand back its result.
    pub fn finish(mut self) -> Option<Value> {
        self.state = FrameState::Concluded;
        self.result.take()
    }

    /// Trace entry for this frame.
    pub fn trace_entry(&self, interner: &StringInterner) -> TraceFrame {
        TraceFrame {
            name: interner.lookup(self.body.name).to_string(),
            kind: self.body.kind,
        }
    }
}

impl BindingLookup for CallFrame<'_> {
    fn lookup_binding(&self, name: Name) -> Option<Value> {
        self.lookup(name)
    }
}
