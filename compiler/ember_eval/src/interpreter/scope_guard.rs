//! RAII scope guard over the innermost frame.
//!
//! Handler bodies and cleanup clauses run in a scope nested inside their
//! frame. [`ScopedInterpreter`] pushes that scope and pops it when dropped,
//! so a raise leaving the clause body (an early `?` return) cannot leak the
//! clause's bindings into the frame.
//!
//! ```text
//! {
//!     let mut scoped = interpreter.scoped_frame(bindings);
//!     scoped.eval_seq(&clause.body)?;
//! } // scope popped here
//! ```

use std::ops::{Deref, DerefMut};

use ember_ir::Name;
use ember_patterns::Value;

use super::Interpreter;

/// Guard giving access to the interpreter while a nested frame scope is open.
pub struct ScopedInterpreter<'guard, 'p> {
    interpreter: &'guard mut Interpreter<'p>,
}

impl Drop for ScopedInterpreter<'_, '_> {
    fn drop(&mut self) {
        if let Some(frame) = self.interpreter.stack.current_mut() {
            frame.pop_scope();
        }
    }
}

impl<'p> Deref for ScopedInterpreter<'_, 'p> {
    type Target = Interpreter<'p>;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl<'p> Interpreter<'p> {
    /// Open a scope on the innermost frame holding `bindings`.
    pub fn scoped_frame(
        &mut self,
        bindings: impl IntoIterator<Item = (Name, Value)>,
    ) -> ScopedInterpreter<'_, 'p> {
        if let Some(frame) = self.stack.current_mut() {
            frame.push_scope(bindings);
        }
        ScopedInterpreter { interpreter: self }
    }
}
