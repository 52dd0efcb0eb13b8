//! The call stack, and host stack safety for deep recursion.
//!
//! `CallStack` is the explicit, owned stack of live frames. The evaluator
//! pushes a frame per invocation and pops it when the frame concludes, so
//! unwinding order and cleanup execution can be inspected directly.
//!
//! Evaluation of a frame's body still recurses on the host stack; that
//! recursion goes through [`ensure_sufficient_stack`].

use crate::frame::CallFrame;

/// Push refused because the depth limit is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthExceeded {
    pub limit: usize,
}

/// Live call frames, outermost at the bottom.
///
/// ```text
/// let mut stack = CallStack::new(Some(500));
/// stack.push(frame)?;
/// // ... evaluate body ...
/// let frame = stack.pop();
/// ```
#[derive(Debug)]
pub struct CallStack<'p> {
    frames: Vec<CallFrame<'p>>,
    max_depth: Option<usize>,
}

impl<'p> CallStack<'p> {
    /// Create an empty stack. `max_depth` of `None` means unlimited.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame, checking the depth limit. The frame is NOT pushed on overflow.
    pub fn push(&mut self, frame: CallFrame<'p>) -> Result<(), DepthExceeded> {
        if let Some(limit) = self.max_depth {
            if self.frames.len() >= limit {
                return Err(DepthExceeded { limit });
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Pop the innermost frame.
    pub fn pop(&mut self) -> Option<CallFrame<'p>> {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop()
    }

    #[inline]
    pub fn current(&self) -> Option<&CallFrame<'p>> {
        self.frames.last()
    }

    #[inline]
    pub fn current_mut(&mut self) -> Option<&mut CallFrame<'p>> {
        self.frames.last_mut()
    }

    /// Current depth; the innermost frame sits at `depth() - 1`.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }
}

impl Default for CallStack<'_> {
    /// Creates an unlimited call stack.
    fn default() -> Self {
        Self::new(None)
    }
}

/// Ensure sufficient host stack space is available before executing `f`.
///
/// On native targets, uses `stacker` to grow the stack if needed.
/// On WASM targets, just calls the closure directly.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available (100KB red zone).
    const RED_ZONE: usize = 100 * 1024;

    /// Stack space to allocate when growing (1MB).
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_ir::{Body, BodyKind, Name, StringInterner};
    use ember_patterns::Value;
    use pretty_assertions::assert_eq;
    use rustc_hash::FxHashMap;

    fn frame<'p>(body: &'p Body) -> CallFrame<'p> {
        CallFrame::new(body, FxHashMap::default(), Vec::<(Name, Value)>::new())
    }

    #[test]
    fn push_respects_depth_limit() {
        let interner = StringInterner::new();
        let body = Body::new(interner.intern("f"), BodyKind::Function, vec![], vec![]);
        let mut stack = CallStack::new(Some(2));
        assert!(stack.push(frame(&body)).is_ok());
        assert!(stack.push(frame(&body)).is_ok());
        assert_eq!(stack.push(frame(&body)), Err(DepthExceeded { limit: 2 }));
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn deep_host_recursion_does_not_overflow() {
        fn deep_recurse(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { deep_recurse(n - 1) + 1 })
        }

        assert_eq!(deep_recurse(100_000), 100_000);
    }
}
