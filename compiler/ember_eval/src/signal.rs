//! Exception signals and fatal termination.
//!
//! A raise is not a host-level jump. It is the `Err` arm of [`EvalResult`],
//! returned up through each invocation step. Every frame boundary inspects
//! it and either consumes it (a handler matched), or records itself as
//! unwound and passes it on to its invoker.

use std::fmt;

use ember_ir::BodyKind;
use ember_patterns::Value;

/// Result of evaluating an expression or a frame: a value, or a raise in flight.
pub type EvalResult = Result<Value, ExceptionSignal>;

/// One frame that a signal unwound through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceFrame {
    pub name: String,
    pub kind: BodyKind,
}

impl fmt::Display for TraceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// A raise in flight.
///
/// Created by `raise` (or a runtime fault), destroyed the moment a handler
/// clause matches. Until then it collects the frames it unwinds,
/// innermost first.
#[derive(Clone, Debug)]
pub struct ExceptionSignal {
    value: Value,
    /// Stack depth of the frame that raised, `None` if raised outside any frame.
    origin: Option<usize>,
    /// Stack depth of the frame whose clauses are currently being searched.
    searching: Option<usize>,
    unwound: Vec<TraceFrame>,
}

impl ExceptionSignal {
    /// Create a signal anchored at the frame at `origin` depth.
    pub fn new(value: Value, origin: Option<usize>) -> Self {
        Self {
            value,
            origin,
            searching: None,
            unwound: Vec::new(),
        }
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    pub fn origin(&self) -> Option<usize> {
        self.origin
    }

    #[inline]
    pub fn searching(&self) -> Option<usize> {
        self.searching
    }

    /// Frames unwound so far, innermost first.
    #[inline]
    pub fn unwound(&self) -> &[TraceFrame] {
        &self.unwound
    }

    pub(crate) fn mark_searching(&mut self, depth: usize) {
        self.searching = Some(depth);
    }

    pub(crate) fn record_unwound(&mut self, frame: TraceFrame) {
        self.unwound.push(frame);
    }

    /// Consume the signal, yielding the raised value.
    pub(crate) fn consume(self) -> Value {
        self.value
    }
}

/// A raise that no frame handled.
///
/// Carries the raised value and every unwound frame, innermost first.
/// Surfaces as a non-zero process exit.
#[derive(Clone, Debug, thiserror::Error)]
#[error("unhandled raise: {}", .value.inspect())]
pub struct FatalTermination {
    pub value: Value,
    pub trace: Vec<TraceFrame>,
}

impl FatalTermination {
    /// Process exit status for an unhandled raise.
    pub const EXIT_CODE: i32 = 1;

    /// Human-readable report: the value followed by the unwound frames.
    pub fn render(&self) -> String {
        let mut out = self.to_string();
        out.push('\n');
        if !self.trace.is_empty() {
            out.push_str("unwound frames (innermost first):\n");
            for (i, frame) in self.trace.iter().enumerate() {
                out.push_str(&format!("  {i}: {frame}\n"));
            }
        }
        out
    }
}

impl From<ExceptionSignal> for FatalTermination {
    fn from(signal: ExceptionSignal) -> Self {
        Self {
            value: signal.value,
            trace: signal.unwound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn signal_collects_unwound_frames_in_order() {
        let mut signal = ExceptionSignal::new(Value::string("woops"), Some(2));
        signal.record_unwound(TraceFrame {
            name: "inner".to_string(),
            kind: BodyKind::Function,
        });
        signal.record_unwound(TraceFrame {
            name: "main".to_string(),
            kind: BodyKind::Function,
        });
        let names: Vec<_> = signal.unwound().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["inner", "main"]);
        assert_eq!(signal.origin(), Some(2));
    }

    #[test]
    fn fatal_render_lists_value_and_frames() {
        let fatal = FatalTermination {
            value: Value::string("woops"),
            trace: vec![
                TraceFrame {
                    name: "boom".to_string(),
                    kind: BodyKind::Block,
                },
                TraceFrame {
                    name: "main".to_string(),
                    kind: BodyKind::Function,
                },
            ],
        };
        assert_eq!(
            fatal.render(),
            "unhandled raise: \"woops\"\n\
             unwound frames (innermost first):\n  \
             0: boom (block)\n  \
             1: main (function)\n"
        );
    }

    #[test]
    fn fatal_render_without_frames() {
        let fatal = FatalTermination {
            value: Value::Nil,
            trace: Vec::new(),
        };
        assert_eq!(fatal.render(), "unhandled raise: nil\n");
    }
}
