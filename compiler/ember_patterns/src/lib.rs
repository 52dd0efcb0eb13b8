//! Ember Patterns - Runtime values and handler pattern matching.
//!
//! This crate provides:
//! - Runtime value types (`Value`, `Heap`, `RecordValue`, `ClosureValue`)
//! - The pattern matcher consulted by the propagation engine for each
//!   `rescue` clause (`match_pattern`, `MatchResult`, `BindingLookup`)
//!
//! The matcher is the only place that knows how a pattern relates to a
//! value. The evaluator hands it a pattern, the raised value and the
//! bindings of the handler's frame, and acts on the result.

mod matcher;
mod value;

pub use matcher::{literal_value, match_pattern, BindingLookup, Bindings, MatchResult, NoBindings};
pub use value::{ClosureValue, Heap, RecordValue, Value};
