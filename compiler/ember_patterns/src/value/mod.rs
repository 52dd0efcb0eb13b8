//! Runtime values for the Ember interpreter.
//!
//! # Heap Enforcement
//!
//! All heap allocations go through factory methods on `Value`. The `Heap<T>`
//! wrapper has a `pub(super)` constructor, so code outside this module
//! cannot build heap values directly.
//!
//! ```text
//! let s = Value::string("woops");       // OK
//! let s = Value::Str(Heap::new(...));   // ERROR: Heap::new is pub(super)
//! ```

mod heap;

use std::fmt;

use ember_ir::{is_builtin_type_tag, BodyId, Name};
use rustc_hash::FxHashMap;

pub use heap::Heap;

/// Runtime value.
///
/// Opaque to the propagation engine apart from equality and the type tag,
/// both of which the pattern matcher consumes.
#[derive(Clone)]
pub enum Value {
    /// The absence value.
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Heap<str>),
    /// Symbol such as `:rescued`, stored without the leading colon.
    Symbol(Heap<str>),
    /// Structured record such as `%ArgumentError{message: "..."}`.
    Record(Heap<RecordValue>),
    /// Closure over a closure body.
    Closure(Heap<ClosureValue>),
}

/// Payload of a record value.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordValue {
    pub type_name: String,
    /// Fields in construction order.
    pub fields: Vec<(String, Value)>,
}

impl RecordValue {
    /// Look up a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }
}

/// Payload of a closure value.
#[derive(Clone, Debug)]
pub struct ClosureValue {
    pub body: BodyId,
    /// Bindings visible in the creating frame, snapshotted at creation.
    pub captures: FxHashMap<Name, Value>,
}

// Factory Methods (ONLY way to construct heap values)

impl Value {
    #[inline]
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Heap::text(s.as_ref()))
    }

    #[inline]
    pub fn symbol(s: impl AsRef<str>) -> Self {
        Value::Symbol(Heap::text(s.as_ref()))
    }

    /// Create a record value.
    ///
    /// ```text
    /// let err = Value::record("ArgumentError", vec![("message".into(), Value::string("bad"))]);
    /// ```
    pub fn record(type_name: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        Value::Record(Heap::new(RecordValue {
            type_name: type_name.into(),
            fields,
        }))
    }

    pub fn closure(body: BodyId, captures: FxHashMap<Name, Value>) -> Self {
        Value::Closure(Heap::new(ClosureValue { body, captures }))
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&ClosureValue> {
        match self {
            Value::Closure(c) => Some(c),
            _ => None,
        }
    }

    /// Type tag tested by type-name patterns.
    ///
    /// Records report their declared type name.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Boolean",
            Value::Int(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Str(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::Record(r) => &r.type_name,
            Value::Closure(_) => "Closure",
        }
    }

    /// Whether a type-name pattern testing `tag` accepts this value.
    ///
    /// Records answer only to their own type name, never to a builtin tag.
    pub fn has_type_tag(&self, tag: &str) -> bool {
        match self {
            Value::Record(r) => r.type_name == tag && !is_builtin_type_tag(tag),
            other => other.type_name() == tag,
        }
    }

    /// Debug-oriented rendering: strings are quoted, everything else
    /// renders as in `Display`.
    pub fn inspect(&self) -> String {
        match self {
            Value::Str(s) => format!("\"{}\"", s.escape_debug()),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) | (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            // Closures are equal by identity
            (Value::Closure(a), Value::Closure(b)) => Heap::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{}", &**s),
            Value::Symbol(s) => write!(f, ":{}", &**s),
            Value::Record(r) => {
                write!(f, "%{}{{", r.type_name)?;
                for (i, (name, value)) in r.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {}", value.inspect())?;
                }
                write!(f, "}}")
            }
            Value::Closure(c) => write!(f, "#<closure {}>", c.body.raw()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}
