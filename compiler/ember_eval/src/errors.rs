//! Runtime faults.
//!
//! Faults found while evaluating a body are not host errors: they are
//! raised as ordinary record values from the current frame and go through
//! the same handler search as a user `raise`. `RuntimeFault` carries the
//! structured data; `into_value` produces the record that gets raised.

use std::fmt;

use ember_patterns::Value;

/// Typed category of a runtime fault.
///
/// The record type name is what `rescue` clauses test against; `Display`
/// produces the record's `message` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeFault {
    UndefinedVariable { name: String },
    UndefinedFunction { name: String },
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    NotCallable { type_name: String },
    NoSuchField { field: String, type_name: String },
    StackOverflow { depth: usize },
}

impl RuntimeFault {
    /// Record type name of the raised value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::UndefinedVariable { .. } | Self::UndefinedFunction { .. } => "NameError",
            Self::ArityMismatch { .. } => "ArgumentError",
            Self::NotCallable { .. } => "TypeError",
            Self::NoSuchField { .. } => "FieldError",
            Self::StackOverflow { .. } => "StackOverflowError",
        }
    }

    /// Build the record value that gets raised.
    pub fn into_value(self) -> Value {
        let mut fields = vec![("message".to_string(), Value::string(self.to_string()))];
        match &self {
            Self::UndefinedVariable { name } | Self::UndefinedFunction { name } => {
                fields.push(("name".to_string(), Value::string(name)));
            }
            Self::StackOverflow { depth } => {
                fields.push((
                    "depth".to_string(),
                    Value::Int(i64::try_from(*depth).unwrap_or(i64::MAX)),
                ));
            }
            _ => {}
        }
        Value::record(self.type_name(), fields)
    }
}

impl fmt::Display for RuntimeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedVariable { name } => write!(f, "undefined variable: {name}"),
            Self::UndefinedFunction { name } => write!(f, "undefined function: {name}"),
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "{name} expects {expected} {arg_word}, got {got}")
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::NoSuchField { field, type_name } => {
                write!(f, "no field `{field}` on {type_name}")
            }
            Self::StackOverflow { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }
        }
    }
}

pub fn undefined_variable(name: &str) -> RuntimeFault {
    RuntimeFault::UndefinedVariable {
        name: name.to_string(),
    }
}

pub fn undefined_function(name: &str) -> RuntimeFault {
    RuntimeFault::UndefinedFunction {
        name: name.to_string(),
    }
}

pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> RuntimeFault {
    RuntimeFault::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    }
}

pub fn not_callable(value: &Value) -> RuntimeFault {
    RuntimeFault::NotCallable {
        type_name: value.type_name().to_string(),
    }
}

pub fn no_such_field(field: &str, value: &Value) -> RuntimeFault {
    RuntimeFault::NoSuchField {
        field: field.to_string(),
        type_name: value.type_name().to_string(),
    }
}

pub fn stack_overflow(depth: usize) -> RuntimeFault {
    RuntimeFault::StackOverflow { depth }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn undefined_variable_is_a_name_error_record() {
        let value = undefined_variable("x").into_value();
        assert_eq!(value.type_name(), "NameError");
        let record = value.as_record();
        assert_eq!(
            record.and_then(|r| r.get("message")),
            Some(&Value::string("undefined variable: x"))
        );
        assert_eq!(record.and_then(|r| r.get("name")), Some(&Value::string("x")));
    }

    #[test]
    fn arity_message_uses_singular_for_one() {
        assert_eq!(
            arity_mismatch("f", 1, 0).to_string(),
            "f expects 1 argument, got 0"
        );
        assert_eq!(
            arity_mismatch("g", 2, 3).to_string(),
            "g expects 2 arguments, got 3"
        );
    }

    #[test]
    fn stack_overflow_carries_depth() {
        let value = stack_overflow(64).into_value();
        assert_eq!(value.type_name(), "StackOverflowError");
        assert_eq!(
            value.as_record().and_then(|r| r.get("depth")),
            Some(&Value::Int(64))
        );
    }

    #[test]
    fn not_callable_names_the_type() {
        assert_eq!(
            not_callable(&Value::Int(3)).to_string(),
            "Integer is not callable"
        );
    }
}
