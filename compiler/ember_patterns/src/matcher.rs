//! Handler pattern matching.
//!
//! A closed set of pattern variants with one evaluation arm each, consumed
//! by the evaluator through [`match_pattern`] only. The matcher decides
//! whether a value matches and which names it binds; it never mutates
//! bindings itself.

use ember_ir::{Literal, MatchPattern, Name, StringInterner};
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

use crate::Value;

/// Names bound by a successful match, in pattern order.
pub type Bindings = SmallVec<[(Name, Value); 2]>;

/// Outcome of matching one pattern against one value.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchResult {
    Matched(Bindings),
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }

    /// Bindings of a successful match, `None` otherwise.
    pub fn into_bindings(self) -> Option<Bindings> {
        match self {
            MatchResult::Matched(bindings) => Some(bindings),
            MatchResult::NoMatch => None,
        }
    }
}

/// Read access to the bindings a pinned pattern resolves against.
pub trait BindingLookup {
    fn lookup_binding(&self, name: Name) -> Option<Value>;
}

impl BindingLookup for FxHashMap<Name, Value> {
    fn lookup_binding(&self, name: Name) -> Option<Value> {
        self.get(&name).cloned()
    }
}

/// Lookup with nothing bound, for matching outside any frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBindings;

impl BindingLookup for NoBindings {
    fn lookup_binding(&self, _name: Name) -> Option<Value> {
        None
    }
}

/// Match `pattern` against `value`.
///
/// `outer` supplies the bindings visible where the clause is declared and
/// is only consulted by pinned patterns. Equality is structural with no
/// coercion between value kinds.
pub fn match_pattern(
    pattern: &MatchPattern,
    value: &Value,
    outer: &dyn BindingLookup,
    interner: &StringInterner,
) -> MatchResult {
    match pattern {
        MatchPattern::Wildcard => MatchResult::Matched(SmallVec::new()),

        MatchPattern::Bind(name) => MatchResult::Matched(smallvec![(*name, value.clone())]),

        MatchPattern::Type { tag, bind } => {
            if !value.has_type_tag(interner.lookup(*tag)) {
                return MatchResult::NoMatch;
            }
            match bind {
                Some(name) => MatchResult::Matched(smallvec![(*name, value.clone())]),
                None => MatchResult::Matched(SmallVec::new()),
            }
        }

        MatchPattern::Literal(lit) => {
            if literal_value(*lit, interner) == *value {
                MatchResult::Matched(SmallVec::new())
            } else {
                MatchResult::NoMatch
            }
        }

        MatchPattern::Pinned(name) => match outer.lookup_binding(*name) {
            Some(pinned) if pinned == *value => MatchResult::Matched(SmallVec::new()),
            Some(_) => MatchResult::NoMatch,
            None => {
                tracing::debug!(
                    name = interner.lookup(*name),
                    "pinned pattern refers to an unbound name"
                );
                MatchResult::NoMatch
            }
        },
    }
}

/// Materialize a literal as a runtime value.
pub fn literal_value(lit: Literal, interner: &StringInterner) -> Value {
    match lit {
        Literal::Nil => Value::Nil,
        Literal::Bool(b) => Value::Bool(b),
        Literal::Int(n) => Value::Int(n),
        Literal::Float(x) => Value::Float(x),
        Literal::Str(s) => Value::string(interner.lookup(s)),
        Literal::Symbol(s) => Value::symbol(interner.lookup(s)),
    }
}
