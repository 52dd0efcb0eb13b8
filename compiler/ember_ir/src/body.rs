//! Executable bodies and their declared clauses.

use std::fmt;

use crate::{ExprId, MatchPattern, Name};

/// What kind of invocation a body belongs to.
///
/// All three get a call frame; the kind only affects how the body is
/// reached and how it is labelled in traces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Named function, reached through `ExprKind::Call`.
    Function,
    /// Inline block, reached through `ExprKind::Begin`.
    Block,
    /// Closure body, reached through `ExprKind::Apply` on a closure value.
    Closure,
}

impl BodyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BodyKind::Function => "function",
            BodyKind::Block => "block",
            BodyKind::Closure => "closure",
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `rescue` clause.
///
/// Clauses are kept in declaration order; the first match wins.
#[derive(Clone, Debug, PartialEq)]
pub struct HandlerClause {
    /// `None` matches every raised value, `nil` included, without binding.
    pub pattern: Option<MatchPattern>,
    pub body: Vec<ExprId>,
}

impl HandlerClause {
    /// The pattern handed to the matcher; an absent pattern is a wildcard.
    #[inline]
    pub fn effective_pattern(&self) -> MatchPattern {
        self.pattern.unwrap_or(MatchPattern::Wildcard)
    }
}

/// An `ensure` clause. Its value is always discarded.
#[derive(Clone, Debug, PartialEq)]
pub struct CleanupClause {
    pub body: Vec<ExprId>,
}

/// Declaration of an executable unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub name: Name,
    pub kind: BodyKind,
    pub params: Vec<Name>,
    pub exprs: Vec<ExprId>,
    pub handlers: Vec<HandlerClause>,
    pub cleanup: Option<CleanupClause>,
}

impl Body {
    /// Create a body with no clauses.
    pub fn new(name: Name, kind: BodyKind, params: Vec<Name>, exprs: Vec<ExprId>) -> Self {
        Body {
            name,
            kind,
            params,
            exprs,
            handlers: Vec::new(),
            cleanup: None,
        }
    }

    /// Every expression root owned by this body: main exprs, handler bodies, cleanup.
    pub fn roots(&self) -> impl Iterator<Item = ExprId> + '_ {
        self.exprs
            .iter()
            .chain(self.handlers.iter().flat_map(|h| h.body.iter()))
            .chain(self.cleanup.iter().flat_map(|c| c.body.iter()))
            .copied()
    }
}
