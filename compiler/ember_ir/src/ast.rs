//! Expression and pattern nodes.
//!
//! These are the already-parsed, executable forms handed to the runtime by
//! the loader. Children are referenced by [`ExprId`]; a child is always
//! allocated before its parent (enforced by `Program::validate`), so the
//! expression graph is acyclic.

use crate::{BodyId, ExprId, Name};

/// Literal value appearing in an expression or a literal pattern.
///
/// Strings and symbols are interned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Name),
    Symbol(Name),
}

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Literal value.
    Literal(Literal),
    /// Variable reference, resolved within the current frame.
    Ident(Name),
    /// `let name = value`, evaluates to the bound value.
    Let { name: Name, value: ExprId },
    /// Expressions evaluated in order; the last one is the value.
    Seq(Vec<ExprId>),
    /// `raise value`. An absent operand raises `nil`.
    Raise(Option<ExprId>),
    /// Call of a named function (or the `print` builtin).
    Call { func: Name, args: Vec<ExprId> },
    /// Closure creation over a closure body.
    Lambda(BodyId),
    /// Application of a closure value.
    Apply { callee: ExprId, args: Vec<ExprId> },
    /// Inline block, invoked immediately in a frame of its own.
    Begin(BodyId),
    /// Record construction: `%Type{field: value, ...}`.
    Record {
        type_name: Name,
        fields: Vec<(Name, ExprId)>,
    },
    /// Record field access.
    Field { target: ExprId, field: Name },
}

impl ExprKind {
    /// Direct child expressions, in evaluation order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            ExprKind::Literal(_) | ExprKind::Ident(_) | ExprKind::Lambda(_) | ExprKind::Begin(_) => {
                Vec::new()
            }
            ExprKind::Let { value, .. } => vec![*value],
            ExprKind::Seq(exprs) => exprs.clone(),
            ExprKind::Raise(value) => value.iter().copied().collect(),
            ExprKind::Call { args, .. } => args.clone(),
            ExprKind::Apply { callee, args } => {
                let mut out = Vec::with_capacity(args.len() + 1);
                out.push(*callee);
                out.extend_from_slice(args);
                out
            }
            ExprKind::Record { fields, .. } => fields.iter().map(|(_, e)| *e).collect(),
            ExprKind::Field { target, .. } => vec![*target],
        }
    }

    /// Body referenced by this node, if any.
    pub fn body_ref(&self) -> Option<BodyId> {
        match self {
            ExprKind::Lambda(body) | ExprKind::Begin(body) => Some(*body),
            _ => None,
        }
    }
}

/// Type tags of the builtin value kinds.
///
/// Records may not take one of these as their type name, so a type-tag test
/// never confuses a record with a builtin value.
pub const BUILTIN_TYPE_TAGS: [&str; 7] = [
    "Nil", "Boolean", "Integer", "Float", "String", "Symbol", "Closure",
];

#[inline]
pub fn is_builtin_type_tag(tag: &str) -> bool {
    BUILTIN_TYPE_TAGS.contains(&tag)
}

/// Pre-parsed pattern of a handler clause.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatchPattern {
    /// Matches everything, binds nothing. Stands in for an absent pattern.
    Wildcard,
    /// Bare identifier: always matches and binds the value.
    Bind(Name),
    /// Type-tag test, optionally binding the matched value.
    Type { tag: Name, bind: Option<Name> },
    /// Structural equality against a literal.
    Literal(Literal),
    /// Equality against a value already bound in the handler's frame.
    Pinned(Name),
}
