//! Ember IR - Intermediate representation for the Ember runtime.
//!
//! Programs arrive here already parsed: a flat expression arena, a table of
//! executable bodies (functions, blocks, closures) with their declared
//! `rescue`/`ensure` clauses, and pre-parsed handler patterns.
//!
//! # Design
//!
//! - `ExprId(u32)` / `BodyId(u32)` indices instead of boxed trees
//! - Interned `Name`s for identifiers, symbols and string literals
//! - `Program::validate` establishes the invariants the evaluator relies on
//!   (ids in range, children allocated before parents, body kinds consistent)

mod ast;
mod body;
mod expr_id;
mod interner;
mod name;
mod program;

pub use ast::{is_builtin_type_tag, ExprKind, Literal, MatchPattern, BUILTIN_TYPE_TAGS};
pub use body::{Body, BodyKind, CleanupClause, HandlerClause};
pub use expr_id::{BodyId, ExprId};
pub use interner::{InternError, StringInterner};
pub use name::Name;
pub use program::{ExprArena, Program, ProgramBuilder, ProgramError};
