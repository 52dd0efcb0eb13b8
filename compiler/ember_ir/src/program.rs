//! Loaded programs: the expression arena, the body table and the function index.

use rustc_hash::FxHashMap;

use crate::{
    is_builtin_type_tag, Body, BodyId, BodyKind, CleanupClause, ExprId, ExprKind, HandlerClause,
    Literal, MatchPattern, Name, StringInterner,
};

/// Flat storage for expression nodes.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<ExprKind>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression, returning its id.
    ///
    /// # Panics
    /// Panics if the arena holds more than `u32::MAX` expressions.
    pub fn alloc(&mut self, kind: ExprKind) -> ExprId {
        let index = u32::try_from(self.exprs.len())
            .unwrap_or_else(|_| panic!("expression arena exceeded u32::MAX entries"));
        self.exprs.push(kind);
        ExprId::new(index)
    }

    /// Get an expression by id.
    ///
    /// Ids are checked by `Program::validate`; an unchecked id from another
    /// arena panics here.
    #[inline]
    pub fn get(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn try_get(&self, id: ExprId) -> Option<&ExprKind> {
        self.exprs.get(id.index())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

/// Structural defects detected while validating a program.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("expression {expr} does not exist (arena has {len} expressions)")]
    DanglingExpr { expr: u32, len: usize },
    #[error("body {body} does not exist (program has {len} bodies)")]
    DanglingBody { body: u32, len: usize },
    #[error("expression {parent} refers to expression {child}, which is not allocated before it")]
    ForwardReference { parent: u32, child: u32 },
    #[error("body `{body}` is a {found} body, expected a {expected} body")]
    BodyKindMismatch {
        body: String,
        expected: BodyKind,
        found: BodyKind,
    },
    #[error("body `{body}` declares parameter `{param}` more than once")]
    DuplicateParameter { body: String, param: String },
    #[error("block `{body}` declares parameters; blocks take none")]
    BlockWithParameters { body: String },
    #[error("function `{name}` is defined more than once")]
    DuplicateFunction { name: String },
    #[error("record type `{name}` is reserved for builtin values")]
    ReservedRecordType { name: String },
    #[error("program has no entry body")]
    MissingEntry,
    #[error("entry `{name}` takes {count} parameters; entries take none")]
    EntryTakesParameters { name: String, count: usize },
}

/// A validated, executable program.
#[derive(Debug)]
pub struct Program {
    interner: StringInterner,
    arena: ExprArena,
    bodies: Vec<Body>,
    functions: FxHashMap<Name, BodyId>,
    entry: Option<BodyId>,
}

impl Program {
    #[inline]
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    #[inline]
    pub fn arena(&self) -> &ExprArena {
        &self.arena
    }

    /// Get a body by id. Ids are checked by `validate`.
    #[inline]
    pub fn body(&self, id: BodyId) -> &Body {
        &self.bodies[id.index()]
    }

    #[inline]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Look up a named function.
    #[inline]
    pub fn function(&self, name: Name) -> Option<BodyId> {
        self.functions.get(&name).copied()
    }

    #[inline]
    pub fn entry(&self) -> Option<BodyId> {
        self.entry
    }

    /// Resolve a name to its string.
    #[inline]
    pub fn lookup(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Check the structural invariants the evaluator relies on.
    pub fn validate(&self) -> Result<(), ProgramError> {
        let entry = self.entry.ok_or(ProgramError::MissingEntry)?;
        self.check_body_id(entry)?;
        let entry_body = self.body(entry);
        if !entry_body.params.is_empty() {
            return Err(ProgramError::EntryTakesParameters {
                name: self.lookup(entry_body.name).to_string(),
                count: entry_body.params.len(),
            });
        }

        for (index, expr) in self.arena.exprs.iter().enumerate() {
            for child in expr.children() {
                if child.index() >= index {
                    return Err(ProgramError::ForwardReference {
                        parent: u32::try_from(index).unwrap_or(u32::MAX),
                        child: child.raw(),
                    });
                }
            }
            if let ExprKind::Record { type_name, .. } = expr {
                let name = self.lookup(*type_name);
                if is_builtin_type_tag(name) {
                    return Err(ProgramError::ReservedRecordType {
                        name: name.to_string(),
                    });
                }
            }
            if let Some(body) = expr.body_ref() {
                self.check_body_id(body)?;
                let expected = match expr {
                    ExprKind::Begin(_) => BodyKind::Block,
                    _ => BodyKind::Closure,
                };
                self.check_kind(body, expected)?;
            }
        }

        for body in &self.bodies {
            for root in body.roots() {
                if self.arena.try_get(root).is_none() {
                    return Err(ProgramError::DanglingExpr {
                        expr: root.raw(),
                        len: self.arena.len(),
                    });
                }
            }
            let mut seen = Vec::with_capacity(body.params.len());
            for param in &body.params {
                if seen.contains(param) {
                    return Err(ProgramError::DuplicateParameter {
                        body: self.lookup(body.name).to_string(),
                        param: self.lookup(*param).to_string(),
                    });
                }
                seen.push(*param);
            }
            if body.kind == BodyKind::Block && !body.params.is_empty() {
                return Err(ProgramError::BlockWithParameters {
                    body: self.lookup(body.name).to_string(),
                });
            }
        }

        for &body in self.functions.values() {
            self.check_body_id(body)?;
            self.check_kind(body, BodyKind::Function)?;
        }
        Ok(())
    }

    fn check_body_id(&self, id: BodyId) -> Result<(), ProgramError> {
        if id.index() < self.bodies.len() {
            Ok(())
        } else {
            Err(ProgramError::DanglingBody {
                body: id.raw(),
                len: self.bodies.len(),
            })
        }
    }

    fn check_kind(&self, id: BodyId, expected: BodyKind) -> Result<(), ProgramError> {
        let body = self.body(id);
        if body.kind == expected {
            Ok(())
        } else {
            Err(ProgramError::BodyKindMismatch {
                body: self.lookup(body.name).to_string(),
                expected,
                found: body.kind,
            })
        }
    }
}

/// Incremental construction of a [`Program`].
///
/// Used by the loader and by tests. Children must be built before the
/// expressions that use them, and closure/block bodies before the
/// `lambda`/`begin` expressions that refer to them.
///
/// ```text
/// let mut b = ProgramBuilder::new();
/// let msg = b.str("woops");
/// let raise = b.raise(Some(msg));
/// let main = b.function("main", &[], vec![raise]);
/// b.set_entry(main);
/// let program = b.finish()?;
/// ```
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    interner: StringInterner,
    arena: ExprArena,
    bodies: Vec<Body>,
    functions: FxHashMap<Name, BodyId>,
    duplicate_function: Option<Name>,
    entry: Option<BodyId>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string.
    #[inline]
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Allocate a raw expression.
    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        self.arena.alloc(kind)
    }

    pub fn nil(&mut self) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Nil))
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Bool(value)))
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Int(value)))
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Float(value)))
    }

    pub fn str(&mut self, value: &str) -> ExprId {
        let lit = self.lit_str(value);
        self.expr(ExprKind::Literal(lit))
    }

    pub fn symbol(&mut self, value: &str) -> ExprId {
        let lit = self.lit_symbol(value);
        self.expr(ExprKind::Literal(lit))
    }

    pub fn lit_str(&self, value: &str) -> Literal {
        Literal::Str(self.name(value))
    }

    pub fn lit_symbol(&self, value: &str) -> Literal {
        Literal::Symbol(self.name(value))
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Ident(name))
    }

    pub fn let_(&mut self, name: &str, value: ExprId) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Let { name, value })
    }

    pub fn seq(&mut self, exprs: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Seq(exprs))
    }

    pub fn raise(&mut self, value: Option<ExprId>) -> ExprId {
        self.expr(ExprKind::Raise(value))
    }

    pub fn call(&mut self, func: &str, args: Vec<ExprId>) -> ExprId {
        let func = self.name(func);
        self.expr(ExprKind::Call { func, args })
    }

    /// `print(args...)`.
    pub fn print(&mut self, args: Vec<ExprId>) -> ExprId {
        self.call("print", args)
    }

    pub fn lambda(&mut self, body: BodyId) -> ExprId {
        self.expr(ExprKind::Lambda(body))
    }

    pub fn apply(&mut self, callee: ExprId, args: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Apply { callee, args })
    }

    pub fn begin(&mut self, body: BodyId) -> ExprId {
        self.expr(ExprKind::Begin(body))
    }

    pub fn record(&mut self, type_name: &str, fields: Vec<(&str, ExprId)>) -> ExprId {
        let type_name = self.name(type_name);
        let fields = fields
            .into_iter()
            .map(|(field, value)| (self.name(field), value))
            .collect();
        self.expr(ExprKind::Record { type_name, fields })
    }

    pub fn field(&mut self, target: ExprId, field: &str) -> ExprId {
        let field = self.name(field);
        self.expr(ExprKind::Field { target, field })
    }

    pub fn pattern_bind(&self, name: &str) -> MatchPattern {
        MatchPattern::Bind(self.name(name))
    }

    pub fn pattern_type(&self, tag: &str, bind: Option<&str>) -> MatchPattern {
        MatchPattern::Type {
            tag: self.name(tag),
            bind: bind.map(|b| self.name(b)),
        }
    }

    pub fn pattern_pinned(&self, name: &str) -> MatchPattern {
        MatchPattern::Pinned(self.name(name))
    }

    /// Add a body of any kind without registering it as a function.
    ///
    /// # Panics
    /// Panics if the program holds more than `u32::MAX` bodies.
    pub fn add_body(
        &mut self,
        kind: BodyKind,
        name: &str,
        params: &[&str],
        exprs: Vec<ExprId>,
    ) -> BodyId {
        let name = self.name(name);
        let params = params.iter().map(|p| self.name(p)).collect();
        let index = u32::try_from(self.bodies.len())
            .unwrap_or_else(|_| panic!("program exceeded u32::MAX bodies"));
        self.bodies.push(Body::new(name, kind, params, exprs));
        BodyId::new(index)
    }

    /// Add a body and register it as a named function.
    pub fn function(&mut self, name: &str, params: &[&str], exprs: Vec<ExprId>) -> BodyId {
        let id = self.add_body(BodyKind::Function, name, params, exprs);
        let name = self.name(name);
        if self.functions.insert(name, id).is_some() {
            self.duplicate_function.get_or_insert(name);
        }
        id
    }

    /// Add an inline block body.
    pub fn block(&mut self, name: &str, exprs: Vec<ExprId>) -> BodyId {
        self.add_body(BodyKind::Block, name, &[], exprs)
    }

    /// Add a closure body.
    pub fn closure(&mut self, name: &str, params: &[&str], exprs: Vec<ExprId>) -> BodyId {
        self.add_body(BodyKind::Closure, name, params, exprs)
    }

    /// Append a handler clause; clause order is declaration order.
    pub fn rescue(&mut self, body: BodyId, pattern: Option<MatchPattern>, exprs: Vec<ExprId>) {
        if let Some(b) = self.bodies.get_mut(body.index()) {
            b.handlers.push(HandlerClause {
                pattern,
                body: exprs,
            });
        }
    }

    /// Set the cleanup clause, replacing any previous one.
    pub fn ensure(&mut self, body: BodyId, exprs: Vec<ExprId>) {
        if let Some(b) = self.bodies.get_mut(body.index()) {
            b.cleanup = Some(CleanupClause { body: exprs });
        }
    }

    pub fn set_entry(&mut self, body: BodyId) {
        self.entry = Some(body);
    }

    /// Validate and produce the program.
    pub fn finish(self) -> Result<Program, ProgramError> {
        if let Some(name) = self.duplicate_function {
            return Err(ProgramError::DuplicateFunction {
                name: self.interner.lookup(name).to_string(),
            });
        }
        let program = Program {
            interner: self.interner,
            arena: self.arena,
            bodies: self.bodies,
            functions: self.functions,
            entry: self.entry,
        };
        program.validate()?;
        Ok(program)
    }
}
