//! Program loading.
//!
//! `ember` reads programs that are already parsed: a JSON document holding
//! function bodies, their `rescue` and `ensure` clauses, and expression trees.
//! Loading deserializes the document with serde, lowers it through
//! [`ProgramBuilder`] and validates the result.
//!
//! ```json
//! {
//!   "entry": "main",
//!   "functions": [{
//!     "name": "main",
//!     "body": [{ "op": "raise", "value": { "op": "str", "value": "woops" } }],
//!     "rescue": [{ "pattern": { "kind": "bind", "name": "e" },
//!                  "body": [{ "op": "symbol", "value": "rescued" }] }],
//!     "ensure": [{ "op": "call", "func": "print",
//!                  "args": [{ "op": "str", "value": "cleanup" }] }]
//!   }]
//! }
//! ```

use std::path::Path;

use ember_ir::{BodyId, BodyKind, ExprId, Literal, MatchPattern, Program, ProgramBuilder, ProgramError};
use serde::{Deserialize, Serialize};

/// Failure to produce a runnable program from a file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed program: {0}")]
    Json(#[from] serde_json::Error),
    #[error("function #{index} has no name")]
    UnnamedFunction { index: usize },
    #[error("literal pattern expects a literal, found `{op}`")]
    NonLiteralPattern { op: &'static str },
    #[error("invalid program: {0}")]
    Program(#[from] ProgramError),
}

fn default_entry() -> String {
    "main".to_string()
}

/// Top-level document.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramDef {
    #[serde(default = "default_entry")]
    pub entry: String,
    pub functions: Vec<BodyDef>,
}

/// A function, closure or block body with its clauses.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct BodyDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub body: Vec<ExprDef>,
    /// Handler clauses, in declaration order.
    #[serde(default)]
    pub rescue: Vec<RescueDef>,
    #[serde(default)]
    pub ensure: Option<Vec<ExprDef>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RescueDef {
    /// Absent means "match anything, bind nothing".
    #[serde(default)]
    pub pattern: Option<PatternDef>,
    #[serde(default)]
    pub body: Vec<ExprDef>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub value: ExprDef,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ExprDef {
    Nil,
    Bool {
        value: bool,
    },
    Int {
        value: i64,
    },
    Float {
        value: f64,
    },
    Str {
        value: String,
    },
    Symbol {
        value: String,
    },
    Ident {
        name: String,
    },
    Let {
        name: String,
        value: Box<ExprDef>,
    },
    Seq {
        body: Vec<ExprDef>,
    },
    Raise {
        #[serde(default)]
        value: Option<Box<ExprDef>>,
    },
    Call {
        func: String,
        #[serde(default)]
        args: Vec<ExprDef>,
    },
    Lambda(BodyDef),
    Apply {
        callee: Box<ExprDef>,
        #[serde(default)]
        args: Vec<ExprDef>,
    },
    Begin(BodyDef),
    Record {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        fields: Vec<FieldDef>,
    },
    Field {
        target: Box<ExprDef>,
        field: String,
    },
}

impl ExprDef {
    /// The `op` tag this node was written with.
    pub fn op(&self) -> &'static str {
        match self {
            ExprDef::Nil => "nil",
            ExprDef::Bool { .. } => "bool",
            ExprDef::Int { .. } => "int",
            ExprDef::Float { .. } => "float",
            ExprDef::Str { .. } => "str",
            ExprDef::Symbol { .. } => "symbol",
            ExprDef::Ident { .. } => "ident",
            ExprDef::Let { .. } => "let",
            ExprDef::Seq { .. } => "seq",
            ExprDef::Raise { .. } => "raise",
            ExprDef::Call { .. } => "call",
            ExprDef::Lambda(_) => "lambda",
            ExprDef::Apply { .. } => "apply",
            ExprDef::Begin(_) => "begin",
            ExprDef::Record { .. } => "record",
            ExprDef::Field { .. } => "field",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternDef {
    Any,
    Bind {
        name: String,
    },
    Type {
        tag: String,
        #[serde(default)]
        bind: Option<String>,
    },
    Literal {
        value: ExprDef,
    },
    Pinned {
        name: String,
    },
}

/// Read, parse, lower and validate a program file.
pub fn load_file(path: &Path) -> Result<Program, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "loading program");
    load_str(&text)
}

/// Parse, lower and validate a program held in memory.
pub fn load_str(text: &str) -> Result<Program, LoadError> {
    let def: ProgramDef = serde_json::from_str(text)?;
    lower(&def)
}

/// Lower a parsed document into a validated [`Program`].
pub fn lower(def: &ProgramDef) -> Result<Program, LoadError> {
    let mut lowering = Lowering {
        b: ProgramBuilder::new(),
    };
    let mut entry = None;
    for (index, function) in def.functions.iter().enumerate() {
        let name = function
            .name
            .as_deref()
            .ok_or(LoadError::UnnamedFunction { index })?;
        let id = lowering.body(BodyKind::Function, name, function)?;
        if name == def.entry {
            entry = Some(id);
        }
    }
    if let Some(entry) = entry {
        lowering.b.set_entry(entry);
    }
    Ok(lowering.b.finish()?)
}

struct Lowering {
    b: ProgramBuilder,
}

impl Lowering {
    fn body(&mut self, kind: BodyKind, name: &str, def: &BodyDef) -> Result<BodyId, LoadError> {
        let exprs = self.exprs(&def.body)?;
        let params: Vec<&str> = def.params.iter().map(String::as_str).collect();
        let id = match kind {
            BodyKind::Function => self.b.function(name, &params, exprs),
            BodyKind::Block | BodyKind::Closure => self.b.add_body(kind, name, &params, exprs),
        };

        for clause in &def.rescue {
            let pattern = clause
                .pattern
                .as_ref()
                .map(|p| self.pattern(p))
                .transpose()?;
            let body = self.exprs(&clause.body)?;
            self.b.rescue(id, pattern, body);
        }
        if let Some(cleanup) = &def.ensure {
            let body = self.exprs(cleanup)?;
            self.b.ensure(id, body);
        }
        Ok(id)
    }

    fn exprs(&mut self, defs: &[ExprDef]) -> Result<Vec<ExprId>, LoadError> {
        defs.iter().map(|def| self.expr(def)).collect()
    }

    fn expr(&mut self, def: &ExprDef) -> Result<ExprId, LoadError> {
        let id = match def {
            ExprDef::Nil => self.b.nil(),
            ExprDef::Bool { value } => self.b.bool(*value),
            ExprDef::Int { value } => self.b.int(*value),
            ExprDef::Float { value } => self.b.float(*value),
            ExprDef::Str { value } => self.b.str(value),
            ExprDef::Symbol { value } => self.b.symbol(value),
            ExprDef::Ident { name } => self.b.ident(name),
            ExprDef::Let { name, value } => {
                let value = self.expr(value)?;
                self.b.let_(name, value)
            }
            ExprDef::Seq { body } => {
                let body = self.exprs(body)?;
                self.b.seq(body)
            }
            ExprDef::Raise { value } => {
                let value = value.as_deref().map(|v| self.expr(v)).transpose()?;
                self.b.raise(value)
            }
            ExprDef::Call { func, args } => {
                let args = self.exprs(args)?;
                self.b.call(func, args)
            }
            ExprDef::Lambda(body) => {
                let name = body.name.as_deref().unwrap_or("lambda");
                let id = self.body(BodyKind::Closure, name, body)?;
                self.b.lambda(id)
            }
            ExprDef::Apply { callee, args } => {
                let callee = self.expr(callee)?;
                let args = self.exprs(args)?;
                self.b.apply(callee, args)
            }
            ExprDef::Begin(body) => {
                let name = body.name.as_deref().unwrap_or("block");
                let id = self.body(BodyKind::Block, name, body)?;
                self.b.begin(id)
            }
            ExprDef::Record { type_name, fields } => {
                let mut lowered = Vec::with_capacity(fields.len());
                for field in fields {
                    let value = self.expr(&field.value)?;
                    lowered.push((field.name.as_str(), value));
                }
                self.b.record(type_name, lowered)
            }
            ExprDef::Field { target, field } => {
                let target = self.expr(target)?;
                self.b.field(target, field)
            }
        };
        Ok(id)
    }

    fn pattern(&self, def: &PatternDef) -> Result<MatchPattern, LoadError> {
        Ok(match def {
            PatternDef::Any => MatchPattern::Wildcard,
            PatternDef::Bind { name } => self.b.pattern_bind(name),
            PatternDef::Type { tag, bind } => self.b.pattern_type(tag, bind.as_deref()),
            PatternDef::Literal { value } => MatchPattern::Literal(self.literal(value)?),
            PatternDef::Pinned { name } => self.b.pattern_pinned(name),
        })
    }

    fn literal(&self, def: &ExprDef) -> Result<Literal, LoadError> {
        match def {
            ExprDef::Nil => Ok(Literal::Nil),
            ExprDef::Bool { value } => Ok(Literal::Bool(*value)),
            ExprDef::Int { value } => Ok(Literal::Int(*value)),
            ExprDef::Float { value } => Ok(Literal::Float(*value)),
            ExprDef::Str { value } => Ok(self.b.lit_str(value)),
            ExprDef::Symbol { value } => Ok(self.b.lit_symbol(value)),
            other => Err(LoadError::NonLiteralPattern { op: other.op() }),
        }
    }
}

#[cfg(test)]
mod tests;
