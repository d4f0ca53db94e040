//! Syntax trees of record literals, tuple literals and lens paths.
//!
//! Tuple literals do not have their own node: the parser desugars
//! `(a, b, c)` into a record whose fields are named `1`, `2` and `3`.

use crate::{
    syntax::Span,
    types::{FieldName, Path},
};
use ordered_float::OrderedFloat;

/// A field as written in a literal, before canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAst<T> {
    pub name: FieldName,
    pub name_span: Span,
    pub node: T,
}

/// `{name :: Type, ...}` or `(Type, Type, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTypeAst {
    pub fields: Vec<FieldAst<TypeAst>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeAst {
    Named {
        name: String,
        args: Vec<TypeAst>,
        span: Span,
    },
    Record(RecordTypeAst),
}

impl TypeAst {
    pub fn span(&self) -> Span {
        match self {
            Self::Named { span, .. } => *span,
            Self::Record(record) => record.span,
        }
    }
}

/// `{name = expr, ...}` or `(expr, expr, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordValueAst {
    pub fields: Vec<FieldAst<ExprAst>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprAst {
    Literal { literal: Literal, span: Span },
    Record(RecordValueAst),
}

impl ExprAst {
    pub fn span(&self) -> Span {
        match self {
            Self::Literal { span, .. } => *span,
            Self::Record(record) => record.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Float(OrderedFloat<f64>),
    Bool(bool),
    Char(char),
    String(String),
}

/// `name.1.name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAst {
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: FieldName,
    pub span: Span,
}

impl PathAst {
    pub fn to_path(&self) -> Path {
        self.segments.iter().map(|seg| seg.name.clone()).collect()
    }
}
