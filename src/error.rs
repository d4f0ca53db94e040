//! Errors produced while reading, elaborating and viewing records.
//!
//! None of these are retryable: each one points at literal text or a lens
//! path that has to be corrected.

use crate::{
    diag,
    syntax::Span,
    types::{FieldName, Path, Type},
};
use std::{error::Error as StdError, fmt};

/// Malformed literal or path text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, found {found} at {span}")]
pub struct SyntaxError {
    pub span: Span,
    pub expected: String,
    pub found: String,
}

impl SyntaxError {
    pub fn new(span: Span, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self {
            span,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// The same field name appears twice in one literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field `{name}` is defined more than once")]
pub struct DuplicateFieldError {
    pub name: FieldName,
    pub first: Option<Span>,
    pub second: Option<Span>,
}

/// A value does not have the type it is required to have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatchError {
    pub expected: Type,
    /// For a record literal with the wrong fields, a handle from a throwaway
    /// registry describing the literal as written.
    pub found: Type,
    /// Field path from the root of the checked value to the mismatch.
    pub at: Path,
    /// Fields the expected record type has but the value lacks.
    pub missing: Vec<FieldName>,
    /// Fields the value has but the expected record type lacks.
    pub extra: Vec<FieldName>,
    pub span: Option<Span>,
}

impl TypeMismatchError {
    pub fn new(expected: Type, found: Type) -> Self {
        let (missing, extra) = match (&expected, &found) {
            (Type::Record(expected), Type::Record(found)) => (
                expected
                    .names()
                    .filter(|name| found.field_index(name).is_none())
                    .cloned()
                    .collect(),
                found
                    .names()
                    .filter(|name| expected.field_index(name).is_none())
                    .cloned()
                    .collect(),
            ),
            _ => (Vec::new(), Vec::new()),
        };
        Self {
            expected,
            found,
            at: Path::default(),
            missing,
            extra,
            span: None,
        }
    }

    pub fn at(mut self, at: Path) -> Self {
        self.at = at;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type mismatch")?;
        if !self.at.is_empty() {
            write!(f, " at `{}`", self.at)?;
        }
        write!(f, ": expected {}, found {}", self.expected, self.found)?;
        if !self.missing.is_empty() {
            write!(f, "; missing {}", diag::name_list(&self.missing))?;
        }
        if !self.extra.is_empty() {
            write!(f, "; unexpected {}", diag::name_list(&self.extra))?;
        }
        Ok(())
    }
}

impl StdError for TypeMismatchError {}

/// A lens path names a field that the type at that depth does not have.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field `{segment}` in `{path}`: {}", diag::field_set(.ty))]
pub struct UnknownFieldError {
    /// The type the failing segment was looked up in.
    pub ty: Type,
    pub path: Path,
    pub segment: FieldName,
    /// Index of the failing segment within `path`.
    pub depth: usize,
    pub span: Option<Span>,
}

impl UnknownFieldError {
    /// The segments that resolved before the failing one.
    pub fn prefix(&self) -> Path {
        Path::new(self.path.segments()[..self.depth].to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, derive_more::From)]
pub enum ElaborateError {
    #[error(transparent)]
    DuplicateField(DuplicateFieldError),
    #[error(transparent)]
    TypeMismatch(TypeMismatchError),
}

/// Any error this crate produces.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, derive_more::From)]
pub enum Error {
    #[error(transparent)]
    Syntax(SyntaxError),
    #[error(transparent)]
    DuplicateField(DuplicateFieldError),
    #[error(transparent)]
    TypeMismatch(TypeMismatchError),
    #[error(transparent)]
    UnknownField(UnknownFieldError),
}

impl From<ElaborateError> for Error {
    fn from(err: ElaborateError) -> Self {
        match err {
            ElaborateError::DuplicateField(err) => Self::DuplicateField(err),
            ElaborateError::TypeMismatch(err) => Self::TypeMismatch(err),
        }
    }
}
