//! Checked getters and setters for nested record fields.
//!
//! A [`Lens`] is derived once from a record type and a field path. Deriving
//! resolves every path segment against the type, so a lens that exists can
//! only fail on values of some other type.
//!
//! ```
//! use structrec::{TypeRegistry, Value, derive_lens_str, parse_record_type, parse_record_value};
//! use structrec::elaborate::{elaborate_type, elaborate_value};
//!
//! let registry = TypeRegistry::new();
//! let date = elaborate_type(&parse_record_type("{year :: Int, day :: Int}")?, &registry)?;
//! let value = elaborate_value(&parse_record_value("{day = 9, year = 1934}")?, &registry, Some(&date))?;
//! let year = derive_lens_str(&date.into(), "year")?;
//!
//! let value = Value::Record(value);
//! assert_eq!(year.get(&value)?, &Value::Int(1934));
//! let older = year.set(&value, Value::Int(1935))?;
//! assert_eq!(year.get(&older)?, &Value::Int(1935));
//! # Ok::<(), structrec::Error>(())
//! ```

use crate::{
    ast::PathAst,
    error::{Error, TypeMismatchError, UnknownFieldError},
    syntax::{Span, parse::parse_lens_path},
    types::{FieldName, Path, Type},
    value::Value,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, PartialEq, Eq, Hash, derive_more::Debug)]
pub struct Lens {
    source: Type,
    target: Type,
    path: Path,
    /// Canonical field index at each level of `path`.
    #[debug(skip)]
    steps: Arc<[usize]>,
}

/// Resolve `path` against `ty`, failing at the first segment the type at that
/// depth does not have.
pub fn derive_lens(ty: &Type, path: &PathAst) -> Result<Lens, UnknownFieldError> {
    derive(
        ty,
        path.to_path(),
        path.segments.iter().map(|segment| Some(segment.span)),
    )
}

/// Like [`derive_lens`] for a path built in code rather than parsed.
pub fn derive_lens_path(ty: &Type, path: &Path) -> Result<Lens, UnknownFieldError> {
    derive(ty, path.clone(), std::iter::repeat(None))
}

/// Parse `text` as a lens path and derive it against `ty`.
pub fn derive_lens_str(ty: &Type, text: &str) -> Result<Lens, Error> {
    Ok(derive_lens(ty, &parse_lens_path(text)?)?)
}

fn derive(
    ty: &Type,
    path: Path,
    spans: impl Iterator<Item = Option<Span>>,
) -> Result<Lens, UnknownFieldError> {
    let mut current = ty.clone();
    let mut steps = Vec::with_capacity(path.len());
    for (depth, (segment, span)) in path.segments().iter().zip(spans).enumerate() {
        let Some((index, field_ty)) = resolve(&current, segment) else {
            return Err(UnknownFieldError {
                ty: current,
                segment: segment.clone(),
                path: path.clone(),
                depth,
                span,
            });
        };
        steps.push(index);
        current = field_ty;
    }
    debug!(source = %ty, %path, target = %current, "derived lens");
    Ok(Lens {
        source: ty.clone(),
        target: current,
        path,
        steps: Arc::from(steps),
    })
}

fn resolve(ty: &Type, name: &FieldName) -> Option<(usize, Type)> {
    let record = ty.as_record()?;
    let index = record.field_index(name)?;
    Some((index, record.fields()[index].value.clone()))
}

impl Lens {
    /// The lens that views a whole value of type `ty`.
    pub fn identity(ty: Type) -> Self {
        Self {
            source: ty.clone(),
            target: ty,
            path: Path::default(),
            steps: Arc::from([]),
        }
    }

    pub fn source(&self) -> &Type {
        &self.source
    }

    pub fn target(&self) -> &Type {
        &self.target
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get<'a>(&self, value: &'a Value) -> Result<&'a Value, TypeMismatchError> {
        self.check_source(value)?;
        let mut current = value;
        for &index in self.steps.iter() {
            current = child(current, index).ok_or_else(|| self.source_mismatch(value))?;
        }
        Ok(current)
    }

    /// A copy of `value` with the viewed field replaced by `leaf`. Every
    /// record from the root down to the field is rebuilt, siblings are
    /// carried over unchanged.
    pub fn set(&self, value: &Value, leaf: Value) -> Result<Value, TypeMismatchError> {
        self.check_source(value)?;
        if !self.target.accepts(&leaf) {
            return Err(
                TypeMismatchError::new(self.target.clone(), leaf.type_of()).at(self.path.clone())
            );
        }
        replace(value, &self.steps, leaf).ok_or_else(|| self.source_mismatch(value))
    }

    pub fn modify(
        &self,
        value: &Value,
        f: impl FnOnce(&Value) -> Value,
    ) -> Result<Value, TypeMismatchError> {
        let leaf = f(self.get(value)?);
        self.set(value, leaf)
    }

    /// View the target of `self` through `inner`. The result gets through
    /// `self` and then `inner`, and sets through both in the opposite order.
    pub fn compose(&self, inner: &Lens) -> Result<Lens, TypeMismatchError> {
        if self.target != inner.source {
            return Err(
                TypeMismatchError::new(self.target.clone(), inner.source.clone())
                    .at(self.path.clone()),
            );
        }
        Ok(Lens {
            source: self.source.clone(),
            target: inner.target.clone(),
            path: self.path.join(&inner.path),
            steps: self.steps.iter().chain(inner.steps.iter()).copied().collect(),
        })
    }

    fn check_source(&self, value: &Value) -> Result<(), TypeMismatchError> {
        if self.source.accepts(value) {
            Ok(())
        } else {
            Err(self.source_mismatch(value))
        }
    }

    fn source_mismatch(&self, value: &Value) -> TypeMismatchError {
        TypeMismatchError::new(self.source.clone(), value.type_of())
    }
}

fn child(value: &Value, index: usize) -> Option<&Value> {
    value.as_record()?.get_at(index)
}

fn replace(value: &Value, steps: &[usize], leaf: Value) -> Option<Value> {
    let Some((&index, rest)) = steps.split_first() else {
        return Some(leaf);
    };
    let record = value.as_record()?;
    let updated = replace(record.get_at(index)?, rest, leaf)?;
    Some(Value::Record(record.with_value_at(index, updated)))
}
