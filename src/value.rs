//! Record values and the primitive values stored in their fields.

use crate::{
    canon::{Canonical, canonicalize},
    error::DuplicateFieldError,
    registry::{TypeRegistry, positional},
    types::{self, Field, FieldName, RecordType, Type},
};
use ordered_float::OrderedFloat;
use std::{fmt, sync::Arc};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i64),
    Float(OrderedFloat<f64>),
    Bool(bool),
    Char(char),
    String(Arc<str>),
    Record(RecordValue),
}

impl Value {
    pub fn type_of(&self) -> Type {
        match self {
            Self::Record(record) => Type::Record(record.record_type().clone()),
            primitive => Type::named(primitive.primitive_name().unwrap_or_default()),
        }
    }

    /// Name of the primitive type of this value, `None` for records.
    pub fn primitive_name(&self) -> Option<&'static str> {
        match self {
            Self::Int(_) => Some(types::INT),
            Self::Float(_) => Some(types::DOUBLE),
            Self::Bool(_) => Some(types::BOOL),
            Self::Char(_) => Some(types::CHAR),
            Self::String(_) => Some(types::STRING),
            Self::Record(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(x.into_inner()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl Type {
    /// Whether `value` is of exactly this type. Record types are compared by
    /// handle, so a value built against another registry is never accepted.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Type::Record(expected), Value::Record(record)) => record.record_type() == expected,
            (Type::Named { .. }, value) => {
                value.primitive_name().is_some() && self.primitive_name() == value.primitive_name()
            }
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(OrderedFloat(x))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<RecordValue> for Value {
    fn from(record: RecordValue) -> Self {
        Self::Record(record)
    }
}

/// An immutable record: a type handle plus one value per field of its
/// canonical field list, in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordValue {
    ty: RecordType,
    values: Arc<[Value]>,
}

impl RecordValue {
    /// Pair `values` with a handle whose canonical list they already follow.
    pub(crate) fn from_parts(ty: RecordType, values: Vec<Value>) -> Self {
        debug_assert_eq!(ty.len(), values.len());
        Self {
            ty,
            values: Arc::from(values),
        }
    }

    /// Build a record from canonical fields, interning the type inferred
    /// from the field values.
    pub fn from_canonical(registry: &TypeRegistry, fields: Canonical<Value>) -> Self {
        let ty = registry.intern(fields.clone().map(|value| value.type_of()));
        let values = fields.into_iter_values();
        Self::from_parts(ty, values)
    }

    pub fn from_fields(
        registry: &TypeRegistry,
        fields: impl IntoIterator<Item = (FieldName, Value)>,
    ) -> Result<Self, DuplicateFieldError> {
        let canonical = canonicalize(
            fields
                .into_iter()
                .map(|(name, value)| (Field { name, value }, None)),
        )?;
        Ok(Self::from_canonical(registry, canonical))
    }

    pub fn tuple(registry: &TypeRegistry, elems: Vec<Value>) -> Self {
        Self::from_canonical(registry, Canonical::from_distinct(positional(elems)))
    }

    pub fn record_type(&self) -> &RecordType {
        &self.ty
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &FieldName) -> Option<&Value> {
        self.ty.field_index(name).and_then(|i| self.values.get(i))
    }

    pub fn get_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Fields in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldName, &Value)> {
        self.ty.names().zip(self.values.iter())
    }

    /// A copy of this record with the field at `index` replaced. Untouched
    /// fields are shared with `self`.
    pub(crate) fn with_value_at(&self, index: usize, value: Value) -> Self {
        let mut values = self.values.to_vec();
        values[index] = value;
        Self {
            ty: self.ty.clone(),
            values: Arc::from(values),
        }
    }
}

impl Canonical<Value> {
    fn into_iter_values(self) -> Vec<Value> {
        self.into_inner()
            .into_iter()
            .map(|field| field.value)
            .collect()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{:?}", x.into_inner()),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Char(c) => {
                write!(f, "'")?;
                write_escaped(f, *c, '\'')?;
                write!(f, "'")
            }
            Self::String(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    write_escaped(f, c, '"')?;
                }
                write!(f, "\"")
            }
            Self::Record(record) => write!(f, "{record}"),
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, c: char, quote: char) -> fmt::Result {
    match c {
        '\n' => write!(f, "\\n"),
        '\t' => write!(f, "\\t"),
        '\r' => write!(f, "\\r"),
        '\0' => write!(f, "\\0"),
        '\\' => write!(f, "\\\\"),
        c if c == quote => write!(f, "\\{c}"),
        c => write!(f, "{c}"),
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ty.is_tuple() && self.len() > 1 {
            write!(f, "(")?;
            for (i, value) in self.values.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value}")?;
            }
            return write!(f, ")");
        }
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        write!(f, "}}")
    }
}
