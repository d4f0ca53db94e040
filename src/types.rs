//! Field names, record types and the types of record fields.

use by_address::ByAddress;
use std::{fmt, sync::Arc};

/// The name of a single field: a label for records, a position for tuples.
///
/// The derived ordering is the canonical field order. Positions sort
/// numerically and labels lexicographically. The two never share a record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    Position(u32),
    Label(Arc<str>),
}

impl FieldName {
    pub fn label(label: impl AsRef<str>) -> Self {
        Self::Label(Arc::from(label.as_ref()))
    }

    pub fn position(position: u32) -> Self {
        Self::Position(position)
    }

    pub fn is_position(&self) -> bool {
        matches!(self, Self::Position(_))
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(pos) => write!(f, "{pos}"),
            Self::Label(label) => write!(f, "{label}"),
        }
    }
}

impl From<&str> for FieldName {
    fn from(label: &str) -> Self {
        Self::label(label)
    }
}

impl From<u32> for FieldName {
    fn from(position: u32) -> Self {
        Self::Position(position)
    }
}

/// A named slot of a record. `T` is a [`Type`] for record types and a
/// [`Value`](crate::value::Value) for record values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field<T> {
    pub name: FieldName,
    pub value: T,
}

impl<T> Field<T> {
    pub fn new(name: impl Into<FieldName>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A sequence of field names leading from a record to a nested field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<FieldName>);

impl Path {
    pub fn new(segments: Vec<FieldName>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[FieldName] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, segment: FieldName) {
        self.0.push(segment);
    }

    pub fn pop(&mut self) -> Option<FieldName> {
        self.0.pop()
    }

    pub fn join(&self, rest: &Path) -> Path {
        Path(self.0.iter().chain(rest.0.iter()).cloned().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromIterator<FieldName> for Path {
    fn from_iter<I: IntoIterator<Item = FieldName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub const INT: &str = "Int";
pub const DOUBLE: &str = "Double";
pub const STRING: &str = "String";
pub const CHAR: &str = "Char";
pub const BOOL: &str = "Bool";

/// The type of a record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// A named type, possibly applied to arguments, e.g. `Int` or `Maybe Int`.
    Named { name: Arc<str>, args: Arc<[Type]> },
    Record(RecordType),
}

impl Type {
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::Named {
            name: Arc::from(name.as_ref()),
            args: Arc::from([]),
        }
    }

    pub fn applied(name: impl AsRef<str>, args: Vec<Type>) -> Self {
        Self::Named {
            name: Arc::from(name.as_ref()),
            args: Arc::from(args),
        }
    }

    pub fn int() -> Self {
        Self::named(INT)
    }

    pub fn double() -> Self {
        Self::named(DOUBLE)
    }

    pub fn string() -> Self {
        Self::named(STRING)
    }

    pub fn char() -> Self {
        Self::named(CHAR)
    }

    pub fn bool() -> Self {
        Self::named(BOOL)
    }

    /// The name of this type if it is a primitive without arguments.
    pub fn primitive_name(&self) -> Option<&str> {
        match self {
            Self::Named { name, args } if args.is_empty() => Some(&**name),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            Self::Record(rt) => Some(rt),
            Self::Named { .. } => None,
        }
    }

    /// Whether `self` needs parentheses when printed as a type argument.
    fn is_compound(&self) -> bool {
        matches!(self, Self::Named { args, .. } if !args.is_empty())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, args } => {
                write!(f, "{name}")?;
                for arg in args.iter() {
                    if arg.is_compound() {
                        write!(f, " ({arg})")?;
                    } else {
                        write!(f, " {arg}")?;
                    }
                }
                Ok(())
            }
            Self::Record(rt) => write!(f, "{rt}"),
        }
    }
}

impl From<RecordType> for Type {
    fn from(rt: RecordType) -> Self {
        Self::Record(rt)
    }
}

/// Handle to an interned record type.
///
/// Handles are only created by a [`TypeRegistry`](crate::registry::TypeRegistry),
/// which hands out one handle per canonical field list. Two handles compare
/// equal iff they are the same interned entry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RecordType(ByAddress<Arc<RecordTypeInner>>);

struct RecordTypeInner {
    id: usize,
    fields: Arc<[Field<Type>]>,
}

impl RecordType {
    pub(crate) fn new(id: usize, fields: Arc<[Field<Type>]>) -> Self {
        Self(ByAddress(Arc::new(RecordTypeInner { id, fields })))
    }

    /// Position of this type in its registry, in order of first observation.
    pub fn id(&self) -> usize {
        self.0.id
    }

    /// The canonical field list, sorted by name.
    pub fn fields(&self) -> &[Field<Type>] {
        &self.0.fields
    }

    pub fn len(&self) -> usize {
        self.0.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.fields.is_empty()
    }

    pub fn field_index(&self, name: &FieldName) -> Option<usize> {
        self.fields()
            .binary_search_by(|field| field.name.cmp(name))
            .ok()
    }

    pub fn field(&self, name: &FieldName) -> Option<&Type> {
        self.field_index(name).map(|i| &self.fields()[i].value)
    }

    pub fn names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields().iter().map(|field| &field.name)
    }

    /// A tuple is a non-empty record whose field names are positions.
    pub fn is_tuple(&self) -> bool {
        !self.is_empty() && self.names().all(FieldName::is_position)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_tuple() && self.len() > 1 {
            write!(f, "(")?;
            for (i, field) in self.fields().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", field.value)?;
            }
            return write!(f, ")");
        }
        write!(f, "{{")?;
        for (i, field) in self.fields().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}::{}", field.name, field.value)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {self}", self.id())
    }
}
