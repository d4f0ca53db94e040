//! Conversions between Rust values and record values.
//!
//! Rust structs can opt in with `#[derive(Record)]`: named fields become
//! labels and tuple struct fields become positions.
//!
//! ```
//! use structrec::{FromValue, IntoValue, Record, TypeRegistry};
//!
//! #[derive(Debug, PartialEq, Record)]
//! struct Date {
//!     year: i64,
//!     month: i64,
//!     day: i64,
//! }
//!
//! let registry = TypeRegistry::new();
//! let value = Date { year: 1934, month: 3, day: 9 }.into_value(&registry);
//! assert_eq!(value.to_string(), "{day = 9, month = 3, year = 1934}");
//! assert_eq!(Date::from_value(&value, &registry)?, Date { year: 1934, month: 3, day: 9 });
//! # Ok::<(), structrec::Error>(())
//! ```

use crate::{
    canon::Canonical,
    error::TypeMismatchError,
    registry::TypeRegistry,
    types::{Field, FieldName, Path, RecordType, Type},
    value::{RecordValue, Value},
};

/// A Rust type with a record system counterpart.
pub trait HostType {
    fn host_type(registry: &TypeRegistry) -> Type;
}

pub trait IntoValue: HostType {
    fn into_value(self, registry: &TypeRegistry) -> Value;
}

pub trait FromValue: HostType + Sized {
    fn from_value(value: &Value, registry: &TypeRegistry) -> Result<Self, TypeMismatchError>;
}

fn mismatch<T: HostType>(value: &Value, registry: &TypeRegistry) -> TypeMismatchError {
    TypeMismatchError::new(T::host_type(registry), value.type_of())
}

macro_rules! impl_primitive {
    ( $( $host:ty => $ty:ident, $as:ident; )* ) => {
        $(
            impl HostType for $host {
                fn host_type(_: &TypeRegistry) -> Type {
                    Type::$ty()
                }
            }

            impl IntoValue for $host {
                fn into_value(self, _: &TypeRegistry) -> Value {
                    Value::from(self)
                }
            }

            impl FromValue for $host {
                fn from_value(
                    value: &Value,
                    registry: &TypeRegistry,
                ) -> Result<Self, TypeMismatchError> {
                    value
                        .$as()
                        .map(Into::into)
                        .ok_or_else(|| mismatch::<Self>(value, registry))
                }
            }
        )*
    };
}

impl_primitive! {
    i64 => int, as_int;
    f64 => double, as_float;
    bool => bool, as_bool;
    char => char, as_char;
    String => string, as_str;
}

macro_rules! impl_tuple {
    ( $( $name:ident $idx:tt $pos:literal ),+ ) => {
        impl<$( $name: HostType ),+> HostType for ( $( $name, )+ ) {
            fn host_type(registry: &TypeRegistry) -> Type {
                Type::Record(registry.tuple(vec![ $( $name::host_type(registry) ),+ ]))
            }
        }

        impl<$( $name: IntoValue ),+> IntoValue for ( $( $name, )+ ) {
            fn into_value(self, registry: &TypeRegistry) -> Value {
                struct_value(
                    registry,
                    vec![ $( (
                        FieldName::Position($pos),
                        $name::host_type(registry),
                        self.$idx.into_value(registry),
                    ) ),+ ],
                )
            }
        }

        impl<$( $name: FromValue ),+> FromValue for ( $( $name, )+ ) {
            fn from_value(value: &Value, registry: &TypeRegistry) -> Result<Self, TypeMismatchError> {
                let record = record_of::<Self>(value, registry)?;
                Ok(( $( field::<$name>(record, &FieldName::Position($pos), registry)?, )+ ))
            }
        }
    };
}

impl_tuple!(A 0 1, B 1 2);
impl_tuple!(A 0 1, B 1 2, C 2 3);
impl_tuple!(A 0 1, B 1 2, C 2 3, D 3 4);

/// Intern the record type with the given fields. Used by `#[derive(Record)]`.
#[doc(hidden)]
pub fn struct_type(registry: &TypeRegistry, fields: Vec<(FieldName, Type)>) -> RecordType {
    registry.intern(Canonical::from_distinct(
        fields
            .into_iter()
            .map(|(name, value)| Field { name, value })
            .collect(),
    ))
}

/// Build a record from `(name, type, value)` triples. Used by
/// `#[derive(Record)]`.
#[doc(hidden)]
pub fn struct_value(registry: &TypeRegistry, fields: Vec<(FieldName, Type, Value)>) -> Value {
    let (types, values): (Vec<_>, Vec<_>) = fields
        .into_iter()
        .map(|(name, ty, value)| {
            (
                Field {
                    name: name.clone(),
                    value: ty,
                },
                Field { name, value },
            )
        })
        .unzip();
    let ty = registry.intern(Canonical::from_distinct(types));
    let values = Canonical::from_distinct(values)
        .into_inner()
        .into_iter()
        .map(|field| field.value)
        .collect();
    Value::Record(RecordValue::from_parts(ty, values))
}

/// `value` as a record of `T`'s record type.
#[doc(hidden)]
pub fn record_of<'a, T: HostType>(
    value: &'a Value,
    registry: &TypeRegistry,
) -> Result<&'a RecordValue, TypeMismatchError> {
    match value {
        Value::Record(record) if T::host_type(registry).accepts(value) => Ok(record),
        _ => Err(mismatch::<T>(value, registry)),
    }
}

/// Convert the field `name` of `record`, reporting mismatches at that field.
#[doc(hidden)]
pub fn field<T: FromValue>(
    record: &RecordValue,
    name: &FieldName,
    registry: &TypeRegistry,
) -> Result<T, TypeMismatchError> {
    let at = Path::new(vec![name.clone()]);
    let value = record.get(name).ok_or_else(|| {
        TypeMismatchError::new(
            T::host_type(registry),
            Type::Record(record.record_type().clone()),
        )
        .at(at.clone())
    })?;
    T::from_value(value, registry).map_err(|err| {
        let nested = at.join(&err.at);
        err.at(nested)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_round_trip() {
        let registry = TypeRegistry::new();
        let value = "Gagarin".to_string().into_value(&registry);
        assert_eq!(String::from_value(&value, &registry).unwrap(), "Gagarin");
        assert_eq!(f64::host_type(&registry), Type::double());

        let err = i64::from_value(&value, &registry).unwrap_err();
        assert_eq!((err.expected, err.found), (Type::int(), Type::string()));
    }

    #[test]
    fn tuples_are_positional_records() {
        let registry = TypeRegistry::new();
        let value = (1i64, 'x', true).into_value(&registry);
        assert_eq!(value.to_string(), "(1, 'x', True)");
        let record = value.as_record().unwrap();
        assert!(record.record_type().is_tuple());
        assert_eq!(record.get(&FieldName::Position(2)), Some(&Value::Char('x')));
        assert_eq!(
            <(i64, char, bool)>::from_value(&value, &registry).unwrap(),
            (1, 'x', true)
        );
    }

    #[test]
    fn tuples_of_other_shapes_are_rejected() {
        let registry = TypeRegistry::new();
        let value = ((1i64, 2i64), "x".to_string()).into_value(&registry);
        let err = <((i64, i64), char)>::from_value(&value, &registry).unwrap_err();
        assert!(err.at.is_empty());
        assert_eq!(
            err.expected,
            <((i64, i64), char)>::host_type(&registry)
        );
    }
}
