//! Helpers shared by the integration tests
#![allow(dead_code)]

use structrec::{
    Lens, RecordType, RecordValue, Type, TypeRegistry, Value, derive_lens_str,
    elaborate::{elaborate_type, elaborate_value},
    parse_record_type, parse_record_value,
};

pub const PERSON: &str = "{name :: String,
    birthday :: {year :: Int, month :: Int, day :: Int},
    country :: {name :: String, language :: String}}";

pub const GAGARIN: &str = r#"{name = "Yuri Gagarin",
    birthday = {year = 1934, month = 3, day = 9},
    country = {name = "Soviet Union", language = "Russian"}}"#;

pub fn record_type(registry: &TypeRegistry, text: &str) -> RecordType {
    let ast = parse_record_type(text).unwrap_or_else(|err| panic!("{text}: {err}"));
    elaborate_type(&ast, registry).unwrap_or_else(|err| panic!("{text}: {err}"))
}

pub fn record_value(
    registry: &TypeRegistry,
    text: &str,
    expected: Option<&RecordType>,
) -> RecordValue {
    let ast = parse_record_value(text).unwrap_or_else(|err| panic!("{text}: {err}"));
    elaborate_value(&ast, registry, expected).unwrap_or_else(|err| panic!("{text}: {err}"))
}

pub fn value(registry: &TypeRegistry, text: &str) -> Value {
    Value::Record(record_value(registry, text, None))
}

pub fn lens(ty: &RecordType, path: &str) -> Lens {
    derive_lens_str(&Type::Record(ty.clone()), path).unwrap_or_else(|err| panic!("{path}: {err}"))
}

/// The Gagarin record checked against `Person`.
pub fn gagarin(registry: &TypeRegistry) -> (RecordType, Value) {
    let person = record_type(registry, PERSON);
    let value = Value::Record(record_value(registry, GAGARIN, Some(&person)));
    (person, value)
}

/// A test that `$parse` rejects `$text`.
macro_rules! assert_rejected {
    ($name:ident, $parse:path, $text:expr) => {
        #[test]
        fn $name() {
            assert!($parse($text).is_err(), "{:?} should not parse", $text);
        }
    };
}

pub(crate) use assert_rejected;
