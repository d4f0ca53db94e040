mod common;

use common::{GAGARIN, PERSON, assert_rejected, gagarin, lens, record_type, record_value, value};
use structrec::{
    ElaborateError, Error, FieldName, Type, TypeRegistry, Value,
    elaborate::{elaborate_type, elaborate_value},
    parse_lens_path, parse_record_type, parse_record_value,
};

#[test]
fn gagarin_birthday() {
    let registry = TypeRegistry::new();
    let (person, yuri) = gagarin(&registry);
    let year = lens(&person, "birthday.year");
    assert_eq!(year.get(&yuri).unwrap(), &Value::Int(1934));

    let older = year.set(&yuri, Value::Int(1935)).unwrap();
    assert_eq!(year.get(&older).unwrap(), &Value::Int(1935));

    let expected = record_value(
        &registry,
        &GAGARIN.replace("year = 1934", "year = 1935"),
        Some(&person),
    );
    assert_eq!(older, Value::Record(expected));
    assert_ne!(older, yuri);
}

#[test]
fn order_of_fields_does_not_matter() {
    let registry = TypeRegistry::new();
    let a = value(&registry, "{year=1958, month=1, day=18}");
    let b = value(&registry, "{month=1, day=18, year=1958}");
    assert_eq!(a, b);

    let xy = record_type(&registry, "{x::Int, y::Int}");
    let yx = record_type(&registry, "{y::Int, x::Int}");
    assert_eq!(xy, yx);
}

#[test]
fn literal_and_declared_types_intern_together() {
    let registry = TypeRegistry::new();
    let person = record_type(&registry, PERSON);
    let inferred = record_value(&registry, GAGARIN, None);
    assert_eq!(inferred.record_type(), &person);
    // Person, its birthday and its country.
    assert_eq!(registry.len(), 3);
}

#[test]
fn field_names_are_scoped_to_their_record() {
    let registry = TypeRegistry::new();
    let (person, yuri) = gagarin(&registry);
    let name = lens(&person, "name");
    let country_name = lens(&person, "country.name");
    assert_eq!(name.get(&yuri).unwrap(), &Value::from("Yuri Gagarin"));
    assert_eq!(country_name.get(&yuri).unwrap(), &Value::from("Soviet Union"));

    let renamed = country_name.set(&yuri, Value::from("USSR")).unwrap();
    assert_eq!(name.get(&renamed).unwrap(), &Value::from("Yuri Gagarin"));
}

#[test]
fn tuples_are_records_named_by_position() {
    let registry = TypeRegistry::new();
    let tuple = value(&registry, "(1, 18, 1958)");
    let record = value(&registry, "{1 = 1, 2 = 18, 3 = 1958}");
    assert_eq!(tuple, record);
    assert_eq!(tuple.to_string(), "(1, 18, 1958)");

    let ty = tuple.as_record().unwrap().record_type().clone();
    assert_eq!(ty, record_type(&registry, "(Int, Int, Int)"));
    for path in ["1", "2", "3"] {
        let field = lens(&ty, path);
        assert_eq!(field.get(&tuple).unwrap(), field.get(&record).unwrap());
        assert_eq!(
            field.set(&tuple, Value::Int(0)).unwrap(),
            field.set(&record, Value::Int(0)).unwrap()
        );
    }
}

#[test]
fn single_field_tuple_is_written_as_a_record() {
    let registry = TypeRegistry::new();
    let one = value(&registry, "{1 = 'a'}");
    let ty = one.as_record().unwrap().record_type().clone();
    assert!(ty.is_tuple());
    assert_eq!(lens(&ty, "1").get(&one).unwrap(), &Value::Char('a'));
}

#[test]
fn nested_tuples_in_records() {
    let registry = TypeRegistry::new();
    let ty = record_type(&registry, "{span :: (Int, Int), label :: String}");
    let value = Value::Record(record_value(
        &registry,
        r#"{label = "x", span = (3, 7)}"#,
        Some(&ty),
    ));
    let end = lens(&ty, "span.2");
    assert_eq!(end.get(&value).unwrap(), &Value::Int(7));
    let wider = end.modify(&value, |v| Value::Int(v.as_int().unwrap() * 2)).unwrap();
    assert_eq!(wider.to_string(), r#"{label = "x", span = (3, 14)}"#);
}

#[test]
fn duplicate_fields_are_rejected() {
    let registry = TypeRegistry::new();
    let err = elaborate_type(&parse_record_type("{a::Int, a::String}").unwrap(), &registry)
        .unwrap_err();
    assert_eq!(err.name, FieldName::label("a"));
    assert_eq!(err.first.map(|s| s.column), Some(2));
    assert_eq!(err.second.map(|s| s.column), Some(10));

    let err = elaborate_value(&parse_record_value("{a=1, a=2}").unwrap(), &registry, None)
        .unwrap_err();
    assert!(matches!(err, ElaborateError::DuplicateField(e) if e.name == FieldName::label("a")));

    let err = elaborate_value(
        &parse_record_value("{outer = {b = 1, b = 2}}").unwrap(),
        &registry,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, ElaborateError::DuplicateField(e) if e.name == FieldName::label("b")));
}

#[test]
fn int_literals_widen_to_double() {
    let registry = TypeRegistry::new();
    let point = record_type(&registry, "{x :: Double, y :: Double}");
    let origin = record_value(&registry, "{x = 0, y = -1}", Some(&point));
    assert_eq!(origin.get(&"y".into()), Some(&Value::from(-1.0)));

    let err = elaborate_value(
        &parse_record_value("{x = 1.5, y = 2}").unwrap(),
        &registry,
        Some(&record_type(&registry, "{x :: Int, y :: Int}")),
    )
    .unwrap_err();
    let Error::TypeMismatch(err) = Error::from(err) else {
        panic!("expected a type mismatch");
    };
    assert_eq!((err.expected, err.found), (Type::int(), Type::double()));
}

#[test]
fn unit_record() {
    let registry = TypeRegistry::new();
    let unit = record_type(&registry, "{}");
    assert!(unit.is_empty() && !unit.is_tuple());
    let value = value(&registry, "{}");
    assert_eq!(value.to_string(), "{}");
    assert_eq!(value.as_record().unwrap().record_type(), &unit);
}

assert_rejected!(missing_brace, parse_record_value, "{a = 1");
assert_rejected!(unit_tuple, parse_record_value, "()");
assert_rejected!(trailing_comma, parse_record_type, "{a :: Int,}");
assert_rejected!(mixed_names, parse_record_type, "{a :: Int, 2 :: Int}");
assert_rejected!(tuple_gap, parse_record_type, "{1 :: Int, 3 :: Int}");
assert_rejected!(path_with_spaces, parse_lens_path, "birthday . year");
assert_rejected!(path_with_brackets, parse_lens_path, "items[0]");
