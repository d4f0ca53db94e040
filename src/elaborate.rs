//! Turning parsed literals into interned types and checked values.

use crate::{
    ast::{ExprAst, Literal, RecordTypeAst, RecordValueAst, TypeAst},
    canon::canonicalize_ast,
    error::{DuplicateFieldError, ElaborateError, TypeMismatchError},
    registry::TypeRegistry,
    types::{self, Path, RecordType, Type},
    value::{RecordValue, Value},
};
use tracing::{debug, instrument};

/// Canonicalize a record type literal and intern it, along with every record
/// type nested inside it.
#[instrument(level = "debug", skip_all, fields(fields = ast.fields.len()))]
pub fn elaborate_type(
    ast: &RecordTypeAst,
    registry: &TypeRegistry,
) -> Result<RecordType, DuplicateFieldError> {
    record_type(ast, registry)
}

/// Like [`elaborate_type`] for any type expression.
pub fn elaborate_type_expr(
    ast: &TypeAst,
    registry: &TypeRegistry,
) -> Result<Type, DuplicateFieldError> {
    match ast {
        TypeAst::Named { name, args, .. } => Ok(Type::applied(
            name,
            args.iter()
                .map(|arg| elaborate_type_expr(arg, registry))
                .collect::<Result<_, _>>()?,
        )),
        TypeAst::Record(record) => Ok(Type::Record(record_type(record, registry)?)),
    }
}

fn record_type(
    ast: &RecordTypeAst,
    registry: &TypeRegistry,
) -> Result<RecordType, DuplicateFieldError> {
    let fields = canonicalize_ast(&ast.fields)?.try_map(|_, ty| elaborate_type_expr(ty, registry))?;
    Ok(registry.intern(fields))
}

/// Build a record value from a literal.
///
/// With an `expected` type the literal must have exactly its fields, and
/// the result carries that type's handle. Without one the field types are
/// inferred from the field values.
#[instrument(level = "debug", skip_all, fields(fields = ast.fields.len()))]
pub fn elaborate_value(
    ast: &RecordValueAst,
    registry: &TypeRegistry,
    expected: Option<&RecordType>,
) -> Result<RecordValue, ElaborateError> {
    let expected = expected.cloned().map(Type::Record);
    record_value(ast, registry, expected.as_ref(), &mut Path::default())
}

/// Like [`elaborate_value`] for any expression, including primitive
/// literals.
pub fn elaborate_expr(
    ast: &ExprAst,
    registry: &TypeRegistry,
    expected: Option<&Type>,
) -> Result<Value, ElaborateError> {
    expr(ast, registry, expected, &mut Path::default())
}

fn expr(
    ast: &ExprAst,
    registry: &TypeRegistry,
    expected: Option<&Type>,
    at: &mut Path,
) -> Result<Value, ElaborateError> {
    match ast {
        ExprAst::Literal { literal, span } => {
            let value = literal_value(literal);
            let Some(expected) = expected else {
                return Ok(value);
            };
            if expected.accepts(&value) {
                return Ok(value);
            }
            match (literal, expected.primitive_name()) {
                (Literal::Int(i), Some(types::DOUBLE)) if i.unsigned_abs() <= MAX_EXACT_DOUBLE => {
                    Ok(Value::from(*i as f64))
                }
                _ => Err(TypeMismatchError::new(expected.clone(), value.type_of())
                    .at(at.clone())
                    .with_span(*span)
                    .into()),
            }
        }
        ExprAst::Record(record) => {
            record_value(record, registry, expected, at).map(Value::Record)
        }
    }
}

fn record_value(
    ast: &RecordValueAst,
    registry: &TypeRegistry,
    expected: Option<&Type>,
    at: &mut Path,
) -> Result<RecordValue, ElaborateError> {
    let fields = canonicalize_ast(&ast.fields)?;
    let Some(expected) = expected else {
        let values = fields.try_map(|name, node| {
            at.push(name.clone());
            let value = expr(node, registry, None, at)?;
            at.pop();
            Ok::<_, ElaborateError>(value)
        })?;
        return Ok(RecordValue::from_canonical(registry, values));
    };

    let conforms = match expected {
        Type::Record(rt) => rt.names().eq(fields.names()),
        Type::Named { .. } => false,
    };
    let (Type::Record(rt), true) = (expected, conforms) else {
        // Describe the literal's own shape without interning it in `registry`.
        let scratch = TypeRegistry::new();
        let found = record_value(ast, &scratch, None, &mut at.clone())?;
        debug!(expected = %expected, found = %found.record_type(), "record literal has the wrong fields");
        return Err(TypeMismatchError::new(
            expected.clone(),
            Type::Record(found.record_type().clone()),
        )
        .at(at.clone())
        .with_span(ast.span)
        .into());
    };

    let mut values = Vec::with_capacity(rt.len());
    for (field, declared) in fields.iter().zip(rt.fields()) {
        at.push(field.name.clone());
        values.push(expr(field.value, registry, Some(&declared.value), at)?);
        at.pop();
    }
    Ok(RecordValue::from_parts(rt.clone(), values))
}

/// Integers up to 2^53 in magnitude convert to `Double` without rounding.
const MAX_EXACT_DOUBLE: u64 = 1 << 53;

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(x) => Value::Float(*x),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Char(c) => Value::Char(*c),
        Literal::String(s) => Value::from(s.as_str()),
    }
}
