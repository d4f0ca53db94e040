//! Human readable reports for the errors in [`crate::error`].

use crate::{
    error::Error,
    syntax::Span,
    types::{FieldName, Type},
};
use std::fmt;

/// Describe the field set of `ty`, e.g. `{x::Int, y::Int} has fields x, y`.
pub fn field_set(ty: &Type) -> String {
    match ty.as_record() {
        Some(record) if record.is_empty() => format!("{ty} has no fields"),
        Some(record) => format!("{ty} has fields {}", join(record.names())),
        None => format!("`{ty}` is not a record"),
    }
}

/// `field `a`` or `fields `a`, `b``.
pub fn name_list(names: &[FieldName]) -> String {
    let quoted = join(names.iter().map(|name| format!("`{name}`")));
    if names.len() == 1 {
        format!("field {quoted}")
    } else {
        format!("fields {quoted}")
    }
}

fn join<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render `error` against the text its span points into, in the style of a
/// compiler error:
///
/// ```text
/// error: unknown field `decade` in `birthday.decade`: ...
///  --> path:1:10
///   |
/// 1 | birthday.decade
///   |          ^^^^^^
///   = note: `birthday` has type {day::Int, month::Int, year::Int}
/// ```
pub fn render(error: &Error, source_name: &str, source: &str) -> String {
    Report {
        context: ErrorContext::from(error),
        source_name,
        source,
    }
    .to_string()
}

#[derive(Debug)]
struct ErrorContext {
    msg: String,
    span: Option<Span>,
    notes: Vec<String>,
}

impl From<&Error> for ErrorContext {
    fn from(error: &Error) -> Self {
        let msg = error.to_string();
        match error {
            Error::Syntax(err) => Self {
                msg,
                span: Some(err.span),
                notes: Vec::new(),
            },
            Error::DuplicateField(err) => Self {
                msg,
                span: err.second.or(err.first),
                notes: err
                    .first
                    .filter(|_| err.second.is_some())
                    .map(|first| format!("first defined at {first}"))
                    .into_iter()
                    .collect(),
            },
            Error::TypeMismatch(err) => Self {
                msg,
                span: err.span,
                notes: Vec::new(),
            },
            Error::UnknownField(err) => {
                let prefix = err.prefix();
                let note = if prefix.is_empty() {
                    format!("the lens source has type {}", err.ty)
                } else {
                    format!("`{prefix}` has type {}", err.ty)
                };
                Self {
                    msg,
                    span: err.span,
                    notes: vec![note],
                }
            }
        }
    }
}

struct Report<'a> {
    context: ErrorContext,
    source_name: &'a str,
    source: &'a str,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {}", self.context.msg)?;
        let Some(span) = self.context.span else {
            write!(f, "\n --> {}", self.source_name)?;
            return self.write_notes(f, 1);
        };

        let gutter = span.line.to_string().len();
        write!(f, "\n{:gutter$}--> {}:{span}", "", self.source_name)?;
        write!(f, "\n{:gutter$} |", "")?;

        let line = self
            .source
            .lines()
            .nth(span.line.saturating_sub(1) as usize)
            .unwrap_or_default();
        write!(f, "\n{} | {line}", span.line)?;

        // Keep tabs so the caret lines up with the source line.
        let pad: String = line
            .chars()
            .take(span.column.saturating_sub(1))
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        let width = self
            .source
            .get(span.offset..span.offset + span.len)
            .and_then(|text| text.split('\n').next())
            .map_or(0, |text| text.chars().count())
            .max(1);
        write!(f, "\n{:gutter$} | {pad}{}", "", "^".repeat(width))?;
        self.write_notes(f, gutter)
    }
}

impl Report<'_> {
    fn write_notes(&self, f: &mut fmt::Formatter<'_>, gutter: usize) -> fmt::Result {
        for note in &self.context.notes {
            write!(f, "\n{:gutter$} = note: {note}", "")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::DuplicateFieldError,
        registry::TypeRegistry,
        syntax::parse::parse_record_value,
    };

    #[test]
    fn name_lists() {
        assert_eq!(name_list(&[FieldName::label("a")]), "field `a`");
        assert_eq!(
            name_list(&[FieldName::label("a"), FieldName::Position(2)]),
            "fields `a`, `2`"
        );
    }

    #[test]
    fn field_sets() {
        let registry = TypeRegistry::new();
        let point = registry
            .intern_fields([
                (FieldName::label("y"), Type::int()),
                (FieldName::label("x"), Type::int()),
            ])
            .unwrap();
        assert_eq!(
            field_set(&point.into()),
            "{x::Int, y::Int} has fields x, y"
        );
        assert_eq!(field_set(&registry.tuple(Vec::new()).into()), "{} has no fields");
        assert_eq!(field_set(&Type::string()), "`String` is not a record");
    }

    #[test]
    fn syntax_error_points_at_the_token() {
        let source = "{a = 1,\n b = Nothing}";
        let err = parse_record_value(source).unwrap_err();
        assert_eq!(
            render(&err.into(), "<input>", source),
            "error: expected a value, found identifier `Nothing` at 2:6\n\
             \x20--> <input>:2:6\n\
             \x20 |\n\
             2 |  b = Nothing}\n\
             \x20 |      ^^^^^^^"
        );
    }

    #[test]
    fn duplicate_field_notes_first_occurrence() {
        let source = "{a = 1, a = 2}";
        let err = DuplicateFieldError {
            name: FieldName::label("a"),
            first: Some(Span::new(1, 2, 1, 1)),
            second: Some(Span::new(1, 9, 8, 1)),
        };
        let report = render(&err.into(), "<input>", source);
        assert!(report.starts_with("error: field `a` is defined more than once\n"));
        assert!(report.contains("1 | {a = 1, a = 2}\n  |         ^\n"));
        assert!(report.ends_with("  = note: first defined at 1:2"));
    }

    #[test]
    fn errors_without_spans_only_name_the_source() {
        let err = crate::error::TypeMismatchError::new(Type::int(), Type::string());
        assert_eq!(
            render(&err.into(), "<host>", ""),
            "error: type mismatch: expected Int, found String\n --> <host>"
        );
    }
}
