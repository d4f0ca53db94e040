//! Canonical field lists.
//!
//! A canonical list is sorted by [`FieldName`] and holds each name at most
//! once, so two literals that differ only in the order their fields were
//! written canonicalize to equal lists.

use crate::{
    ast::FieldAst,
    error::DuplicateFieldError,
    syntax::Span,
    types::{Field, FieldName},
};
use std::collections::{HashMap, hash_map::Entry};

/// A field list sorted by name with no repeated names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Canonical<T>(Vec<Field<T>>);

impl<T> Canonical<T> {
    /// Canonicalize fields whose names are known to be distinct, such as the
    /// fields of a Rust struct. Later repeats of a name are dropped.
    pub fn from_distinct(mut fields: Vec<Field<T>>) -> Self {
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        fields.dedup_by(|later, earlier| later.name == earlier.name);
        Self(fields)
    }

    pub fn as_slice(&self) -> &[Field<T>] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Field<T>> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field<T>> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &FieldName> {
        self.0.iter().map(|field| &field.name)
    }

    /// Replace every payload, keeping names and order.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Canonical<U> {
        Canonical(
            self.0
                .into_iter()
                .map(|Field { name, value }| Field {
                    name,
                    value: f(value),
                })
                .collect(),
        )
    }

    /// Like [`Canonical::map`], stopping at the first error.
    pub fn try_map<U, E>(
        self,
        mut f: impl FnMut(&FieldName, T) -> Result<U, E>,
    ) -> Result<Canonical<U>, E> {
        let mut output = Vec::with_capacity(self.0.len());
        for Field { name, value } in self.0 {
            let value = f(&name, value)?;
            output.push(Field { name, value });
        }
        Ok(Canonical(output))
    }
}

impl<'a, T> IntoIterator for &'a Canonical<T> {
    type Item = &'a Field<T>;
    type IntoIter = std::slice::Iter<'a, Field<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Sort `fields` by name, failing on the first name (in source order) that
/// occurs twice.
pub fn canonicalize<T>(
    fields: impl IntoIterator<Item = (Field<T>, Option<Span>)>,
) -> Result<Canonical<T>, DuplicateFieldError> {
    let mut seen: HashMap<FieldName, Option<Span>> = HashMap::new();
    let mut output = Vec::new();
    for (field, span) in fields {
        match seen.entry(field.name.clone()) {
            Entry::Occupied(first) => {
                return Err(DuplicateFieldError {
                    name: field.name,
                    first: *first.get(),
                    second: span,
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(span);
            }
        }
        output.push(field);
    }
    // Stable, though names are unique by now so ties cannot occur.
    output.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Canonical(output))
}

/// Canonicalize the fields of a literal, borrowing their payloads.
pub fn canonicalize_ast<T>(fields: &[FieldAst<T>]) -> Result<Canonical<&T>, DuplicateFieldError> {
    canonicalize(fields.iter().map(|field| {
        (
            Field {
                name: field.name.clone(),
                value: &field.node,
            },
            Some(field.name_span),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<(Field<usize>, Option<Span>)> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| (Field::new(*name, i), Some(Span::new(1, i + 1, i, 1))))
            .collect()
    }

    #[test]
    fn order_independent() {
        let a = canonicalize(labels(&["year", "month", "day"])).unwrap();
        let b = canonicalize(labels(&["month", "day", "year"])).unwrap();
        let names_a: Vec<_> = a.names().cloned().collect();
        let names_b: Vec<_> = b.names().cloned().collect();
        assert_eq!(names_a, names_b);
        assert_eq!(
            names_a,
            vec![
                FieldName::label("day"),
                FieldName::label("month"),
                FieldName::label("year")
            ]
        );
    }

    #[test]
    fn positions_sort_numerically() {
        let fields = (1..=12u32).rev().map(|i| (Field::new(i, ()), None));
        let canonical = canonicalize(fields).unwrap();
        let positions: Vec<_> = canonical.names().cloned().collect();
        assert_eq!(positions, (1..=12u32).map(FieldName::Position).collect::<Vec<_>>());
    }

    #[test]
    fn duplicate_reports_both_occurrences() {
        let err = canonicalize(labels(&["a", "b", "b", "a"])).unwrap_err();
        assert_eq!(err.name, FieldName::label("b"));
        assert_eq!(err.first.map(|s| s.offset), Some(1));
        assert_eq!(err.second.map(|s| s.offset), Some(2));
    }

    #[test]
    fn empty_is_canonical() {
        let canonical = canonicalize(Vec::<(Field<()>, Option<Span>)>::new()).unwrap();
        assert!(canonical.is_empty());
    }

    #[test]
    fn from_distinct_sorts() {
        let canonical = Canonical::from_distinct(vec![Field::new("b", 2), Field::new("a", 1)]);
        assert_eq!(canonical.as_slice()[0], Field::new("a", 1));
    }
}
