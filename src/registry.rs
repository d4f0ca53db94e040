//! Interned record types.
//!
//! A [`TypeRegistry`] is owned by whoever drives elaboration and lives as
//! long as the compilation or evaluation unit it serves. Entries are never
//! removed or mutated, so the only synchronization needed is around the
//! lookup-or-insert in [`TypeRegistry::intern`].

use crate::{
    canon::Canonical,
    error::DuplicateFieldError,
    types::{Field, FieldName, RecordType, Type},
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Default)]
pub struct TypeRegistry {
    types: RwLock<IndexMap<Arc<[Field<Type>]>, RecordType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for `fields`, creating it on first observation.
    /// Equal canonical lists always yield the same handle, including when
    /// interned from several threads at once.
    pub fn intern(&self, fields: Canonical<Type>) -> RecordType {
        let fields = fields.into_inner();
        if let Some(existing) = self.types.read().get(fields.as_slice()) {
            tracing::trace!(id = existing.id(), "record type already interned");
            return existing.clone();
        }

        let mut types = self.types.write();
        // Another writer may have inserted the same list between the locks.
        if let Some(existing) = types.get(fields.as_slice()) {
            return existing.clone();
        }
        let fields: Arc<[Field<Type>]> = Arc::from(fields);
        let handle = RecordType::new(types.len(), fields.clone());
        types.insert(fields, handle.clone());
        tracing::debug!(id = handle.id(), ty = %handle, "interned record type");
        handle
    }

    /// Canonicalize and intern `(name, type)` pairs.
    pub fn intern_fields(
        &self,
        fields: impl IntoIterator<Item = (FieldName, Type)>,
    ) -> Result<RecordType, DuplicateFieldError> {
        let canonical = crate::canon::canonicalize(
            fields
                .into_iter()
                .map(|(name, ty)| (Field { name, value: ty }, None)),
        )?;
        Ok(self.intern(canonical))
    }

    /// Intern the tuple type whose positions `1..=N` hold `elems`.
    pub fn tuple(&self, elems: Vec<Type>) -> RecordType {
        self.intern(Canonical::from_distinct(positional(elems)))
    }

    pub fn get(&self, id: usize) -> Option<RecordType> {
        self.types.read().get_index(id).map(|(_, ty)| ty.clone())
    }

    /// Every interned type, in order of first observation.
    pub fn types(&self) -> Vec<RecordType> {
        self.types.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

pub(crate) fn positional<T>(elems: Vec<T>) -> Vec<Field<T>> {
    (1..)
        .zip(elems)
        .map(|(pos, value)| Field {
            name: FieldName::Position(pos),
            value,
        })
        .collect()
}
