//! Record session: registry plus storage handle behind one API.
//!
//! # Responsibility
//! - Expose the record surface by type name for callers that do not hold
//!   `Arc<RecordType>` handles.
//! - Bridge typed `Entity` wrappers to generic records.
//!
//! # Invariants
//! - The session never caches records or association results.
//! - Every storage call goes through the borrowed backend.

use crate::model::entity::Entity;
use crate::model::error::RecordResult;
use crate::model::record::Record;
use crate::model::record_type::RecordType;
use crate::model::registry::Registry;
use crate::model::value::{RecordId, Value};
use crate::store::StorageBackend;
use std::sync::Arc;

/// Borrowed registry and storage backend used together.
pub struct Session<'a, S: StorageBackend + ?Sized> {
    registry: &'a Registry,
    store: &'a S,
}

impl<'a, S: StorageBackend + ?Sized> Session<'a, S> {
    pub fn new(registry: &'a Registry, store: &'a S) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    pub fn record_type(&self, type_name: &str) -> RecordResult<Arc<RecordType>> {
        self.registry.record_type(type_name)
    }

    /// Column names of a finalized type, `id` included.
    pub fn columns(&self, type_name: &str) -> RecordResult<Vec<String>> {
        Ok(self.record_type(type_name)?.columns().to_vec())
    }

    pub fn new_record<I, K, V>(&self, type_name: &str, attributes: I) -> RecordResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.record_type(type_name)?.new_record(attributes)
    }

    pub fn find(&self, type_name: &str, id: RecordId) -> RecordResult<Vec<Record>> {
        self.record_type(type_name)?.find(self.store, id)
    }

    pub fn filter<I, K, V>(&self, type_name: &str, predicate: I) -> RecordResult<Vec<Record>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.record_type(type_name)?.filter(self.store, predicate)
    }

    pub fn all(&self, type_name: &str) -> RecordResult<Vec<Record>> {
        self.record_type(type_name)?.all(self.store)
    }

    pub fn count(&self, type_name: &str) -> RecordResult<usize> {
        self.record_type(type_name)?.count(self.store)
    }

    pub fn save(&self, record: &mut Record) -> RecordResult<RecordId> {
        record.save(self.store)
    }

    pub fn reload(&self, record: &mut Record) -> RecordResult<()> {
        record.reload(self.store)
    }

    pub fn belongs_to(&self, record: &Record, name: &str) -> RecordResult<Option<Record>> {
        record.belongs_to(self.registry, self.store, name)
    }

    pub fn has_many(&self, record: &Record, name: &str) -> RecordResult<Vec<Record>> {
        record.has_many(self.registry, self.store, name)
    }

    /// Typed `find` for an `Entity` wrapper.
    pub fn find_as<E: Entity>(&self, id: RecordId) -> RecordResult<Vec<E>> {
        Ok(self
            .find(E::TYPE_NAME, id)?
            .into_iter()
            .map(E::from_record)
            .collect())
    }

    /// Typed `filter` for an `Entity` wrapper.
    pub fn filter_as<E, I, K, V>(&self, predicate: I) -> RecordResult<Vec<E>>
    where
        E: Entity,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        Ok(self
            .filter(E::TYPE_NAME, predicate)?
            .into_iter()
            .map(E::from_record)
            .collect())
    }

    /// Typed `all` for an `Entity` wrapper.
    pub fn all_as<E: Entity>(&self) -> RecordResult<Vec<E>> {
        Ok(self
            .all(E::TYPE_NAME)?
            .into_iter()
            .map(E::from_record)
            .collect())
    }

    /// Builds an unsaved typed wrapper.
    pub fn new_entity<E, I, K, V>(&self, attributes: I) -> RecordResult<E>
    where
        E: Entity,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.new_record(E::TYPE_NAME, attributes).map(E::from_record)
    }
}
