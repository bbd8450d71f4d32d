//! Type-level lookups: `find`, `filter`, `all`, `count`, `first`.

use crate::model::error::RecordResult;
use crate::model::record::Record;
use crate::model::record_type::RecordType;
use crate::model::value::{RecordId, Value};
use crate::store::{StorageBackend, StoredRow};
use log::debug;
use std::sync::Arc;
use std::time::Instant;

impl RecordType {
    /// Looks up one row by id.
    ///
    /// Returns zero or one record so callers treat every lookup alike.
    pub fn find<S: StorageBackend + ?Sized>(
        self: &Arc<Self>,
        store: &S,
        id: RecordId,
    ) -> RecordResult<Vec<Record>> {
        let started_at = Instant::now();
        let rows: Vec<StoredRow> = store
            .select_by_id(self.table_name(), id)?
            .into_iter()
            .collect();
        Ok(self.materialize("find", rows, started_at))
    }

    /// Returns every row whose columns equal all given values, in storage
    /// order. Unregistered columns fail with `UnknownColumn`.
    pub fn filter<S, I, K, V>(self: &Arc<Self>, store: &S, predicate: I) -> RecordResult<Vec<Record>>
    where
        S: StorageBackend + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let predicate = self.predicate_row(predicate)?;
        let started_at = Instant::now();
        let rows = store.select_where(self.table_name(), &predicate)?;
        Ok(self.materialize("filter", rows, started_at))
    }

    /// Returns every row of the type's table, in storage order.
    pub fn all<S: StorageBackend + ?Sized>(self: &Arc<Self>, store: &S) -> RecordResult<Vec<Record>> {
        let started_at = Instant::now();
        let rows = store.select_all(self.table_name())?;
        Ok(self.materialize("all", rows, started_at))
    }

    /// Row count of the type's table, answered by the backend.
    pub fn count<S: StorageBackend + ?Sized>(self: &Arc<Self>, store: &S) -> RecordResult<usize> {
        Ok(store.count(self.table_name())?)
    }

    /// First row in storage order, if any.
    pub fn first<S: StorageBackend + ?Sized>(
        self: &Arc<Self>,
        store: &S,
    ) -> RecordResult<Option<Record>> {
        Ok(self.all(store)?.into_iter().next())
    }

    fn materialize(
        self: &Arc<Self>,
        operation: &str,
        rows: Vec<StoredRow>,
        started_at: Instant,
    ) -> Vec<Record> {
        let records: Vec<Record> = rows
            .into_iter()
            .map(|row| Record::from_stored(self, row))
            .collect();
        debug!(
            "event=record_query module=engine status=ok type={} op={operation} rows={} duration_ms={}",
            self.name(),
            records.len(),
            started_at.elapsed().as_millis()
        );
        records
    }
}
