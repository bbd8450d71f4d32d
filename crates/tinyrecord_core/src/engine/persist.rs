//! Record persistence: insert-or-update on save, explicit reload.

use crate::model::error::{RecordError, RecordResult};
use crate::model::record::Record;
use crate::model::value::RecordId;
use crate::store::{StorageBackend, StoreError};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Instant;

impl Record {
    /// Writes the record through to storage and returns its id.
    ///
    /// A record without id is inserted and receives the id assigned by
    /// storage; otherwise its row is overwritten in place. After the write
    /// the attributes are re-read, so values the backend converted (an
    /// integer stored into a text column) match what `find` returns. On a
    /// failed write the record is left untouched.
    pub fn save<S: StorageBackend + ?Sized>(&mut self, store: &S) -> RecordResult<RecordId> {
        let started_at = Instant::now();
        let record_type = Arc::clone(self.record_type());
        let table = record_type.table_name();
        let values = self.writable_values();

        let (operation, result) = match self.id() {
            None => ("insert", store.insert(table, &values)),
            Some(id) => ("update", store.update(table, id, &values).map(|()| id)),
        };

        match result {
            Ok(id) => {
                self.assign_id(id);
                self.reload(store)?;
                debug!(
                    "event=record_save module=engine status=ok type={} op={operation} id={id} duration_ms={}",
                    record_type.name(),
                    started_at.elapsed().as_millis()
                );
                Ok(id)
            }
            Err(err) => {
                warn!(
                    "event=record_save module=engine status=error type={} op={operation} error={err}",
                    record_type.name()
                );
                Err(save_error(err))
            }
        }
    }

    /// Replaces in-memory attributes with the stored row.
    pub fn reload<S: StorageBackend + ?Sized>(&mut self, store: &S) -> RecordResult<()> {
        let record_type = Arc::clone(self.record_type());
        let id = self
            .id()
            .ok_or_else(|| RecordError::NotPersisted(record_type.name().to_string()))?;

        let fresh = record_type
            .find(store, id)?
            .into_iter()
            .next()
            .ok_or_else(|| RecordError::RowNotFound {
                table: record_type.table_name().to_string(),
                id,
            })?;
        self.replace_values(fresh);
        Ok(())
    }
}

fn save_error(err: StoreError) -> RecordError {
    match err {
        StoreError::RowNotFound { table, id } => RecordError::RowNotFound { table, id },
        other => RecordError::Persistence(other),
    }
}
