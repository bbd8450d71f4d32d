//! In-memory record instances.
//!
//! # Invariants
//! - The attribute map's key set always equals the record type's columns.
//! - `id` is `Null` until the first successful save and never changes after.
//! - Setters only touch memory; storage is written by `save` alone.

use crate::model::error::{RecordError, RecordResult};
use crate::model::record_type::RecordType;
use crate::model::value::{RecordId, Value};
use crate::store::{Row, StoredRow, ID_COLUMN};
use std::sync::Arc;

/// One row of a record type, held as an owned copy of its attributes.
#[derive(Debug, Clone)]
pub struct Record {
    record_type: Arc<RecordType>,
    values: Row,
}

impl Record {
    pub(crate) fn from_parts(record_type: Arc<RecordType>, values: Row) -> Self {
        Self {
            record_type,
            values,
        }
    }

    /// Materializes a stored row. Registered columns absent from the row
    /// read as `Null`; columns unknown to the record type are dropped.
    pub(crate) fn from_stored(record_type: &Arc<RecordType>, mut stored: StoredRow) -> Self {
        let values = record_type
            .columns()
            .iter()
            .map(|column| {
                let value = if column == ID_COLUMN {
                    Value::Integer(stored.id)
                } else {
                    stored.values.remove(column).unwrap_or_default()
                };
                (column.clone(), value)
            })
            .collect();
        Self::from_parts(Arc::clone(record_type), values)
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn id(&self) -> Option<RecordId> {
        self.values.get(ID_COLUMN).and_then(Value::as_i64)
    }

    pub fn is_new_record(&self) -> bool {
        self.id().is_none()
    }

    /// Full current attribute mapping, `id` included.
    pub fn attributes(&self) -> &Row {
        &self.values
    }

    pub fn get(&self, column: &str) -> RecordResult<&Value> {
        self.values
            .get(column)
            .ok_or_else(|| self.record_type.unknown_column(column))
    }

    /// Writes one attribute in memory. `id` is read-only.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> RecordResult<()> {
        if column == ID_COLUMN {
            return Err(RecordError::ReadOnlyColumn(column.to_string()));
        }
        match self.values.get_mut(column) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(self.record_type.unknown_column(column)),
        }
    }

    /// Text attribute; `Ok(None)` when the column is `Null`.
    pub fn get_str(&self, column: &str) -> RecordResult<Option<&str>> {
        match self.get(column)? {
            Value::Null => Ok(None),
            Value::Text(value) => Ok(Some(value.as_str())),
            other => Err(type_mismatch(column, "text", other)),
        }
    }

    /// Integer attribute; `Ok(None)` when the column is `Null`.
    pub fn get_i64(&self, column: &str) -> RecordResult<Option<i64>> {
        match self.get(column)? {
            Value::Null => Ok(None),
            Value::Integer(value) => Ok(Some(*value)),
            other => Err(type_mismatch(column, "integer", other)),
        }
    }

    /// Attributes sent to storage on save: every column except `id`.
    pub(crate) fn writable_values(&self) -> Row {
        self.values
            .iter()
            .filter(|(column, _)| column.as_str() != ID_COLUMN)
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect()
    }

    pub(crate) fn assign_id(&mut self, id: RecordId) {
        self.values.insert(ID_COLUMN.to_string(), Value::Integer(id));
    }

    pub(crate) fn replace_values(&mut self, other: Record) {
        self.values = other.values;
    }
}

/// Records compare by type name and attributes.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.record_type.name() == other.record_type.name() && self.values == other.values
    }
}

fn type_mismatch(column: &str, expected: &'static str, actual: &Value) -> RecordError {
    RecordError::TypeMismatch {
        column: column.to_string(),
        expected,
        actual: actual.kind(),
    }
}
