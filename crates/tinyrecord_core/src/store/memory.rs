//! In-process storage backend over plain vectors.
//!
//! Useful where a SQLite file is unwanted; behaves like `SqliteStore` for
//! ordering, id assignment and error reporting.

use super::{Row, StorageBackend, StoreError, StoreResult, StoredRow, ID_COLUMN};
use crate::model::value::{RecordId, Value};
use log::info;
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<StoredRow>,
    next_id: RecordId,
}

impl MemoryTable {
    fn check_columns(&self, table: &str, values: &Row) -> StoreResult<()> {
        match values
            .keys()
            .find(|column| !self.columns.iter().any(|known| known == *column))
        {
            Some(column) => Err(StoreError::UnknownColumn {
                table: table.to_string(),
                column: column.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Fills columns missing from `values` with `Null`, dropping `id`.
    fn complete(&self, values: &Row) -> Row {
        self.columns
            .iter()
            .filter(|column| column.as_str() != ID_COLUMN)
            .map(|column| {
                let value = values.get(column).cloned().unwrap_or_default();
                (column.clone(), value)
            })
            .collect()
    }
}

/// Storage backend holding tables in memory.
///
/// Single-threaded: mutation goes through a `RefCell`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<BTreeMap<String, MemoryTable>>,
    seed: RefCell<Option<BTreeMap<String, MemoryTable>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares (or replaces) an empty table. `id` is prepended when absent.
    pub fn define_table<I, C>(&self, table: &str, columns: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let mut names: Vec<String> = columns.into_iter().map(Into::into).collect();
        if !names.iter().any(|name| name == ID_COLUMN) {
            names.insert(0, ID_COLUMN.to_string());
        }
        self.tables.borrow_mut().insert(
            table.to_string(),
            MemoryTable {
                columns: names,
                rows: Vec::new(),
                next_id: 1,
            },
        );
    }

    /// Captures the current contents as the state `reset()` restores.
    pub fn snapshot_seed(&self) {
        *self.seed.borrow_mut() = Some(self.tables.borrow().clone());
    }

    fn with_table<T>(
        &self,
        table: &str,
        f: impl FnOnce(&mut MemoryTable) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut tables = self.tables.borrow_mut();
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::MissingTable(table.to_string()))?;
        f(entry)
    }
}

impl StorageBackend for MemoryStore {
    fn reset(&self) -> StoreResult<()> {
        let mut tables = self.tables.borrow_mut();
        match self.seed.borrow().as_ref() {
            Some(seed) => *tables = seed.clone(),
            None => {
                for table in tables.values_mut() {
                    table.rows.clear();
                    table.next_id = 1;
                }
            }
        }
        info!(
            "event=store_reset module=store status=ok backend=memory tables={}",
            tables.len()
        );
        Ok(())
    }

    fn insert(&self, table: &str, values: &Row) -> StoreResult<RecordId> {
        self.with_table(table, |entry| {
            entry.check_columns(table, values)?;
            let id = entry.next_id;
            let row = StoredRow {
                id,
                values: entry.complete(values),
            };
            entry.rows.push(row);
            entry.next_id += 1;
            Ok(id)
        })
    }

    fn update(&self, table: &str, id: RecordId, values: &Row) -> StoreResult<()> {
        self.with_table(table, |entry| {
            entry.check_columns(table, values)?;
            let row = entry
                .rows
                .iter_mut()
                .find(|row| row.id == id)
                .ok_or_else(|| StoreError::RowNotFound {
                    table: table.to_string(),
                    id,
                })?;
            for (column, value) in values {
                if column != ID_COLUMN {
                    row.values.insert(column.clone(), value.clone());
                }
            }
            Ok(())
        })
    }

    fn select_all(&self, table: &str) -> StoreResult<Vec<StoredRow>> {
        self.with_table(table, |entry| Ok(entry.rows.clone()))
    }

    fn count(&self, table: &str) -> StoreResult<usize> {
        self.with_table(table, |entry| Ok(entry.rows.len()))
    }

    fn select_by_id(&self, table: &str, id: RecordId) -> StoreResult<Option<StoredRow>> {
        self.with_table(table, |entry| {
            Ok(entry.rows.iter().find(|row| row.id == id).cloned())
        })
    }

    fn select_where(&self, table: &str, predicate: &Row) -> StoreResult<Vec<StoredRow>> {
        self.with_table(table, |entry| {
            entry.check_columns(table, predicate)?;
            Ok(entry
                .rows
                .iter()
                .filter(|row| {
                    predicate.iter().all(|(column, expected)| {
                        if column == ID_COLUMN {
                            *expected == Value::Integer(row.id)
                        } else {
                            row.values.get(column) == Some(expected)
                        }
                    })
                })
                .cloned()
                .collect())
        })
    }

    fn columns_of(&self, table: &str) -> StoreResult<Vec<String>> {
        self.with_table(table, |entry| Ok(entry.columns.clone()))
    }
}
