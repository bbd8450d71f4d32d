//! SQLite-backed storage backend.
//!
//! # Responsibility
//! - Translate row CRUD calls into parameterized SQL over one connection.
//! - Discover table columns from the live schema.
//!
//! # Invariants
//! - Identifiers are validated and double-quoted before interpolation;
//!   values are always bound parameters.
//! - Tables must declare `id INTEGER PRIMARY KEY` (AUTOINCREMENT keeps ids
//!   unique across resets).

use super::{
    validate_identifier, Row, StorageBackend, StoreError, StoreResult, StoredRow, ID_COLUMN,
};
use crate::model::value::{RecordId, Value};
use log::{debug, info};
use rusqlite::{params_from_iter, Connection, Params, Row as SqlRow};
use std::time::Instant;

/// Storage backend over a migrated SQLite connection.
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
    seed_sql: Option<String>,
}

impl<'conn> SqliteStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            seed_sql: None,
        }
    }

    /// Creates a store whose `reset()` replays `seed_sql` after clearing.
    pub fn with_seed(conn: &'conn Connection, seed_sql: impl Into<String>) -> Self {
        Self {
            conn,
            seed_sql: Some(seed_sql.into()),
        }
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    fn table_exists(&self, table: &str) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn user_tables(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name
             FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name ASC;",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Validates `table` and every key of `values` against the live schema.
    fn check_columns(&self, table: &str, values: &Row) -> StoreResult<()> {
        let columns = self.columns_of(table)?;
        for column in values.keys() {
            validate_identifier(column)?;
            if !columns.iter().any(|known| known == column) {
                return Err(StoreError::UnknownColumn {
                    table: table.to_string(),
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }

    fn query_rows<P: Params>(&self, sql: &str, params: P) -> StoreResult<Vec<StoredRow>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut rows = stmt.query(params)?;
        let mut stored = Vec::new();

        while let Some(row) = rows.next()? {
            stored.push(parse_stored_row(row, &names)?);
        }

        Ok(stored)
    }
}

impl StorageBackend for SqliteStore<'_> {
    fn reset(&self) -> StoreResult<()> {
        let started_at = Instant::now();
        let tables = self.user_tables()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch("PRAGMA defer_foreign_keys = ON;")?;
        for table in &tables {
            validate_identifier(table)?;
            tx.execute(&format!("DELETE FROM {};", quote(table)), [])?;
        }
        if self.table_exists("sqlite_sequence")? {
            tx.execute("DELETE FROM sqlite_sequence;", [])?;
        }
        if let Some(seed_sql) = &self.seed_sql {
            tx.execute_batch(seed_sql)?;
        }
        tx.commit()?;

        info!(
            "event=store_reset module=store status=ok backend=sqlite tables={} seeded={} duration_ms={}",
            tables.len(),
            self.seed_sql.is_some(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn insert(&self, table: &str, values: &Row) -> StoreResult<RecordId> {
        self.check_columns(table, values)?;

        let sql = if values.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES;", quote(table))
        } else {
            let columns = values.keys().map(|column| quote(column)).collect::<Vec<_>>();
            let placeholders = (1..=values.len())
                .map(|index| format!("?{index}"))
                .collect::<Vec<_>>();
            format!(
                "INSERT INTO {} ({}) VALUES ({});",
                quote(table),
                columns.join(", "),
                placeholders.join(", ")
            )
        };

        self.conn.execute(&sql, params_from_iter(values.values()))?;
        let id = self.conn.last_insert_rowid();
        debug!("event=row_insert module=store status=ok table={table} id={id}");
        Ok(id)
    }

    fn update(&self, table: &str, id: RecordId, values: &Row) -> StoreResult<()> {
        self.check_columns(table, values)?;

        if values.is_empty() {
            return match self.select_by_id(table, id)? {
                Some(_) => Ok(()),
                None => Err(StoreError::RowNotFound {
                    table: table.to_string(),
                    id,
                }),
            };
        }

        let assignments = values
            .keys()
            .enumerate()
            .map(|(index, column)| format!("{} = ?{}", quote(column), index + 1))
            .collect::<Vec<_>>();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{};",
            quote(table),
            assignments.join(", "),
            quote(ID_COLUMN),
            values.len() + 1
        );

        let mut bind_values: Vec<Value> = values.values().cloned().collect();
        bind_values.push(Value::Integer(id));
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;

        if changed == 0 {
            return Err(StoreError::RowNotFound {
                table: table.to_string(),
                id,
            });
        }

        debug!("event=row_update module=store status=ok table={table} id={id}");
        Ok(())
    }

    fn select_all(&self, table: &str) -> StoreResult<Vec<StoredRow>> {
        self.select_where(table, &Row::new())
    }

    fn count(&self, table: &str) -> StoreResult<usize> {
        self.columns_of(table)?;
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", quote(table)),
            [],
            |row| row.get::<_, usize>(0),
        )?;
        Ok(count)
    }

    fn select_by_id(&self, table: &str, id: RecordId) -> StoreResult<Option<StoredRow>> {
        let mut predicate = Row::new();
        predicate.insert(ID_COLUMN.to_string(), Value::Integer(id));
        Ok(self.select_where(table, &predicate)?.into_iter().next())
    }

    fn select_where(&self, table: &str, predicate: &Row) -> StoreResult<Vec<StoredRow>> {
        self.check_columns(table, predicate)?;

        let mut sql = format!("SELECT * FROM {} WHERE 1 = 1", quote(table));
        let mut bind_values: Vec<&Value> = Vec::new();
        for (column, value) in predicate {
            if value.is_null() {
                sql.push_str(&format!(" AND {} IS NULL", quote(column)));
            } else {
                bind_values.push(value);
                sql.push_str(&format!(" AND {} = ?{}", quote(column), bind_values.len()));
            }
        }
        sql.push_str(&format!(" ORDER BY {} ASC;", quote(ID_COLUMN)));

        self.query_rows(&sql, params_from_iter(bind_values))
    }

    fn columns_of(&self, table: &str) -> StoreResult<Vec<String>> {
        validate_identifier(table)?;
        if !self.table_exists(table)? {
            return Err(StoreError::MissingTable(table.to_string()));
        }

        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({});", quote(table)))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{identifier}\"")
}

fn parse_stored_row(row: &SqlRow<'_>, names: &[String]) -> StoreResult<StoredRow> {
    let mut id = None;
    let mut values = Row::new();

    for (index, name) in names.iter().enumerate() {
        let value: Value = row.get(index)?;
        if name == ID_COLUMN {
            id = Some(value.as_i64().ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "non-integer id `{value}` ({})",
                    value.kind()
                ))
            })?);
        } else {
            values.insert(name.clone(), value);
        }
    }

    let id = id.ok_or_else(|| StoreError::InvalidData("row has no `id` column".to_string()))?;
    Ok(StoredRow { id, values })
}
