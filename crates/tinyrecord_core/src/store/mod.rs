//! Storage backend contract and implementations.
//!
//! # Responsibility
//! - Define the row-level CRUD contract the mapping engine consumes.
//! - Keep SQL (or in-memory table) details out of records and queries.
//!
//! # Invariants
//! - Every row carries a unique, auto-incremented `id` per table.
//! - Multi-row reads return rows in ascending `id` order, which is insertion
//!   order.
//! - `insert`/`update` attribute maps never carry the `id` column.

use crate::db::DbError;
use crate::model::value::{RecordId, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Name of the identifier column every table carries.
pub const ID_COLUMN: &str = "id";

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Attribute mapping exchanged with the storage backend.
pub type Row = BTreeMap<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

/// One persisted row: identifier plus the non-id columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub id: RecordId,
    pub values: Row,
}

/// Storage-layer error for row reads and writes.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    MissingTable(String),
    UnknownColumn { table: String, column: String },
    RowNotFound { table: String, id: RecordId },
    /// Table or column name cannot be used as a SQL identifier.
    InvalidIdentifier(String),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingTable(table) => write!(f, "table does not exist: {table}"),
            Self::UnknownColumn { table, column } => {
                write!(f, "table `{table}` has no column `{column}`")
            }
            Self::RowNotFound { table, id } => write!(f, "row not found: {table}#{id}"),
            Self::InvalidIdentifier(name) => write!(f, "invalid identifier `{name}`"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingTable(_) => None,
            Self::UnknownColumn { .. } => None,
            Self::RowNotFound { .. } => None,
            Self::InvalidIdentifier(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row store consumed by record queries and saves.
///
/// Calls are synchronous round-trips; implementations serialize their own
/// writes.
pub trait StorageBackend {
    /// Restores every table to the seed state.
    fn reset(&self) -> StoreResult<()>;
    fn insert(&self, table: &str, values: &Row) -> StoreResult<RecordId>;
    fn update(&self, table: &str, id: RecordId, values: &Row) -> StoreResult<()>;
    fn select_all(&self, table: &str) -> StoreResult<Vec<StoredRow>>;
    /// Number of rows in `table`, without materializing them.
    fn count(&self, table: &str) -> StoreResult<usize>;
    fn select_by_id(&self, table: &str, id: RecordId) -> StoreResult<Option<StoredRow>>;
    /// Exact-match conjunction over `predicate`; an empty predicate selects
    /// every row.
    fn select_where(&self, table: &str, predicate: &Row) -> StoreResult<Vec<StoredRow>>;
    /// Ordered column names of `table`, `id` included.
    fn columns_of(&self, table: &str) -> StoreResult<Vec<String>>;
}

/// Rejects names that cannot be safely quoted into SQL text.
pub(crate) fn validate_identifier(name: &str) -> StoreResult<()> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_identifier, StoreError};

    #[test]
    fn identifiers_accept_snake_case_names() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("sender_id").is_ok());
        assert!(validate_identifier("_hidden2").is_ok());
    }

    #[test]
    fn identifiers_reject_sql_fragments() {
        for name in ["", "1users", "users; DROP TABLE users", "a\"b", "first name"] {
            let err = validate_identifier(name).unwrap_err();
            assert!(matches!(err, StoreError::InvalidIdentifier(value) if value == name));
        }
    }
}
