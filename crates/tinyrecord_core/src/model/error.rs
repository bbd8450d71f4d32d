//! Error type for record declaration, query and persistence.

use crate::model::value::RecordId;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RecordResult<T> = Result<T, RecordError>;

/// Errors surfaced by the mapping engine.
///
/// Declaration errors (`AlreadyFinalized`, `FinalizedTypeImmutable`,
/// `DuplicateAssociation`) are programming mistakes. A query that matches
/// nothing is an empty result, never an error.
#[derive(Debug)]
pub enum RecordError {
    AlreadyFinalized(String),
    FinalizedTypeImmutable(String),
    DuplicateAssociation {
        record_type: String,
        association: String,
    },
    UnknownColumn {
        record_type: String,
        column: String,
    },
    /// Belongs-to foreign key is set but the referenced row does not exist.
    RelatedNotFound {
        record_type: String,
        id: RecordId,
    },
    RowNotFound {
        table: String,
        id: RecordId,
    },
    /// Storage rejected a save; the record keeps its pre-save identity.
    Persistence(StoreError),
    /// Storage failed outside of a save (column discovery, reads).
    Store(StoreError),
    UnknownRecordType(String),
    NotFinalized(String),
    UnknownAssociation {
        record_type: String,
        association: String,
    },
    ReadOnlyColumn(String),
    /// Operation needs a stored row but the record was never saved.
    NotPersisted(String),
    InvalidForeignKey {
        column: String,
        kind: &'static str,
    },
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyFinalized(name) => write!(f, "record type `{name}` is already finalized"),
            Self::FinalizedTypeImmutable(name) => {
                write!(f, "record type `{name}` is finalized and cannot be changed")
            }
            Self::DuplicateAssociation {
                record_type,
                association,
            } => write!(
                f,
                "record type `{record_type}` already declares association `{association}`"
            ),
            Self::UnknownColumn {
                record_type,
                column,
            } => write!(f, "record type `{record_type}` has no column `{column}`"),
            Self::RelatedNotFound { record_type, id } => {
                write!(f, "related {record_type}#{id} does not exist")
            }
            Self::RowNotFound { table, id } => write!(f, "row not found: {table}#{id}"),
            Self::Persistence(err) => write!(f, "failed to persist record: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::UnknownRecordType(name) => write!(f, "unknown record type `{name}`"),
            Self::NotFinalized(name) => write!(f, "record type `{name}` is not finalized"),
            Self::UnknownAssociation {
                record_type,
                association,
            } => write!(
                f,
                "record type `{record_type}` has no association `{association}` of that kind"
            ),
            Self::ReadOnlyColumn(column) => write!(f, "column `{column}` is read-only"),
            Self::NotPersisted(name) => write!(f, "{name} record has not been saved yet"),
            Self::InvalidForeignKey { column, kind } => {
                write!(f, "foreign key `{column}` holds a {kind} value, expected integer")
            }
            Self::TypeMismatch {
                column,
                expected,
                actual,
            } => write!(f, "column `{column}` holds {actual}, expected {expected}"),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) | Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RecordError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
