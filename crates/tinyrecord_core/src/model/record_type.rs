//! Record type metadata: columns, associations and declaration options.
//!
//! # Invariants
//! - A `RecordType` only exists in finalized form; its columns and
//!   associations never change after construction.
//! - `columns` mirrors the backing table's schema, `id` included.
//! - Association names are unique per record type.

use crate::model::error::{RecordError, RecordResult};
use crate::model::inflect;
use crate::model::record::Record;
use crate::model::value::Value;
use crate::store::{Row, ID_COLUMN};
use std::sync::Arc;

/// Options for a belongs-to declaration.
///
/// Defaults: foreign key `<name>_id` on the declaring type, related type
/// named by the PascalCase association name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BelongsTo {
    foreign_key: Option<String>,
    class_name: Option<String>,
}

impl BelongsTo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = Some(column.into());
        self
    }

    /// Overrides the related type, e.g. `sender` pointing at `User`.
    pub fn class_name(mut self, type_name: impl Into<String>) -> Self {
        self.class_name = Some(type_name.into());
        self
    }
}

/// Options for a has-many declaration.
///
/// Defaults: foreign key `<owner_type>_id` on the related type, related
/// type named by the singular PascalCase association name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HasMany {
    foreign_key: Option<String>,
    class_name: Option<String>,
}

impl HasMany {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = Some(column.into());
        self
    }

    pub fn class_name(mut self, type_name: impl Into<String>) -> Self {
        self.class_name = Some(type_name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// Foreign key lives on the declaring type.
    BelongsTo,
    /// Foreign key lives on the related type.
    HasMany,
}

/// Declared relationship with every default already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub name: String,
    pub kind: AssociationKind,
    pub foreign_key: String,
    pub related_type: String,
}

impl Association {
    pub(crate) fn belongs_to(name: &str, options: BelongsTo) -> Self {
        Self {
            name: name.to_string(),
            kind: AssociationKind::BelongsTo,
            foreign_key: options
                .foreign_key
                .unwrap_or_else(|| inflect::foreign_key_for(name)),
            related_type: options
                .class_name
                .unwrap_or_else(|| inflect::class_name_for(name)),
        }
    }

    pub(crate) fn has_many(owner_type: &str, name: &str, options: HasMany) -> Self {
        Self {
            name: name.to_string(),
            kind: AssociationKind::HasMany,
            foreign_key: options
                .foreign_key
                .unwrap_or_else(|| inflect::foreign_key_for(owner_type)),
            related_type: options
                .class_name
                .unwrap_or_else(|| inflect::class_name_for_collection(name)),
        }
    }
}

/// A finalized record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    name: String,
    table_name: String,
    columns: Vec<String>,
    associations: Vec<Association>,
}

impl RecordType {
    pub(crate) fn new(
        name: String,
        table_name: String,
        columns: Vec<String>,
        associations: Vec<Association>,
    ) -> Self {
        Self {
            name,
            table_name,
            columns,
            associations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Ordered column names, `id` included.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|known| known == column)
    }

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations
            .iter()
            .find(|association| association.name == name)
    }

    /// Returns a new, unsaved record with every attribute `Null`.
    pub fn build(self: &Arc<Self>) -> Record {
        let values = self
            .columns
            .iter()
            .map(|column| (column.clone(), Value::Null))
            .collect();
        Record::from_parts(Arc::clone(self), values)
    }

    /// Constructs an unsaved record from initial attributes.
    ///
    /// Unknown columns are rejected with `UnknownColumn`; `id` is rejected
    /// with `ReadOnlyColumn` since identity is assigned by `save`.
    pub fn new_record<I, K, V>(self: &Arc<Self>, attributes: I) -> RecordResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut record = self.build();
        for (column, value) in attributes {
            record.set(column.as_ref(), value)?;
        }
        Ok(record)
    }

    /// Checks that every predicate key is a registered column.
    pub(crate) fn predicate_row<I, K, V>(&self, predicate: I) -> RecordResult<Row>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut row = Row::new();
        for (column, value) in predicate {
            let column = column.as_ref();
            if !self.has_column(column) {
                return Err(self.unknown_column(column));
            }
            row.insert(column.to_string(), value.into());
        }
        Ok(row)
    }

    pub(crate) fn unknown_column(&self, column: &str) -> RecordError {
        RecordError::UnknownColumn {
            record_type: self.name.clone(),
            column: column.to_string(),
        }
    }

    pub(crate) fn has_id_column(&self) -> bool {
        self.has_column(ID_COLUMN)
    }
}
