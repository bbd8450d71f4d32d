//! Record type registry: declaration, finalization and lookup.
//!
//! # Responsibility
//! - Collect association declarations per record type name.
//! - Turn a declaration into an immutable `RecordType` once the backing
//!   table's columns are known.
//!
//! # Invariants
//! - `finalize` succeeds at most once per type name.
//! - Declarations on a finalized type are rejected.
//! - A failed `finalize` leaves the declaration intact for a retry.

use crate::model::error::{RecordError, RecordResult};
use crate::model::inflect;
use crate::model::record_type::{Association, AssociationKind, BelongsTo, HasMany, RecordType};
use crate::store::{StorageBackend, ID_COLUMN};
use log::{error, info};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
struct Declaration {
    table_name: Option<String>,
    associations: Vec<Association>,
}

#[derive(Debug, Clone)]
enum TypeState {
    Declaring(Declaration),
    Finalized(Arc<RecordType>),
}

/// Explicitly passed set of record types known to one application.
#[derive(Debug, Default)]
pub struct Registry {
    types: BTreeMap<String, TypeState>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a foreign key on `type_name` pointing at another type.
    pub fn belongs_to(
        &mut self,
        type_name: &str,
        name: &str,
        options: BelongsTo,
    ) -> RecordResult<()> {
        let association = Association::belongs_to(name, options);
        self.declare_association(type_name, association)
    }

    /// Declares that rows of another type point at `type_name`.
    pub fn has_many(&mut self, type_name: &str, name: &str, options: HasMany) -> RecordResult<()> {
        let association = Association::has_many(type_name, name, options);
        self.declare_association(type_name, association)
    }

    /// Overrides the conventional table name for `type_name`.
    pub fn set_table_name(&mut self, type_name: &str, table_name: &str) -> RecordResult<()> {
        self.declaration_mut(type_name)?.table_name = Some(table_name.to_string());
        Ok(())
    }

    /// Freezes `type_name`: discovers its columns from `store` and
    /// validates its belongs-to foreign keys against them.
    pub fn finalize<S: StorageBackend + ?Sized>(
        &mut self,
        type_name: &str,
        store: &S,
    ) -> RecordResult<Arc<RecordType>> {
        let declaration = match self.types.get(type_name) {
            Some(TypeState::Finalized(_)) => {
                return Err(RecordError::AlreadyFinalized(type_name.to_string()));
            }
            Some(TypeState::Declaring(declaration)) => declaration.clone(),
            None => Declaration::default(),
        };

        let started_at = Instant::now();
        let table_name = declaration
            .table_name
            .unwrap_or_else(|| inflect::table_name_for(type_name));

        let columns = match store.columns_of(&table_name) {
            Ok(columns) => columns,
            Err(err) => {
                error!(
                    "event=record_type_finalize module=registry status=error type={type_name} table={table_name} error={err}"
                );
                return Err(RecordError::Store(err));
            }
        };

        let record_type = RecordType::new(
            type_name.to_string(),
            table_name,
            columns,
            declaration.associations,
        );
        validate_record_type(&record_type)?;

        info!(
            "event=record_type_finalize module=registry status=ok type={} table={} columns={} associations={} duration_ms={}",
            record_type.name(),
            record_type.table_name(),
            record_type.columns().len(),
            record_type.associations().len(),
            started_at.elapsed().as_millis()
        );

        let record_type = Arc::new(record_type);
        self.types.insert(
            type_name.to_string(),
            TypeState::Finalized(Arc::clone(&record_type)),
        );
        Ok(record_type)
    }

    /// Returns the finalized record type registered as `type_name`.
    pub fn record_type(&self, type_name: &str) -> RecordResult<Arc<RecordType>> {
        match self.types.get(type_name) {
            Some(TypeState::Finalized(record_type)) => Ok(Arc::clone(record_type)),
            Some(TypeState::Declaring(_)) => Err(RecordError::NotFinalized(type_name.to_string())),
            None => Err(RecordError::UnknownRecordType(type_name.to_string())),
        }
    }

    pub fn is_finalized(&self, type_name: &str) -> bool {
        matches!(self.types.get(type_name), Some(TypeState::Finalized(_)))
    }

    /// Sorted names of every declared or finalized type.
    pub fn type_names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    fn declaration_mut(&mut self, type_name: &str) -> RecordResult<&mut Declaration> {
        let state = self
            .types
            .entry(type_name.to_string())
            .or_insert_with(|| TypeState::Declaring(Declaration::default()));
        match state {
            TypeState::Declaring(declaration) => Ok(declaration),
            TypeState::Finalized(_) => {
                Err(RecordError::FinalizedTypeImmutable(type_name.to_string()))
            }
        }
    }

    fn declare_association(
        &mut self,
        type_name: &str,
        association: Association,
    ) -> RecordResult<()> {
        let declaration = self.declaration_mut(type_name)?;
        if declaration
            .associations
            .iter()
            .any(|existing| existing.name == association.name)
        {
            return Err(RecordError::DuplicateAssociation {
                record_type: type_name.to_string(),
                association: association.name,
            });
        }
        declaration.associations.push(association);
        Ok(())
    }
}

fn validate_record_type(record_type: &RecordType) -> RecordResult<()> {
    if !record_type.has_id_column() {
        return Err(record_type.unknown_column(ID_COLUMN));
    }

    for association in record_type.associations() {
        if association.kind == AssociationKind::BelongsTo
            && !record_type.has_column(&association.foreign_key)
        {
            return Err(record_type.unknown_column(&association.foreign_key));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::model::error::RecordError;
    use crate::model::record_type::{BelongsTo, HasMany};
    use crate::store::MemoryStore;

    fn chat_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.define_table("users", ["username"]);
        store.define_table("messages", ["body", "user_id"]);
        store
    }

    #[test]
    fn finalize_discovers_columns_and_conventional_table() {
        let store = chat_store();
        let mut registry = Registry::new();

        let user = registry.finalize("User", &store).unwrap();
        assert_eq!(user.table_name(), "users");
        assert_eq!(user.columns(), ["id", "username"]);
        assert!(registry.is_finalized("User"));
    }

    #[test]
    fn finalize_twice_fails() {
        let store = chat_store();
        let mut registry = Registry::new();
        registry.finalize("User", &store).unwrap();

        let err = registry.finalize("User", &store).unwrap_err();
        assert!(matches!(err, RecordError::AlreadyFinalized(name) if name == "User"));
    }

    #[test]
    fn declarations_after_finalize_are_rejected() {
        let store = chat_store();
        let mut registry = Registry::new();
        registry.finalize("User", &store).unwrap();

        let err = registry
            .has_many("User", "messages", HasMany::new())
            .unwrap_err();
        assert!(matches!(err, RecordError::FinalizedTypeImmutable(name) if name == "User"));
        let err = registry.set_table_name("User", "people").unwrap_err();
        assert!(matches!(err, RecordError::FinalizedTypeImmutable(_)));
    }

    #[test]
    fn duplicate_association_names_are_rejected() {
        let mut registry = Registry::new();
        registry
            .belongs_to("Message", "user", BelongsTo::new())
            .unwrap();

        let err = registry
            .belongs_to("Message", "user", BelongsTo::new().class_name("Admin"))
            .unwrap_err();
        assert!(matches!(
            err,
            RecordError::DuplicateAssociation { record_type, association }
                if record_type == "Message" && association == "user"
        ));
    }

    #[test]
    fn belongs_to_foreign_key_must_be_a_column() {
        let store = chat_store();
        let mut registry = Registry::new();
        registry
            .belongs_to("Message", "conversation", BelongsTo::new())
            .unwrap();

        let err = registry.finalize("Message", &store).unwrap_err();
        assert!(matches!(err, RecordError::UnknownColumn { column, .. } if column == "conversation_id"));
        assert!(!registry.is_finalized("Message"));
    }

    #[test]
    fn missing_table_keeps_declaration_for_retry() {
        let store = chat_store();
        let mut registry = Registry::new();
        registry
            .has_many("Person", "messages", HasMany::new().foreign_key("user_id"))
            .unwrap();

        let err = registry.finalize("Person", &store).unwrap_err();
        assert!(matches!(err, RecordError::Store(_)));
        assert!(matches!(
            registry.record_type("Person").unwrap_err(),
            RecordError::NotFinalized(_)
        ));

        registry.set_table_name("Person", "users").unwrap();
        let person = registry.finalize("Person", &store).unwrap();
        assert_eq!(person.table_name(), "users");
        assert_eq!(person.association("messages").unwrap().foreign_key, "user_id");
    }

    #[test]
    fn has_many_defaults_name_singular_related_type() {
        let store = MemoryStore::new();
        store.define_table("surveys", ["title"]);
        store.define_table("responses", ["answer", "survey_id"]);
        let mut registry = Registry::new();
        registry
            .has_many("Survey", "responses", HasMany::new())
            .unwrap();
        registry.finalize("Response", &store).unwrap();

        let survey = registry.finalize("Survey", &store).unwrap();
        let responses = survey.association("responses").unwrap();
        assert_eq!(responses.related_type, "Response");
        assert_eq!(responses.foreign_key, "survey_id");
        assert!(registry.record_type(&responses.related_type).is_ok());
    }

    #[test]
    fn lookup_of_unknown_type_fails() {
        let registry = Registry::new();
        let err = registry.record_type("Ghost").unwrap_err();
        assert!(matches!(err, RecordError::UnknownRecordType(name) if name == "Ghost"));
    }
}
