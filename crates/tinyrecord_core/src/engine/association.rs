//! Association accessors resolved against storage on every call.

use crate::model::error::{RecordError, RecordResult};
use crate::model::record::Record;
use crate::model::record_type::{Association, AssociationKind};
use crate::model::registry::Registry;
use crate::model::value::Value;
use crate::store::StorageBackend;
use log::debug;

impl Record {
    /// Resolves a belongs-to association.
    ///
    /// `Ok(None)` when the foreign key is `Null`; `RelatedNotFound` when it
    /// is set but no related row exists.
    pub fn belongs_to<S: StorageBackend + ?Sized>(
        &self,
        registry: &Registry,
        store: &S,
        name: &str,
    ) -> RecordResult<Option<Record>> {
        let association = self.association_of_kind(name, AssociationKind::BelongsTo)?;

        let related_id = match self.get(&association.foreign_key)? {
            Value::Null => return Ok(None),
            Value::Integer(id) => *id,
            other => {
                return Err(RecordError::InvalidForeignKey {
                    column: association.foreign_key.clone(),
                    kind: other.kind(),
                });
            }
        };

        let related_type = registry.record_type(&association.related_type)?;
        let related = related_type
            .find(store, related_id)?
            .into_iter()
            .next()
            .ok_or_else(|| RecordError::RelatedNotFound {
                record_type: related_type.name().to_string(),
                id: related_id,
            })?;

        debug!(
            "event=association_resolve module=engine status=ok type={} association={name} kind=belongs_to related_id={related_id}",
            self.record_type().name()
        );
        Ok(Some(related))
    }

    /// Resolves a has-many association in storage order.
    ///
    /// An unsaved owner has no related rows.
    pub fn has_many<S: StorageBackend + ?Sized>(
        &self,
        registry: &Registry,
        store: &S,
        name: &str,
    ) -> RecordResult<Vec<Record>> {
        let association = self.association_of_kind(name, AssociationKind::HasMany)?;
        let related_type = registry.record_type(&association.related_type)?;

        let Some(owner_id) = self.id() else {
            return Ok(Vec::new());
        };

        let related = related_type.filter(
            store,
            [(association.foreign_key.as_str(), Value::Integer(owner_id))],
        )?;

        debug!(
            "event=association_resolve module=engine status=ok type={} association={name} kind=has_many rows={}",
            self.record_type().name(),
            related.len()
        );
        Ok(related)
    }

    fn association_of_kind(
        &self,
        name: &str,
        kind: AssociationKind,
    ) -> RecordResult<&Association> {
        self.record_type()
            .association(name)
            .filter(|association| association.kind == kind)
            .ok_or_else(|| RecordError::UnknownAssociation {
                record_type: self.record_type().name().to_string(),
                association: name.to_string(),
            })
    }
}
