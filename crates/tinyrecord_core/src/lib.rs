//! Minimal object-relational mapping over a row store.
//!
//! Record types are declared as data (associations plus a table whose
//! columns are discovered at finalize time), registered in an explicitly
//! passed `Registry`, and queried/saved through a `StorageBackend` handle.

pub mod db;
pub mod demo;
pub mod engine;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::Entity;
pub use model::error::{RecordError, RecordResult};
pub use model::record::Record;
pub use model::record_type::{Association, AssociationKind, BelongsTo, HasMany, RecordType};
pub use model::registry::Registry;
pub use model::value::{RecordId, Value};
pub use service::session::Session;
pub use store::{
    MemoryStore, Row, SqliteStore, StorageBackend, StoreError, StoreResult, StoredRow, ID_COLUMN,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
