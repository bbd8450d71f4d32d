//! Query, persistence and association resolution over a storage backend.
//!
//! # Responsibility
//! - Translate id and attribute lookups into storage calls and materialize
//!   the resulting rows as records.
//! - Decide insert versus update on save.
//! - Resolve associations lazily on every access.
//!
//! # Invariants
//! - Lookups that match nothing return an empty sequence, never an error.
//! - Storage is only written by `Record::save`.
//! - Association results are never cached on the record.

mod association;
mod persist;
mod query;
