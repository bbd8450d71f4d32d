//! Record type model: values, declarations, records and the registry.
//!
//! # Responsibility
//! - Describe record types as data (columns + associations) rather than as
//!   generated code.
//! - Hold record instances as owned attribute copies.
//!
//! # Invariants
//! - Record types are immutable once finalized.
//! - Records never share mutable state with each other or with storage.

pub mod entity;
pub mod error;
pub mod inflect;
pub mod record;
pub mod record_type;
pub mod registry;
pub mod value;
