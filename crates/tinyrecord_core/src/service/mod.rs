//! Caller-facing services over the model and storage layers.
//!
//! # Responsibility
//! - Bundle registry and storage handles into one use-case level API.
//! - Keep callers decoupled from per-type `Arc<RecordType>` plumbing.

pub mod session;
