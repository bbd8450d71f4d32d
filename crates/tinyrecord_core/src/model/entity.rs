//! Typed wrappers layered over generic records.

use crate::model::record::Record;

/// Application struct wrapping a `Record` of one registered type.
///
/// Implementors add named accessors (`username()`, `set_username(..)`)
/// that delegate to `Record::get_str`/`Record::set`.
pub trait Entity: Sized {
    /// Registry name of the wrapped record type.
    const TYPE_NAME: &'static str;

    fn from_record(record: Record) -> Self;

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    fn into_record(self) -> Record;
}
