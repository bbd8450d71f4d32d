#![allow(dead_code)]

use rusqlite::Connection;
use tinyrecord_core::db::open_db_in_memory;
use tinyrecord_core::demo::{declare_chat_types, CHAT_MIGRATIONS, CHAT_SEED_SQL};
use tinyrecord_core::{Registry, SqliteStore, StorageBackend};

/// Opens the chat schema in memory. Pair with `seeded_store`.
pub fn chat_connection() -> Connection {
    open_db_in_memory(CHAT_MIGRATIONS).unwrap()
}

/// Store reset to the three-user seed, as every test expects.
pub fn seeded_store(conn: &Connection) -> SqliteStore<'_> {
    let store = SqliteStore::with_seed(conn, CHAT_SEED_SQL);
    store.reset().unwrap();
    store
}

/// Registry with `User`, `Conversation` and `Message` finalized.
pub fn chat_registry(store: &SqliteStore<'_>) -> Registry {
    let mut registry = Registry::new();
    declare_chat_types(&mut registry, store).unwrap();
    registry
}
