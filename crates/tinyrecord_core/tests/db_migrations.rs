use rusqlite::Connection;
use tinyrecord_core::db::migrations::{current_user_version, latest_version};
use tinyrecord_core::db::{open_db, open_db_in_memory};
use tinyrecord_core::demo::CHAT_MIGRATIONS;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory(CHAT_MIGRATIONS).unwrap();

    assert_eq!(
        current_user_version(&conn).unwrap(),
        latest_version(CHAT_MIGRATIONS)
    );
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "conversations");
    assert_table_exists(&conn, "messages");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.db");

    let conn_first = open_db(&path, CHAT_MIGRATIONS).unwrap();
    conn_first
        .execute("INSERT INTO users (username) VALUES ('Andy');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path, CHAT_MIGRATIONS).unwrap();
    let users: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 1);
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
