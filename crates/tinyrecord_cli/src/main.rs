//! CLI smoke entry point.
//!
//! Opens the chat demo database (in memory, or at the path given as the
//! first argument), resets it to the seed rows and walks the record API.
//! Set `TINYRECORD_LOG_DIR` to an absolute directory to capture core logs.

use log::error;
use std::process::ExitCode;
use tinyrecord_core::db::{open_db, open_db_in_memory};
use tinyrecord_core::demo::{declare_chat_types, CHAT_MIGRATIONS, CHAT_SEED_SQL};
use tinyrecord_core::{
    core_version, default_log_level, init_logging, Record, RecordResult, Registry, Session,
    SqliteStore, StorageBackend, Value,
};

const LOG_DIR_ENV: &str = "TINYRECORD_LOG_DIR";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("tinyrecord: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        init_logging(default_log_level(), &log_dir)?;
    }
    println!("tinyrecord_core version={}", core_version());

    let conn = match std::env::args().nth(1) {
        Some(path) => open_db(path, CHAT_MIGRATIONS)?,
        None => open_db_in_memory(CHAT_MIGRATIONS)?,
    };
    let store = SqliteStore::with_seed(&conn, CHAT_SEED_SQL);
    store.reset()?;

    let mut registry = Registry::new();
    declare_chat_types(&mut registry, &store)?;
    let session = Session::new(&registry, &store);

    println!("users.columns={}", session.columns("User")?.join(","));
    for user in session.all("User")? {
        println!("user {}", describe(&user));
    }

    let rafael = session.find("User", 2)?;
    if let Some(user) = rafael.first() {
        println!("find(2) -> {}", describe(user));
    }

    let mut andy = session.new_record("User", [("username", "Andy")])?;
    session.save(&mut andy)?;
    println!("inserted {} total={}", describe(&andy), session.count("User")?);

    for conversation in session.all("Conversation")? {
        print_conversation(&session, &conversation)?;
    }

    Ok(())
}

fn print_conversation(
    session: &Session<'_, SqliteStore<'_>>,
    conversation: &Record,
) -> RecordResult<()> {
    let sender = session.belongs_to(conversation, "sender")?;
    let recipient = session.belongs_to(conversation, "recipient")?;
    println!(
        "conversation {} from={} to={}",
        describe(conversation),
        username(sender.as_ref()),
        username(recipient.as_ref())
    );
    for message in session.has_many(conversation, "messages")? {
        println!("  message {}", describe(&message));
    }
    Ok(())
}

fn describe(record: &Record) -> String {
    record
        .attributes()
        .iter()
        .map(|(column, value)| format!("{column}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn username(user: Option<&Record>) -> String {
    user.and_then(|record| record.get("username").ok())
        .map_or_else(|| Value::Null.to_string(), Value::to_string)
}
