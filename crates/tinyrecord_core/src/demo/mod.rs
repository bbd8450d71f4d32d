//! Chat demo schema: users, conversations and messages.
//!
//! Shared by the CLI demo and the integration tests. Seed data holds three
//! users (Roger, Rafael, Novak), two conversations and three messages.

use crate::db::Migration;
use crate::model::entity::Entity;
use crate::model::error::RecordResult;
use crate::model::record::Record;
use crate::model::record_type::{BelongsTo, HasMany};
use crate::model::registry::Registry;
use crate::model::value::RecordId;
use crate::store::StorageBackend;

pub const CHAT_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_chat.sql"),
}];

pub const CHAT_SEED_SQL: &str = include_str!("seed.sql");

/// Declares and finalizes `User`, `Conversation` and `Message`.
pub fn declare_chat_types<S: StorageBackend + ?Sized>(
    registry: &mut Registry,
    store: &S,
) -> RecordResult<()> {
    registry.has_many(
        User::TYPE_NAME,
        "conversations",
        HasMany::new().foreign_key("sender_id"),
    )?;
    registry.finalize(User::TYPE_NAME, store)?;

    registry.belongs_to(
        Conversation::TYPE_NAME,
        "sender",
        BelongsTo::new().foreign_key("sender_id").class_name("User"),
    )?;
    registry.belongs_to(
        Conversation::TYPE_NAME,
        "recipient",
        BelongsTo::new()
            .foreign_key("recipient_id")
            .class_name("User"),
    )?;
    registry.has_many(Conversation::TYPE_NAME, "messages", HasMany::new())?;
    registry.finalize(Conversation::TYPE_NAME, store)?;

    registry.belongs_to(Message::TYPE_NAME, "conversation", BelongsTo::new())?;
    registry.belongs_to(Message::TYPE_NAME, "user", BelongsTo::new())?;
    registry.finalize(Message::TYPE_NAME, store)?;

    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct User(Record);

impl User {
    pub fn id(&self) -> Option<RecordId> {
        self.0.id()
    }

    pub fn username(&self) -> RecordResult<Option<&str>> {
        self.0.get_str("username")
    }

    pub fn set_username(&mut self, username: &str) -> RecordResult<()> {
        self.0.set("username", username)
    }

    pub fn email(&self) -> RecordResult<Option<&str>> {
        self.0.get_str("email")
    }
}

impl Entity for User {
    const TYPE_NAME: &'static str = "User";

    fn from_record(record: Record) -> Self {
        Self(record)
    }

    fn record(&self) -> &Record {
        &self.0
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.0
    }

    fn into_record(self) -> Record {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation(Record);

impl Conversation {
    pub fn id(&self) -> Option<RecordId> {
        self.0.id()
    }

    pub fn subject(&self) -> RecordResult<Option<&str>> {
        self.0.get_str("subject")
    }
}

impl Entity for Conversation {
    const TYPE_NAME: &'static str = "Conversation";

    fn from_record(record: Record) -> Self {
        Self(record)
    }

    fn record(&self) -> &Record {
        &self.0
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.0
    }

    fn into_record(self) -> Record {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message(Record);

impl Message {
    pub fn id(&self) -> Option<RecordId> {
        self.0.id()
    }

    pub fn body(&self) -> RecordResult<Option<&str>> {
        self.0.get_str("body")
    }

    pub fn set_body(&mut self, body: &str) -> RecordResult<()> {
        self.0.set("body", body)
    }
}

impl Entity for Message {
    const TYPE_NAME: &'static str = "Message";

    fn from_record(record: Record) -> Self {
        Self(record)
    }

    fn record(&self) -> &Record {
        &self.0
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.0
    }

    fn into_record(self) -> Record {
        self.0
    }
}
