mod common;

use common::{chat_connection, chat_registry, seeded_store};
use tinyrecord_core::{BelongsTo, HasMany, RecordError, Registry};

#[test]
fn message_belongs_to_its_author() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let registry = chat_registry(&store);
    let messages = registry.record_type("Message").unwrap();

    let nadal_message = messages
        .filter(&store, [("body", "Rafa to Roger")])
        .unwrap()
        .remove(0);
    let author = nadal_message
        .belongs_to(&registry, &store, "user")
        .unwrap()
        .unwrap();
    assert_eq!(author.get_str("username").unwrap(), Some("Rafael"));
    assert_eq!(author.record_type().name(), "User");
}

#[test]
fn conversation_has_messages_in_storage_order() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let registry = chat_registry(&store);
    let conversations = registry.record_type("Conversation").unwrap();

    let conversation = conversations.find(&store, 1).unwrap().remove(0);
    let messages = conversation
        .has_many(&registry, &store, "messages")
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].get_str("body").unwrap(), Some("Roger to Rafa"));
    assert_eq!(messages[1].get_str("body").unwrap(), Some("Rafa to Roger"));
}

#[test]
fn class_name_override_points_two_associations_at_users() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let registry = chat_registry(&store);
    let conversations = registry.record_type("Conversation").unwrap();

    let conversation = conversations.find(&store, 2).unwrap().remove(0);
    let sender = conversation
        .belongs_to(&registry, &store, "sender")
        .unwrap()
        .unwrap();
    let recipient = conversation
        .belongs_to(&registry, &store, "recipient")
        .unwrap()
        .unwrap();
    assert_eq!(sender.get_str("username").unwrap(), Some("Novak"));
    assert_eq!(recipient.get_str("username").unwrap(), Some("Rafael"));
}

#[test]
fn has_many_with_custom_foreign_key() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let registry = chat_registry(&store);
    let users = registry.record_type("User").unwrap();

    let roger = users.find(&store, 1).unwrap().remove(0);
    let started = roger
        .has_many(&registry, &store, "conversations")
        .unwrap();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].get_str("subject").unwrap(), Some("Wimbledon final"));

    let rafa = users.find(&store, 2).unwrap().remove(0);
    assert!(rafa
        .has_many(&registry, &store, "conversations")
        .unwrap()
        .is_empty());
}

#[test]
fn null_foreign_key_resolves_to_none() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let registry = chat_registry(&store);
    let messages = registry.record_type("Message").unwrap();

    let mut orphan = messages.new_record([("body", "draft")]).unwrap();
    orphan.save(&store).unwrap();

    assert!(orphan
        .belongs_to(&registry, &store, "conversation")
        .unwrap()
        .is_none());
}

#[test]
fn dangling_foreign_key_is_related_not_found() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let registry = chat_registry(&store);
    let messages = registry.record_type("Message").unwrap();

    let mut message = messages.find(&store, 3).unwrap().remove(0);
    message.set("user_id", 77).unwrap();

    let err = message.belongs_to(&registry, &store, "user").unwrap_err();
    assert!(matches!(
        err,
        RecordError::RelatedNotFound { record_type, id: 77 } if record_type == "User"
    ));
}

#[test]
fn non_integer_foreign_key_is_rejected() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let registry = chat_registry(&store);
    let messages = registry.record_type("Message").unwrap();

    let mut message = messages.find(&store, 1).unwrap().remove(0);
    message.set("user_id", "Roger").unwrap();

    let err = message.belongs_to(&registry, &store, "user").unwrap_err();
    assert!(matches!(err, RecordError::InvalidForeignKey { kind: "text", .. }));
}

#[test]
fn associations_reflect_new_rows_without_caching() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let registry = chat_registry(&store);
    let conversations = registry.record_type("Conversation").unwrap();
    let messages = registry.record_type("Message").unwrap();

    let conversation = conversations.find(&store, 1).unwrap().remove(0);
    assert_eq!(
        conversation
            .has_many(&registry, &store, "messages")
            .unwrap()
            .len(),
        2
    );

    let mut reply = messages.new_record([("body", "Roger again")]).unwrap();
    reply.set("conversation_id", 1).unwrap();
    reply.set("user_id", 1).unwrap();
    reply.save(&store).unwrap();

    let refreshed = conversation
        .has_many(&registry, &store, "messages")
        .unwrap();
    assert_eq!(refreshed.len(), 3);
    assert_eq!(refreshed[2].get_str("body").unwrap(), Some("Roger again"));
}

#[test]
fn unsaved_owner_has_no_children() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let registry = chat_registry(&store);
    let conversations = registry.record_type("Conversation").unwrap();

    let draft = conversations.build();
    assert!(draft
        .has_many(&registry, &store, "messages")
        .unwrap()
        .is_empty());
}

#[test]
fn unknown_or_mismatched_association_names_fail() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let registry = chat_registry(&store);
    let messages = registry.record_type("Message").unwrap();
    let message = messages.find(&store, 1).unwrap().remove(0);

    let err = message.has_many(&registry, &store, "user").unwrap_err();
    assert!(matches!(err, RecordError::UnknownAssociation { association, .. } if association == "user"));
    let err = message.belongs_to(&registry, &store, "likes").unwrap_err();
    assert!(matches!(err, RecordError::UnknownAssociation { .. }));
}

#[test]
fn related_type_must_be_finalized() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let mut registry = Registry::new();
    registry
        .belongs_to("Message", "user", BelongsTo::new())
        .unwrap();
    registry
        .has_many("User", "messages", HasMany::new())
        .unwrap();
    let messages = registry.finalize("Message", &store).unwrap();

    let message = messages.find(&store, 1).unwrap().remove(0);
    let err = message.belongs_to(&registry, &store, "user").unwrap_err();
    assert!(matches!(err, RecordError::NotFinalized(name) if name == "User"));
}

#[test]
fn has_many_foreign_key_missing_on_related_table_is_unknown_column() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let mut registry = Registry::new();
    registry
        .has_many("User", "messages", HasMany::new().foreign_key("author_id"))
        .unwrap();
    let users = registry.finalize("User", &store).unwrap();
    registry.finalize("Message", &store).unwrap();

    let roger = users.find(&store, 1).unwrap().remove(0);
    let err = roger.has_many(&registry, &store, "messages").unwrap_err();
    assert!(matches!(err, RecordError::UnknownColumn { column, .. } if column == "author_id"));
}

#[test]
fn text_foreign_key_is_stored_as_integer_on_save() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let registry = chat_registry(&store);
    let messages = registry.record_type("Message").unwrap();

    let mut message = messages
        .new_record([("body", "Good luck"), ("user_id", "1")])
        .unwrap();
    message.save(&store).unwrap();

    let author = message
        .belongs_to(&registry, &store, "user")
        .unwrap()
        .unwrap();
    assert_eq!(author.get_str("username").unwrap(), Some("Roger"));
}

#[test]
fn null_foreign_key_skips_related_type_lookup() {
    let conn = chat_connection();
    let store = seeded_store(&conn);
    let mut registry = Registry::new();
    registry
        .belongs_to("Message", "conversation", BelongsTo::new())
        .unwrap();
    let messages = registry.finalize("Message", &store).unwrap();

    let draft = messages.new_record([("body", "draft")]).unwrap();
    assert!(draft
        .belongs_to(&registry, &store, "conversation")
        .unwrap()
        .is_none());
}
