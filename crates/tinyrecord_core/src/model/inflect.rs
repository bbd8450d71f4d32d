//! Naming conventions linking record type names, table names and keys.
//!
//! Only the regular English forms are handled; irregular plurals need an
//! explicit table name or class name on the declaration.

use convert_case::{Case, Casing};

/// `User` -> `users`, `ChatMessage` -> `chat_messages`.
pub fn table_name_for(type_name: &str) -> String {
    pluralize(&type_name.to_case(Case::Snake))
}

/// `conversation` -> `conversation_id`.
pub fn foreign_key_for(name: &str) -> String {
    format!("{}_id", name.to_case(Case::Snake))
}

/// Related type named by a belongs-to association: `sender` -> `Sender`.
pub fn class_name_for(association: &str) -> String {
    association.to_case(Case::Pascal)
}

/// Related type named by a has-many association: `messages` -> `Message`.
pub fn class_name_for_collection(association: &str) -> String {
    singularize(association).to_case(Case::Pascal)
}

pub fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        if !ends_with_vowel(stem) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if word.ends_with("ss") || word.ends_with("us") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("es") {
        if takes_es_plural(stem) {
            return stem.to_string();
        }
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

/// Whether `pluralize` would have appended "es" to `stem` rather than "s"
/// to `stem` + "e": `boxes`, `churches`, `buses` but not `caches`,
/// `houses`, `responses`.
fn takes_es_plural(stem: &str) -> bool {
    if stem.ends_with('x') || ["sh", "ss", "zz"].iter().any(|suffix| stem.ends_with(suffix)) {
        return true;
    }
    if let Some(rest) = stem.strip_suffix("ach") {
        // cache, headache vs coach, reach
        return ends_with_vowel(rest);
    }
    if stem.ends_with("ch") {
        return true;
    }
    if let Some(rest) = stem.strip_suffix("us") {
        // bus, status vs house, cause
        return !rest.is_empty() && !ends_with_vowel(rest);
    }
    false
}

fn ends_with_vowel(word: &str) -> bool {
    word.ends_with(['a', 'e', 'i', 'o', 'u'])
}
