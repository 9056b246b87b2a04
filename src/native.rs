//! Dialogflow agent files: the file-set record and the typed shapes of the
//! intent, entity, sample and entry documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const INTENTS_DIR: &str = "intents";
pub const ENTITIES_DIR: &str = "entities";
pub const USER_SAYS_MARKER: &str = "_usersays_";
pub const ENTRIES_MARKER: &str = "_entries_";

/// One file of a native agent: relative path segments plus parsed JSON content.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NativeFile {
    pub path: Vec<String>,
    pub content: Value,
}

impl NativeFile {
    pub fn new(path: Vec<String>, content: Value) -> Self {
        Self { path, content }
    }

    /// `intents/<name>.json`
    pub fn intent(name: &str, content: Value) -> Self {
        Self::new(
            vec![INTENTS_DIR.to_string(), format!("{}.json", name)],
            content,
        )
    }

    /// `intents/<name>_usersays_<locale>.json`
    pub fn user_says(name: &str, locale: &str, content: Value) -> Self {
        Self::new(
            vec![INTENTS_DIR.to_string(), user_says_file_name(name, locale)],
            content,
        )
    }

    /// `entities/<name>.json`
    pub fn entity(name: &str, content: Value) -> Self {
        Self::new(
            vec![ENTITIES_DIR.to_string(), format!("{}.json", name)],
            content,
        )
    }

    /// `entities/<name>_entries_<locale>.json`
    pub fn entries(name: &str, locale: &str, content: Value) -> Self {
        Self::new(
            vec![ENTITIES_DIR.to_string(), entries_file_name(name, locale)],
            content,
        )
    }

    /// First path segment (`intents` or `entities`).
    pub fn kind(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }

    /// Last path segment.
    pub fn file_name(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// Whether this file holds sample phrases or entity entries rather than a
    /// primary intent or entity record: `intents/<name>_usersays_<locale>.json`
    /// or `entities/<name>_entries_<locale>.json`.
    pub fn is_companion(&self) -> bool {
        let marker = match self.kind() {
            Some(INTENTS_DIR) => USER_SAYS_MARKER,
            Some(ENTITIES_DIR) => ENTRIES_MARKER,
            _ => return false,
        };
        self.file_name()
            .and_then(|name| name.strip_suffix(".json"))
            .and_then(|stem| stem.rsplit_once(marker))
            .is_some_and(|(record, locale)| !record.is_empty() && is_locale_suffix(locale))
    }

    /// Path joined with `/`, for logging and writing.
    pub fn display_path(&self) -> String {
        self.path.join("/")
    }
}

fn is_locale_suffix(suffix: &str) -> bool {
    !suffix.is_empty()
        && suffix
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

pub fn user_says_file_name(name: &str, locale: &str) -> String {
    format!("{}{}{}.json", name, USER_SAYS_MARKER, locale)
}

pub fn entries_file_name(name: &str, locale: &str) -> String {
    format!("{}{}{}.json", name, ENTRIES_MARKER, locale)
}

/// Intent record as generated by the exporter. Anything else the platform
/// supports arrives through platform overrides merged onto this record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeIntent {
    pub id: String,
    pub name: String,
    pub auto: bool,
    pub webhook_used: bool,
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<NativeResponse>,
}

/// First response of an intent. Parameters are kept as JSON because entity
/// overrides may add arbitrary platform fields to them.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeResponse {
    #[serde(default)]
    pub parameters: Vec<Value>,
}

/// An intent parameter (one per intent entity), before overrides are applied.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeParameter {
    pub name: String,
    /// `@<entity>` for custom types, `@sys.<type>` for built-ins.
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub is_list: bool,
}

impl NativeParameter {
    pub fn new(name: &str, data_type: String) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            value: format!("${}", name),
            is_list: false,
        }
    }
}

/// One sample phrase of an intent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSays {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub data: Vec<UserSaysSegment>,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub count: u32,
}

/// A literal or annotated part of a sample phrase.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSaysSegment {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(default)]
    pub user_defined: bool,
}

impl UserSaysSegment {
    pub fn literal(text: &str) -> Self {
        Self {
            text: text.to_string(),
            alias: None,
            meta: None,
            user_defined: false,
        }
    }

    pub fn entity(text: String, alias: String, meta: Option<String>) -> Self {
        Self {
            text,
            alias: Some(alias),
            meta,
            user_defined: true,
        }
    }
}

/// Entity record as generated by the exporter. The behavioral flags come
/// from [`crate::defaults::DEFAULT_ENTITY`] and platform overrides.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeEntity {
    pub id: String,
    pub name: String,
}

/// One value of an entity together with its synonyms.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EntityEntry {
    pub value: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}
