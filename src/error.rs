//! All error types for the dialogflow-model crate.
//!
//! Only exporting (and document I/O) can fail. Importing tolerates anything the
//! platform could have produced and therefore never returns an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "input type `{entity_type}` of input `{entity}` in intent `{intent}` cannot be resolved: the model defines no inputTypes"
    )]
    MissingEntityTypes {
        intent: String,
        entity: String,
        entity_type: String,
    },

    #[error(
        "{} `{entity_type}` of {} `{entity}` in intent `{intent}` must be defined in {collection}",
        type_noun(.collection),
        entity_noun(.collection)
    )]
    UndefinedEntityType {
        intent: String,
        entity: String,
        entity_type: String,
        collection: &'static str,
    },

    #[error("invalid type for entity `{entity}` in intent `{intent}`: {reason}")]
    InvalidEntityType {
        intent: String,
        entity: String,
        reason: String,
    },

    #[error("invalid platform data: {0}")]
    InvalidPlatformData(String),
}

// Legacy models call entity types "input types" and entities "inputs".
fn type_noun(collection: &str) -> &'static str {
    if collection == LEGACY_COLLECTION {
        "input type"
    } else {
        "entity type"
    }
}

fn entity_noun(collection: &str) -> &'static str {
    if collection == LEGACY_COLLECTION {
        "input"
    } else {
        "entity"
    }
}

const LEGACY_COLLECTION: &str = "inputTypes";

impl Error {
    /// Creates an error for an entity whose `type` cannot be turned into a native data type.
    pub fn invalid_entity_type(
        intent: impl Into<String>,
        entity: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidEntityType {
            intent: intent.into(),
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Creates an error for a malformed record in the model-level escape hatch.
    pub fn invalid_platform_data(message: impl Into<String>) -> Self {
        Error::InvalidPlatformData(message.into())
    }
}
