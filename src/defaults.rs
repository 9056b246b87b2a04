//! Out-of-the-box field values of Dialogflow intents and entities.
//!
//! The importer only keeps fields that differ from these templates, and the
//! exporter seeds entity records from them, so both directions agree on what
//! "default" means.

use lazy_static::lazy_static;
use serde_json::{Value, json};

/// Prefix of the platform's built-in entity types (e.g. `@sys.number`).
pub const BUILTIN_PREFIX: &str = "@sys.";

/// Prefix of every entity reference in a parameter's `dataType`.
pub const TYPE_PREFIX: &str = "@";

/// Event that triggers the platform's built-in greeting intent.
pub const WELCOME_EVENT: &str = "WELCOME";

/// Top-level intent fields compared against [`DEFAULT_INTENT`].
pub const INTENT_FIELDS: [&str; 6] = [
    "auto",
    "contexts",
    "priority",
    "webhookUsed",
    "webhookForSlotFilling",
    "events",
];

/// Fields of the first response compared against the default response.
/// `messages` is handled separately because it is filtered by locale.
pub const RESPONSE_FIELDS: [&str; 4] = [
    "resetContexts",
    "affectedContexts",
    "defaultResponsePlatforms",
    "speech",
];

/// Behavioral flags of an entity, compared against [`DEFAULT_ENTITY`].
pub const ENTITY_FLAGS: [&str; 5] = [
    "isOverridable",
    "isEnum",
    "automatedExpansion",
    "isRegexp",
    "allowFuzzyExtraction",
];

lazy_static! {
    pub static ref DEFAULT_INTENT: Value = json!({
        "auto": true,
        "contexts": [],
        "priority": 500000,
        "webhookUsed": true,
        "webhookForSlotFilling": false,
        "fallbackIntent": false,
        "events": [],
        "responses": [
            {
                "resetContexts": false,
                "action": "",
                "affectedContexts": [],
                "parameters": [],
                "messages": [
                    {
                        "type": 0,
                        "lang": "en",
                        "condition": "",
                        "speech": []
                    }
                ],
                "defaultResponsePlatforms": {},
                "speech": []
            }
        ]
    });

    pub static ref DEFAULT_ENTITY: Value = json!({
        "isOverridable": true,
        "isEnum": false,
        "isRegexp": false,
        "automatedExpansion": false,
        "allowFuzzyExtraction": false
    });
}

/// Default value of a top-level intent field.
pub fn intent_default(field: &str) -> Option<&'static Value> {
    DEFAULT_INTENT.get(field)
}

/// Default value of a field of the first intent response.
pub fn response_default(field: &str) -> Option<&'static Value> {
    DEFAULT_INTENT
        .get("responses")
        .and_then(|responses| responses.get(0))
        .and_then(|response| response.get(field))
}

/// Default value of an entity flag.
pub fn entity_default(field: &str) -> Option<&'static Value> {
    DEFAULT_ENTITY.get(field)
}
