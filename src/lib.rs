#![forbid(unsafe_code)]
//! Bidirectional conversion between a vendor-neutral NLU model and Dialogflow agent files.
//!
//! The canonical model holds intents (sample phrases with `{entity}` placeholders)
//! and entity types (values with synonyms). Dialogflow stores the same data as a
//! set of JSON files: one record per intent and entity, plus per-locale companion
//! files with sample phrases (`_usersays_`) and entries (`_entries_`).
//!
//! # Quick Start
//!
//! ```rust
//! use dialogflow_model::{ModelData, export_model, import_model};
//!
//! let mut model: ModelData = serde_json::from_str(r#"{
//!     "version": "4.0",
//!     "intents": {
//!         "BookIntent": {
//!             "phrases": ["book a {city} flight"],
//!             "entities": { "city": { "type": "location" } }
//!         }
//!     },
//!     "entityTypes": { "location": { "values": [{ "value": "Berlin" }] } }
//! }"#)?;
//!
//! let files = export_model(&mut model, "en")?;
//! let reimported = import_model(&files, "en");
//! assert_eq!(reimported.intents["BookIntent"].phrases, vec!["book a {city} flight"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Fields without a canonical counterpart are kept under a `dialogflow` key on
//! the model, intents, entities and entity types, and only when they differ from
//! the platform's defaults.

pub mod accessor;
pub mod defaults;
pub mod error;
pub mod exporter;
pub mod importer;
pub mod merge;
pub mod native;
pub mod options;
pub mod placeholder;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    accessor::ModelAccessor,
    error::Error,
    exporter::{Exporter, export_model},
    importer::{Importer, import_model},
    native::NativeFile,
    options::{ConversionOptions, IdStrategy},
    types::{
        CanonicalModel, EntityType, EntityTypeRef, EntityTypeValue, Intent, IntentEntity,
        LegacyModelData, ModelData,
    },
};
