//! Canonical, vendor-neutral model types.
//!
//! The importer decodes native agent files into these; the exporter reads them
//! (through [`crate::accessor::ModelAccessor`]) to produce native files.
//! Two shapes are understood: the current one ([`ModelData`]) and the legacy
//! one ([`LegacyModelData`]), wrapped together in [`CanonicalModel`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Key of the Dialogflow escape hatch inside [`PlatformData`].
pub const DIALOGFLOW: &str = "dialogflow";

/// Version written into models produced by the importer.
pub const MODEL_VERSION: &str = "4.0";

/// Vendor-specific data with no first-class canonical representation,
/// keyed by vendor name (e.g. `"dialogflow"`).
pub type PlatformData = BTreeMap<String, Value>;

/// A canonical model in its current shape.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelData {
    #[serde(default)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub invocation: String,

    /// Intents keyed by their unique name.
    #[serde(default)]
    pub intents: BTreeMap<String, Intent>,

    /// Entity types keyed by their unique name.
    /// `None` means the model declares no collection at all.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_types: Option<BTreeMap<String, EntityType>>,

    #[serde(flatten)]
    pub platforms: PlatformData,
}

impl ModelData {
    pub fn new() -> Self {
        Self {
            version: MODEL_VERSION.to_string(),
            ..Self::default()
        }
    }
}

/// A single intent with its sample phrases.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Intent {
    /// Sample utterance templates; `{name}` marks an entity placeholder.
    #[serde(default)]
    pub phrases: Vec<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<BTreeMap<String, IntentEntity>>,

    #[serde(flatten)]
    pub platforms: PlatformData,
}

/// A named slot inside an intent's phrases.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct IntentEntity {
    #[serde(rename = "type")]
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityTypeRef>,

    /// Example surface text used when rendering sample phrases.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(flatten)]
    pub platforms: PlatformData,
}

/// Reference from an intent entity to its type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EntityTypeRef {
    /// Name of an entity type declared in the model.
    Name(String),
    /// Vendor-native type per vendor, e.g. `{"dialogflow": "@sys.number"}`.
    Platform(BTreeMap<String, String>),
}

/// A named set of values, or a vendor-specific recognizer.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct EntityType {
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<EntityTypeValue>,

    #[serde(flatten)]
    pub platforms: PlatformData,
}

/// One value of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityTypeValue {
    pub value: String,

    /// Alternate surface forms, never including `value` itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<Vec<String>>,
}

impl EntityTypeValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            synonyms: None,
        }
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = Some(synonyms.into_iter().map(Into::into).collect());
        self
    }
}

// Values may be written either as objects or as bare strings.
impl<'de> Deserialize<'de> for EntityTypeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(String),
            Full {
                value: String,
                #[serde(default)]
                synonyms: Option<Vec<String>>,
            },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bare(value) => EntityTypeValue::new(value),
            Repr::Full { value, synonyms } => EntityTypeValue { value, synonyms },
        })
    }
}

/// A canonical model in its legacy shape: intents and entity types are arrays
/// of named records and entity types are called input types.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyModelData {
    #[serde(default)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub invocation: String,

    #[serde(default)]
    pub intents: Vec<LegacyIntent>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_types: Option<Vec<LegacyInputType>>,

    #[serde(flatten)]
    pub platforms: PlatformData,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct LegacyIntent {
    pub name: String,

    #[serde(default)]
    pub phrases: Vec<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<LegacyInput>>,

    #[serde(flatten)]
    pub platforms: PlatformData,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct LegacyInput {
    pub name: String,

    #[serde(rename = "type")]
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<EntityTypeRef>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(flatten)]
    pub platforms: PlatformData,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct LegacyInputType {
    pub name: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<EntityTypeValue>,

    #[serde(flatten)]
    pub platforms: PlatformData,
}

/// Either model shape. Deserialization picks the shape from the document:
/// an `intents` array or an `inputTypes` key marks a legacy model.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalModel {
    Current(ModelData),
    Legacy(LegacyModelData),
}

impl CanonicalModel {
    pub fn is_legacy_document(value: &Value) -> bool {
        value.get("intents").is_some_and(Value::is_array) || value.get("inputTypes").is_some()
    }
}

impl From<ModelData> for CanonicalModel {
    fn from(model: ModelData) -> Self {
        CanonicalModel::Current(model)
    }
}

impl From<LegacyModelData> for CanonicalModel {
    fn from(model: LegacyModelData) -> Self {
        CanonicalModel::Legacy(model)
    }
}

impl<'de> Deserialize<'de> for CanonicalModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if CanonicalModel::is_legacy_document(&value) {
            serde_json::from_value(value)
                .map(CanonicalModel::Legacy)
                .map_err(serde::de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(CanonicalModel::Current)
                .map_err(serde::de::Error::custom)
        }
    }
}

impl Serialize for CanonicalModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CanonicalModel::Current(model) => model.serialize(serializer),
            CanonicalModel::Legacy(model) => model.serialize(serializer),
        }
    }
}
