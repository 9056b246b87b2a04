//! Native agent files → canonical model.
//!
//! Importing never fails: missing or malformed optional structures are treated
//! as empty, and companion files that cannot be found are skipped.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value, json};
use tracing::{debug, trace, warn};

use crate::{
    defaults::{
        BUILTIN_PREFIX, ENTITY_FLAGS, INTENT_FIELDS, RESPONSE_FIELDS, TYPE_PREFIX, WELCOME_EVENT,
        entity_default, intent_default, response_default,
    },
    native::{
        ENTITIES_DIR, EntityEntry, INTENTS_DIR, NativeFile, UserSays, entries_file_name,
        user_says_file_name,
    },
    options::ConversionOptions,
    types::{
        DIALOGFLOW, EntityType, EntityTypeRef, EntityTypeValue, Intent, IntentEntity, ModelData,
    },
};

/// Companion files (samples and entries) keyed by file name, built once per import.
struct CompanionIndex<'a> {
    intents: HashMap<&'a str, &'a Value>,
    entities: HashMap<&'a str, &'a Value>,
}

impl<'a> CompanionIndex<'a> {
    fn build(files: &'a [NativeFile]) -> Self {
        let mut index = CompanionIndex {
            intents: HashMap::new(),
            entities: HashMap::new(),
        };
        for file in files.iter().filter(|file| !is_primary_record(file)) {
            let Some(file_name) = file.file_name() else {
                continue;
            };
            match file.kind() {
                Some(INTENTS_DIR) => {
                    index.intents.insert(file_name, &file.content);
                }
                Some(ENTITIES_DIR) => {
                    index.entities.insert(file_name, &file.content);
                }
                _ => {}
            }
        }
        index
    }

    fn user_says(&self, intent: &str, locale: &str) -> Option<&'a Value> {
        let file_name = user_says_file_name(intent, locale);
        trace!(file = %file_name, "looking up sample phrases");
        self.intents.get(file_name.as_str()).copied()
    }

    fn entries(&self, entity: &str, locale: &str) -> Option<&'a Value> {
        let file_name = entries_file_name(entity, locale);
        trace!(file = %file_name, "looking up entity entries");
        self.entities.get(file_name.as_str()).copied()
    }
}

/// Converts a native file set into a canonical model for one locale.
#[derive(Debug, Clone)]
pub struct Importer {
    options: ConversionOptions,
}

impl Importer {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn import(&self, files: &[NativeFile]) -> ModelData {
        let index = CompanionIndex::build(files);
        let mut model = ModelData::new();
        let mut entity_types = BTreeMap::new();
        let mut platform_intents = Vec::new();

        for file in files.iter().filter(|file| is_primary_record(file)) {
            let Some(name) = record_name(file) else {
                trace!(path = %file.display_path(), "skipping file without a name");
                continue;
            };

            match file.kind() {
                Some(INTENTS_DIR) => {
                    if is_platform_managed(&file.content) {
                        debug!(intent = %name, "routing platform-managed intent");
                        platform_intents.push(self.platform_intent(&file.content, &name, &index));
                    } else {
                        debug!(intent = %name, "importing intent");
                        let intent = self.convert_intent(&file.content, &name, &index);
                        model.intents.insert(name, intent);
                    }
                }
                Some(ENTITIES_DIR) => {
                    debug!(entity = %name, "importing entity");
                    let entity_type = self.convert_entity(&file.content, &name, &index);
                    entity_types.insert(name, entity_type);
                }
                _ => trace!(path = %file.display_path(), "skipping unknown file kind"),
            }
        }

        if !platform_intents.is_empty() {
            model
                .platforms
                .insert(DIALOGFLOW.to_string(), json!({ "intents": platform_intents }));
        }
        if !entity_types.is_empty() {
            model.entity_types = Some(entity_types);
        }
        model
    }

    /// Keeps a fallback or welcome intent verbatim, with its samples attached
    /// under `userSays` so an export can write them back.
    fn platform_intent(&self, content: &Value, name: &str, index: &CompanionIndex) -> Value {
        let mut record = content.clone();
        if let Value::Object(map) = &mut record {
            map.entry("name").or_insert_with(|| json!(name));
            if let Some(user_says) = index.user_says(name, &self.options.locale) {
                map.insert("userSays".to_string(), user_says.clone());
            }
        }
        record
    }

    fn convert_intent(&self, content: &Value, name: &str, index: &CompanionIndex) -> Intent {
        let mut intent = Intent::default();

        let overrides = self.intent_overrides(content);
        if !overrides.is_empty() {
            intent
                .platforms
                .insert(DIALOGFLOW.to_string(), Value::Object(overrides));
        }

        let mut entities = intent_entities(content);

        if let Some(samples) = index.user_says(name, &self.options.locale) {
            for sample in samples.as_array().into_iter().flatten() {
                match serde_json::from_value::<UserSays>(sample.clone()) {
                    Ok(user_says) => intent
                        .phrases
                        .push(render_phrase(&user_says, entities.as_mut())),
                    Err(err) => warn!(intent = %name, error = %err, "skipping malformed sample"),
                }
            }
        }

        intent.entities = entities;
        intent
    }

    /// Fields of a native intent that differ from the platform defaults.
    fn intent_overrides(&self, content: &Value) -> Map<String, Value> {
        let mut overrides = Map::new();

        for field in INTENT_FIELDS {
            if let Some(value) = content.get(field) {
                if Some(value) != intent_default(field) {
                    overrides.insert(field.to_string(), value.clone());
                }
            }
        }

        if let Some(responses) = content.get("responses") {
            // Locale-specific messages are only inspected when the whole list deviates.
            if Some(responses) != intent_default("responses") {
                let response = self.response_overrides(responses);
                if !response.is_empty() {
                    overrides.insert("responses".to_string(), json!([response]));
                }
            }
        }

        overrides
    }

    fn response_overrides(&self, responses: &Value) -> Map<String, Value> {
        let mut overrides = Map::new();
        let Some(response) = responses.get(0) else {
            return overrides;
        };

        for field in RESPONSE_FIELDS {
            if let Some(value) = response.get(field) {
                if Some(value) != response_default(field) {
                    overrides.insert(field.to_string(), value.clone());
                }
            }
        }

        if let Some(messages) = response.get("messages") {
            if Some(messages) != response_default("messages") {
                let localized = messages
                    .as_array()
                    .into_iter()
                    .flatten()
                    .filter(|message| {
                        message
                            .get("lang")
                            .and_then(Value::as_str)
                            .is_some_and(|lang| self.options.matches_language_tag(lang))
                            && has_speech(message)
                    })
                    .cloned()
                    .collect::<Vec<_>>();
                if !localized.is_empty() {
                    overrides.insert("messages".to_string(), Value::Array(localized));
                }
            }
        }

        overrides
    }

    fn convert_entity(&self, content: &Value, name: &str, index: &CompanionIndex) -> EntityType {
        let mut entity_type = EntityType::default();

        let mut overrides = Map::new();
        for flag in ENTITY_FLAGS {
            if let Some(value) = content.get(flag) {
                if Some(value) != entity_default(flag) {
                    overrides.insert(flag.to_string(), value.clone());
                }
            }
        }
        if !overrides.is_empty() {
            entity_type
                .platforms
                .insert(DIALOGFLOW.to_string(), Value::Object(overrides));
        }

        let keeps_synonyms = !flag_set(content, "isEnum") && !flag_set(content, "isRegexp");

        if let Some(entries) = index.entries(name, &self.options.locale) {
            for entry in entries.as_array().into_iter().flatten() {
                match serde_json::from_value::<EntityEntry>(entry.clone()) {
                    Ok(entry) => entity_type
                        .values
                        .push(entry_to_value(entry, keeps_synonyms)),
                    Err(err) => warn!(entity = %name, error = %err, "skipping malformed entry"),
                }
            }
        }

        entity_type
    }
}

/// Converts native files into a canonical model for `locale`.
pub fn import_model(files: &[NativeFile], locale: &str) -> ModelData {
    Importer::new(ConversionOptions::new(locale)).import(files)
}

/// Companion files are JSON arrays; a companion-shaped file name that holds a
/// named record object is an intent or entity whose own name contains a marker.
fn is_primary_record(file: &NativeFile) -> bool {
    !file.is_companion() || file.content.get("name").is_some_and(Value::is_string)
}

fn record_name(file: &NativeFile) -> Option<String> {
    if let Some(name) = file.content.get("name").and_then(Value::as_str) {
        return Some(name.to_string());
    }
    file.file_name()
        .and_then(|file_name| file_name.strip_suffix(".json"))
        .map(str::to_string)
}

fn is_platform_managed(content: &Value) -> bool {
    if flag_set(content, "fallbackIntent") {
        return true;
    }
    content
        .get("events")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .any(|event| event.get("name").and_then(Value::as_str) == Some(WELCOME_EVENT))
}

fn flag_set(content: &Value, flag: &str) -> bool {
    content.get(flag).and_then(Value::as_bool).unwrap_or(false)
}

fn has_speech(message: &Value) -> bool {
    match message.get("speech") {
        Some(Value::String(speech)) => !speech.is_empty(),
        Some(Value::Array(speech)) => !speech.is_empty(),
        _ => false,
    }
}

/// Entity declarations from the parameters of the first response.
fn intent_entities(content: &Value) -> Option<BTreeMap<String, IntentEntity>> {
    let parameters = content
        .pointer("/responses/0/parameters")
        .and_then(Value::as_array)?;

    let mut entities = BTreeMap::new();
    for parameter in parameters {
        let (Some(name), Some(data_type)) = (
            parameter.get("name").and_then(Value::as_str),
            parameter.get("dataType").and_then(Value::as_str),
        ) else {
            warn!(parameter = %parameter, "skipping parameter without name or dataType");
            continue;
        };

        let entity_type = if data_type.starts_with(BUILTIN_PREFIX) {
            EntityTypeRef::Platform(BTreeMap::from([(
                DIALOGFLOW.to_string(),
                data_type.to_string(),
            )]))
        } else {
            EntityTypeRef::Name(
                data_type
                    .strip_prefix(TYPE_PREFIX)
                    .unwrap_or(data_type)
                    .to_string(),
            )
        };

        entities.insert(
            name.to_string(),
            IntentEntity {
                entity_type: Some(entity_type),
                ..IntentEntity::default()
            },
        );
    }

    if entities.is_empty() { None } else { Some(entities) }
}

/// Joins the segments of a sample into a phrase template, filling in example
/// texts of entities on the first aliased segment that carries one.
fn render_phrase(
    user_says: &UserSays,
    mut entities: Option<&mut BTreeMap<String, IntentEntity>>,
) -> String {
    let mut phrase = String::new();
    for segment in &user_says.data {
        match segment.alias.as_deref().filter(|alias| !alias.is_empty()) {
            Some(alias) => {
                phrase.push('{');
                phrase.push_str(alias);
                phrase.push('}');

                if segment.text != alias {
                    if let Some(entity) = entities.as_deref_mut().and_then(|e| e.get_mut(alias)) {
                        if entity.text.is_none() {
                            entity.text = Some(segment.text.clone());
                        }
                    }
                }
            }
            None => phrase.push_str(&segment.text),
        }
    }
    phrase
}

fn entry_to_value(entry: EntityEntry, keeps_synonyms: bool) -> EntityTypeValue {
    let mut value = EntityTypeValue::new(entry.value);
    if keeps_synonyms {
        let synonyms = entry
            .synonyms
            .into_iter()
            .filter(|synonym| *synonym != value.value)
            .collect::<Vec<_>>();
        if !synonyms.is_empty() {
            value.synonyms = Some(synonyms);
        }
    }
    value
}
