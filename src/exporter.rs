//! Canonical model → native agent files.
//!
//! Exporting fails fast: the first entity whose type cannot be resolved aborts
//! the whole export and no files are returned.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::{
    accessor::ModelAccessor,
    defaults::{BUILTIN_PREFIX, DEFAULT_ENTITY, TYPE_PREFIX},
    error::Error,
    merge::deep_merge,
    native::{
        EntityEntry, NativeEntity, NativeFile, NativeIntent, NativeParameter, NativeResponse,
        UserSays, UserSaysSegment,
    },
    options::ConversionOptions,
    placeholder::{PhraseToken, sanitize_synonym, tokenize_phrase},
    types::{DIALOGFLOW, EntityType, EntityTypeRef, Intent, IntentEntity},
};

/// Converts a canonical model (either shape) into native files for one locale.
#[derive(Debug, Clone)]
pub struct Exporter {
    options: ConversionOptions,
}

/// Per-export bookkeeping.
struct ExportState {
    files: Vec<NativeFile>,
    emitted_entities: HashSet<String>,
}

impl Exporter {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Exports every intent, the entity types they reference, and the records
    /// kept in the model-level `dialogflow` escape hatch.
    ///
    /// Inline `userSays` / `entries` of escape-hatch records are moved out of
    /// the model into their own files, which is why the model is borrowed mutably.
    pub fn export<M>(&self, model: &mut M) -> Result<Vec<NativeFile>, Error>
    where
        M: ModelAccessor + ?Sized,
    {
        let mut state = ExportState {
            files: Vec::new(),
            emitted_entities: HashSet::new(),
        };

        {
            let model: &M = &*model;
            for name in model.intent_names() {
                if let Some(intent) = model.intent(name) {
                    debug!(intent = %name, "exporting intent");
                    self.export_intent(model, name, &intent, &mut state)?;
                }
            }
        }

        self.export_platform_records(model, &mut state)?;
        Ok(state.files)
    }

    fn export_intent<M>(
        &self,
        model: &M,
        name: &str,
        intent: &Intent,
        state: &mut ExportState,
    ) -> Result<(), Error>
    where
        M: ModelAccessor + ?Sized,
    {
        let mut parameters = Vec::new();
        if let Some(entities) = intent.entities.as_ref().filter(|e| !e.is_empty()) {
            for (entity_name, entity) in entities {
                let data_type = self.resolve_data_type(model, name, entity_name, entity, state)?;
                let mut parameter =
                    serde_json::to_value(NativeParameter::new(entity_name, data_type))?;
                if let Some(overrides) = entity.platforms.get(DIALOGFLOW) {
                    deep_merge(&mut parameter, overrides);
                }
                parameters.push(parameter);
            }
        }

        let mut record = serde_json::to_value(NativeIntent {
            id: self.options.id_strategy.generate(&format!("intent:{}", name)),
            name: name.to_string(),
            auto: true,
            webhook_used: true,
            responses: if parameters.is_empty() {
                Vec::new()
            } else {
                vec![NativeResponse {
                    parameters: parameters.clone(),
                }]
            },
        })?;

        if let Some(overrides) = intent.platforms.get(DIALOGFLOW) {
            merge_intent_overrides(&mut record, overrides);
        }
        state.files.push(NativeFile::intent(name, record));

        let samples = intent
            .phrases
            .iter()
            .enumerate()
            .map(|(position, phrase)| UserSays {
                id: self
                    .options
                    .id_strategy
                    .generate(&format!("usersays:{}:{}", name, position)),
                data: phrase_segments(phrase, intent, &parameters),
                is_template: false,
                count: 0,
            })
            .collect::<Vec<_>>();
        if !samples.is_empty() {
            state.files.push(NativeFile::user_says(
                name,
                &self.options.locale,
                serde_json::to_value(samples)?,
            ));
        }

        Ok(())
    }

    /// Native `dataType` of an intent entity. Custom types also get their
    /// entity and entries files emitted (once per export).
    fn resolve_data_type<M>(
        &self,
        model: &M,
        intent_name: &str,
        entity_name: &str,
        entity: &IntentEntity,
        state: &mut ExportState,
    ) -> Result<String, Error>
    where
        M: ModelAccessor + ?Sized,
    {
        let type_name = match &entity.entity_type {
            None => {
                return Err(Error::invalid_entity_type(
                    intent_name,
                    entity_name,
                    "missing `type`",
                ));
            }
            Some(EntityTypeRef::Platform(types)) => {
                return types.get(DIALOGFLOW).cloned().ok_or_else(|| {
                    Error::invalid_entity_type(
                        intent_name,
                        entity_name,
                        format!("type object has no `{}` key", DIALOGFLOW),
                    )
                });
            }
            Some(EntityTypeRef::Name(type_name)) => type_name,
        };

        let Some(entity_type) = model.entity_type(type_name) else {
            if model.is_legacy() && !model.has_entity_types() {
                return Err(Error::MissingEntityTypes {
                    intent: intent_name.to_string(),
                    entity: entity_name.to_string(),
                    entity_type: type_name.clone(),
                });
            }
            return Err(Error::UndefinedEntityType {
                intent: intent_name.to_string(),
                entity: entity_name.to_string(),
                entity_type: type_name.clone(),
                collection: model.entity_types_key(),
            });
        };

        if type_name.starts_with(BUILTIN_PREFIX) {
            return Ok(type_name.clone());
        }

        let native_name = match entity_type.platforms.get(DIALOGFLOW) {
            Some(Value::String(renamed)) if renamed.starts_with(BUILTIN_PREFIX) => {
                return Ok(renamed.clone());
            }
            Some(Value::String(renamed)) => renamed.clone(),
            _ => type_name.clone(),
        };

        if state.emitted_entities.insert(native_name.clone()) {
            debug!(entity = %native_name, "exporting entity");
            self.export_entity(&native_name, &entity_type, state)?;
        }

        Ok(format!("{}{}", TYPE_PREFIX, native_name))
    }

    fn export_entity(
        &self,
        name: &str,
        entity_type: &EntityType,
        state: &mut ExportState,
    ) -> Result<(), Error> {
        let mut record = DEFAULT_ENTITY.clone();
        deep_merge(
            &mut record,
            &serde_json::to_value(NativeEntity {
                id: self.options.id_strategy.generate(&format!("entity:{}", name)),
                name: name.to_string(),
            })?,
        );
        if let Some(overrides @ Value::Object(_)) = entity_type.platforms.get(DIALOGFLOW) {
            deep_merge(&mut record, overrides);
        }

        let seeds_value = !flag_set(&record, "isEnum") && !flag_set(&record, "isRegexp");
        state.files.push(NativeFile::entity(name, record));

        if entity_type.values.is_empty() {
            return Ok(());
        }

        let entries = entity_type
            .values
            .iter()
            .map(|value| {
                let mut synonyms = Vec::new();
                if seeds_value {
                    synonyms.push(sanitize_synonym(&value.value));
                }
                synonyms.extend(
                    value
                        .synonyms
                        .iter()
                        .flatten()
                        .map(|synonym| sanitize_synonym(synonym)),
                );
                EntityEntry {
                    value: value.value.clone(),
                    synonyms,
                }
            })
            .collect::<Vec<_>>();
        state.files.push(NativeFile::entries(
            name,
            &self.options.locale,
            serde_json::to_value(entries)?,
        ));

        Ok(())
    }

    /// Emits intents and entities stored verbatim in the model-level escape
    /// hatch, moving inline samples and entries into companion files.
    fn export_platform_records<M>(&self, model: &mut M, state: &mut ExportState) -> Result<(), Error>
    where
        M: ModelAccessor + ?Sized,
    {
        let Some(platform) = model.platform_data_mut(DIALOGFLOW) else {
            return Ok(());
        };
        let locale = &self.options.locale;

        if let Some(intents) = platform.get_mut("intents").and_then(Value::as_array_mut) {
            for (position, record) in intents.iter_mut().enumerate() {
                let name = platform_record_name(record, "intent", position)?;
                let user_says = record
                    .as_object_mut()
                    .and_then(|fields| fields.remove("userSays"));
                debug!(intent = %name, "exporting platform intent");
                state.files.push(NativeFile::intent(&name, record.clone()));
                if let Some(user_says) = user_says {
                    state
                        .files
                        .push(NativeFile::user_says(&name, locale, user_says));
                }
            }
        }

        if let Some(entities) = platform.get_mut("entities").and_then(Value::as_array_mut) {
            for (position, record) in entities.iter_mut().enumerate() {
                let name = platform_record_name(record, "entity", position)?;
                let entries = record
                    .as_object_mut()
                    .and_then(|fields| fields.remove("entries"));
                debug!(entity = %name, "exporting platform entity");
                state.files.push(NativeFile::entity(&name, record.clone()));
                if let Some(entries) = entries {
                    state.files.push(NativeFile::entries(&name, locale, entries));
                }
            }
        }

        Ok(())
    }
}

/// Exports a canonical model for `locale` with random record ids.
pub fn export_model<M>(model: &mut M, locale: &str) -> Result<Vec<NativeFile>, Error>
where
    M: ModelAccessor + ?Sized,
{
    Exporter::new(ConversionOptions::new(locale)).export(model)
}

/// Layers intent-level overrides onto a generated record. Responses are merged
/// position by position so overrides never drop the generated parameters.
fn merge_intent_overrides(record: &mut Value, overrides: &Value) {
    let mut overrides = overrides.clone();
    let response_overrides = overrides
        .as_object_mut()
        .and_then(|fields| fields.remove("responses"));

    match (response_overrides, record.as_object_mut()) {
        (Some(Value::Array(response_overrides)), Some(fields)) => {
            let responses = fields
                .entry("responses")
                .or_insert_with(|| Value::Array(Vec::new()));
            if !responses.is_array() {
                *responses = Value::Array(Vec::new());
            }
            if let Some(responses) = responses.as_array_mut() {
                for (position, response) in response_overrides.into_iter().enumerate() {
                    match responses.get_mut(position) {
                        Some(existing) => deep_merge(existing, &response),
                        None => responses.push(response),
                    }
                }
            }
        }
        (Some(other), Some(fields)) => {
            fields.insert("responses".to_string(), other);
        }
        _ => {}
    }

    deep_merge(record, &overrides);
}

/// Sample segments of one phrase. Only an empty literal before the first
/// marker is dropped; empty gaps between and after markers are kept.
fn phrase_segments(phrase: &str, intent: &Intent, parameters: &[Value]) -> Vec<UserSaysSegment> {
    let tokens = tokenize_phrase(phrase);
    if !tokens
        .iter()
        .any(|token| matches!(token, PhraseToken::Placeholder(_)))
    {
        return vec![UserSaysSegment::literal(phrase)];
    }

    let mut seen_marker = false;
    let mut segments = Vec::with_capacity(tokens.len());

    for token in tokens {
        match token {
            PhraseToken::Text(text) => {
                if text.is_empty() && !seen_marker {
                    continue;
                }
                segments.push(UserSaysSegment::literal(text));
            }
            PhraseToken::Placeholder(alias) => {
                seen_marker = true;
                let text = intent
                    .entities
                    .as_ref()
                    .and_then(|entities| entities.get(alias))
                    .and_then(|entity| entity.text.clone())
                    .unwrap_or_else(|| alias.to_string());
                let meta = parameters
                    .iter()
                    .find(|parameter| parameter.get("name").and_then(Value::as_str) == Some(alias))
                    .and_then(|parameter| parameter.get("dataType"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                segments.push(UserSaysSegment::entity(text, alias.to_string(), meta));
            }
        }
    }

    segments
}

fn platform_record_name(record: &Value, kind: &str, position: usize) -> Result<String, Error> {
    record
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::invalid_platform_data(format!(
                "{} at position {} in `{}` has no name",
                kind, position, DIALOGFLOW
            ))
        })
}

fn flag_set(record: &Value, flag: &str) -> bool {
    record.get(flag).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::IdStrategy;
    use crate::types::{EntityTypeValue, ModelData};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn book_model() -> ModelData {
        serde_json::from_value(json!({
            "version": "4.0",
            "intents": {
                "BookIntent": {
                    "phrases": ["book a {city} flight", "{count} tickets to {city}", "book"],
                    "entities": {
                        "city": { "type": "location" },
                        "count": { "type": { "dialogflow": "@sys.number" } }
                    }
                }
            },
            "entityTypes": {
                "location": { "values": [{ "value": "New York", "synonyms": ["NYC!"] }] }
            }
        }))
        .unwrap()
    }

    fn file<'a>(files: &'a [NativeFile], path: &str) -> &'a Value {
        &files
            .iter()
            .find(|file| file.display_path() == path)
            .unwrap_or_else(|| panic!("missing file {path}"))
            .content
    }

    #[test]
    fn test_export_intent_entities_and_samples() {
        let mut model = book_model();
        let files = Exporter::new(
            ConversionOptions::new("en").with_id_strategy(IdStrategy::Deterministic),
        )
        .export(&mut model)
        .unwrap();

        let paths = files.iter().map(NativeFile::display_path).collect::<Vec<_>>();
        assert_eq!(
            paths,
            vec![
                "entities/location.json",
                "entities/location_entries_en.json",
                "intents/BookIntent.json",
                "intents/BookIntent_usersays_en.json",
            ]
        );

        let intent = file(&files, "intents/BookIntent.json");
        assert_eq!(intent["name"], "BookIntent");
        assert_eq!(intent["auto"], true);
        assert_eq!(intent["webhookUsed"], true);
        let parameters = intent["responses"][0]["parameters"].as_array().unwrap();
        assert_eq!(parameters[0]["name"], "city");
        assert_eq!(parameters[0]["dataType"], "@location");
        assert_eq!(parameters[0]["value"], "$city");
        assert_eq!(parameters[1]["dataType"], "@sys.number");

        let entries = file(&files, "entities/location_entries_en.json");
        assert_eq!(
            entries,
            &json!([{ "value": "New York", "synonyms": ["New York", "NYC"] }])
        );

        let samples = file(&files, "intents/BookIntent_usersays_en.json");
        assert_eq!(
            samples[0]["data"],
            json!([
                { "text": "book a ", "userDefined": false },
                { "text": "city", "alias": "city", "meta": "@location", "userDefined": true },
                { "text": " flight", "userDefined": false }
            ])
        );
        assert_eq!(samples[1]["data"][0]["alias"], "count");
        assert_eq!(samples[1]["data"][0]["meta"], "@sys.number");
        assert_eq!(
            samples[2]["data"],
            json!([{ "text": "book", "userDefined": false }])
        );
    }

    #[test]
    fn test_entity_record_is_seeded_from_defaults() {
        let mut model = book_model();
        let files = export_model(&mut model, "en").unwrap();
        let entity = file(&files, "entities/location.json");
        assert_eq!(entity["name"], "location");
        assert_eq!(entity["isOverridable"], true);
        assert_eq!(entity["isEnum"], false);
        assert_eq!(entity["automatedExpansion"], false);
        assert!(!entity["id"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_enum_entity_does_not_seed_value_synonym() {
        let mut model = book_model();
        model.entity_types.as_mut().unwrap().insert(
            "location".to_string(),
            EntityType {
                values: vec![EntityTypeValue::new("Berlin").with_synonyms(["Spree-Athen"])],
                platforms: BTreeMap::from([("dialogflow".to_string(), json!({ "isEnum": true }))]),
            },
        );
        let files = export_model(&mut model, "en").unwrap();
        assert_eq!(file(&files, "entities/location.json")["isEnum"], true);
        assert_eq!(
            file(&files, "entities/location_entries_en.json"),
            &json!([{ "value": "Berlin", "synonyms": ["Spree-Athen"] }])
        );
    }

    #[test]
    fn test_entity_rename_and_shared_emission() {
        let mut model: ModelData = serde_json::from_value(json!({
            "intents": {
                "A": { "phrases": ["{x}"], "entities": { "x": { "type": "thing" } } },
                "B": { "phrases": ["{y}"], "entities": { "y": { "type": "thing" } } }
            },
            "entityTypes": { "thing": { "dialogflow": "object" } }
        }))
        .unwrap();
        let files = export_model(&mut model, "en").unwrap();
        let entity_files = files
            .iter()
            .filter(|file| file.kind() == Some("entities"))
            .count();
        assert_eq!(entity_files, 1);
        assert_eq!(file(&files, "entities/object.json")["name"], "object");
        assert_eq!(
            file(&files, "intents/A.json")["responses"][0]["parameters"][0]["dataType"],
            "@object"
        );
    }

    #[test]
    fn test_overrides_are_merged() {
        let mut model: ModelData = serde_json::from_value(json!({
            "intents": {
                "HelpIntent": {
                    "phrases": ["help {topic}"],
                    "entities": {
                        "topic": { "type": { "dialogflow": "@sys.any" }, "dialogflow": { "isList": true } }
                    },
                    "dialogflow": { "priority": 750000, "responses": [{ "resetContexts": true }] }
                }
            }
        }))
        .unwrap();
        let files = export_model(&mut model, "en").unwrap();
        let intent = file(&files, "intents/HelpIntent.json");
        assert_eq!(intent["priority"], 750000);
        assert_eq!(intent["responses"][0]["resetContexts"], true);
        assert_eq!(intent["responses"][0]["parameters"][0]["isList"], true);
        assert_eq!(intent["responses"][0]["parameters"][0]["dataType"], "@sys.any");
    }

    #[test]
    fn test_adjacent_markers_keep_inner_and_trailing_gaps() {
        let intent = Intent {
            phrases: vec!["{from}{to}".to_string()],
            ..Intent::default()
        };
        let segments = phrase_segments("{from}{to}", &intent, &[]);
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].alias.as_deref(), Some("from"));
        assert_eq!(segments[1], UserSaysSegment::literal(""));
        assert_eq!(segments[2].alias.as_deref(), Some("to"));
        assert!(segments[2].meta.is_none());
        assert_eq!(segments[3], UserSaysSegment::literal(""));
    }

    #[test]
    fn test_phrase_ending_in_marker_keeps_empty_trailing_literal() {
        let intent = Intent::default();
        let parameters = [json!({ "name": "city", "dataType": "@location" })];
        let segments = phrase_segments("book {city}", &intent, &parameters);
        assert_eq!(
            serde_json::to_value(&segments).unwrap(),
            json!([
                { "text": "book ", "userDefined": false },
                { "text": "city", "alias": "city", "meta": "@location", "userDefined": true },
                { "text": "", "userDefined": false }
            ])
        );
    }

    #[test]
    fn test_entity_text_replaces_alias() {
        let intent: Intent = serde_json::from_value(json!({
            "phrases": ["fly to {city}"],
            "entities": { "city": { "type": "location", "text": "Berlin" } }
        }))
        .unwrap();
        let segments = phrase_segments("fly to {city}", &intent, &[]);
        assert_eq!(segments[1].text, "Berlin");
        assert_eq!(segments[1].alias.as_deref(), Some("city"));
    }

    #[test]
    fn test_platform_records_are_extracted() {
        let mut model = ModelData::new();
        model.platforms.insert(
            "dialogflow".to_string(),
            json!({
                "intents": [{
                    "name": "Default Fallback Intent",
                    "fallbackIntent": true,
                    "userSays": [{ "data": [{ "text": "hmm", "userDefined": false }] }]
                }],
                "entities": [{
                    "name": "size",
                    "entries": [{ "value": "small", "synonyms": ["small", "tiny"] }]
                }]
            }),
        );

        let files = export_model(&mut model, "en").unwrap();
        let paths = files.iter().map(NativeFile::display_path).collect::<Vec<_>>();
        assert_eq!(
            paths,
            vec![
                "intents/Default Fallback Intent.json",
                "intents/Default Fallback Intent_usersays_en.json",
                "entities/size.json",
                "entities/size_entries_en.json",
            ]
        );
        assert!(file(&files, "intents/Default Fallback Intent.json").get("userSays").is_none());

        let platform = &model.platforms["dialogflow"];
        assert!(platform["intents"][0].get("userSays").is_none());
        assert!(platform["entities"][0].get("entries").is_none());
    }

    #[test]
    fn test_platform_record_without_name_fails() {
        let mut model = ModelData::new();
        model
            .platforms
            .insert("dialogflow".to_string(), json!({ "intents": [{ "auto": true }] }));
        let err = export_model(&mut model, "en").unwrap_err();
        assert!(matches!(err, Error::InvalidPlatformData(_)));
    }

    #[test]
    fn test_missing_type_fails() {
        let mut model: ModelData = serde_json::from_value(json!({
            "intents": { "A": { "entities": { "x": {} } } }
        }))
        .unwrap();
        let err = export_model(&mut model, "en").unwrap_err();
        assert!(matches!(err, Error::InvalidEntityType { ref entity, .. } if entity == "x"));
    }

    #[test]
    fn test_platform_type_without_dialogflow_key_fails() {
        let mut model: ModelData = serde_json::from_value(json!({
            "intents": { "A": { "entities": { "x": { "type": { "alexa": "AMAZON.NUMBER" } } } } }
        }))
        .unwrap();
        let err = export_model(&mut model, "en").unwrap_err();
        assert!(err.to_string().contains("dialogflow"));
    }
}
