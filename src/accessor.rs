//! Uniform read access to both canonical model shapes.
//!
//! The exporter only talks to [`ModelAccessor`], so it never needs to know
//! whether it was handed a current or a legacy model.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::types::{
    CanonicalModel, EntityType, Intent, IntentEntity, LegacyInput, LegacyIntent, LegacyModelData,
    ModelData,
};

pub trait ModelAccessor {
    /// Whether this is the legacy model shape.
    fn is_legacy(&self) -> bool;

    /// Name of the entity-type collection in this shape, for error messages.
    fn entity_types_key(&self) -> &'static str {
        if self.is_legacy() {
            "inputTypes"
        } else {
            "entityTypes"
        }
    }

    /// Intent names in model order.
    fn intent_names(&self) -> Vec<&str>;

    fn intent(&self, name: &str) -> Option<Cow<'_, Intent>>;

    /// Whether the model declares an entity-type collection at all.
    fn has_entity_types(&self) -> bool;

    fn entity_type(&self, name: &str) -> Option<Cow<'_, EntityType>>;

    /// Model-level escape hatch of a vendor.
    fn platform_data(&self, vendor: &str) -> Option<&Value>;

    fn platform_data_mut(&mut self, vendor: &str) -> Option<&mut Value>;
}

impl ModelAccessor for ModelData {
    fn is_legacy(&self) -> bool {
        false
    }

    fn intent_names(&self) -> Vec<&str> {
        self.intents.keys().map(String::as_str).collect()
    }

    fn intent(&self, name: &str) -> Option<Cow<'_, Intent>> {
        self.intents.get(name).map(Cow::Borrowed)
    }

    fn has_entity_types(&self) -> bool {
        self.entity_types.is_some()
    }

    fn entity_type(&self, name: &str) -> Option<Cow<'_, EntityType>> {
        self.entity_types
            .as_ref()
            .and_then(|types| types.get(name))
            .map(Cow::Borrowed)
    }

    fn platform_data(&self, vendor: &str) -> Option<&Value> {
        self.platforms.get(vendor)
    }

    fn platform_data_mut(&mut self, vendor: &str) -> Option<&mut Value> {
        self.platforms.get_mut(vendor)
    }
}

impl ModelAccessor for LegacyModelData {
    fn is_legacy(&self) -> bool {
        true
    }

    fn intent_names(&self) -> Vec<&str> {
        self.intents.iter().map(|intent| intent.name.as_str()).collect()
    }

    fn intent(&self, name: &str) -> Option<Cow<'_, Intent>> {
        self.intents
            .iter()
            .find(|intent| intent.name == name)
            .map(|intent| Cow::Owned(legacy_intent_view(intent)))
    }

    fn has_entity_types(&self) -> bool {
        self.input_types.is_some()
    }

    fn entity_type(&self, name: &str) -> Option<Cow<'_, EntityType>> {
        self.input_types
            .as_ref()?
            .iter()
            .find(|input_type| input_type.name == name)
            .map(|input_type| {
                Cow::Owned(EntityType {
                    values: input_type.values.clone(),
                    platforms: input_type.platforms.clone(),
                })
            })
    }

    fn platform_data(&self, vendor: &str) -> Option<&Value> {
        self.platforms.get(vendor)
    }

    fn platform_data_mut(&mut self, vendor: &str) -> Option<&mut Value> {
        self.platforms.get_mut(vendor)
    }
}

impl ModelAccessor for CanonicalModel {
    fn is_legacy(&self) -> bool {
        matches!(self, CanonicalModel::Legacy(_))
    }

    fn intent_names(&self) -> Vec<&str> {
        match self {
            CanonicalModel::Current(model) => model.intent_names(),
            CanonicalModel::Legacy(model) => model.intent_names(),
        }
    }

    fn intent(&self, name: &str) -> Option<Cow<'_, Intent>> {
        match self {
            CanonicalModel::Current(model) => model.intent(name),
            CanonicalModel::Legacy(model) => model.intent(name),
        }
    }

    fn has_entity_types(&self) -> bool {
        match self {
            CanonicalModel::Current(model) => model.has_entity_types(),
            CanonicalModel::Legacy(model) => model.has_entity_types(),
        }
    }

    fn entity_type(&self, name: &str) -> Option<Cow<'_, EntityType>> {
        match self {
            CanonicalModel::Current(model) => model.entity_type(name),
            CanonicalModel::Legacy(model) => model.entity_type(name),
        }
    }

    fn platform_data(&self, vendor: &str) -> Option<&Value> {
        match self {
            CanonicalModel::Current(model) => model.platform_data(vendor),
            CanonicalModel::Legacy(model) => model.platform_data(vendor),
        }
    }

    fn platform_data_mut(&mut self, vendor: &str) -> Option<&mut Value> {
        match self {
            CanonicalModel::Current(model) => model.platform_data_mut(vendor),
            CanonicalModel::Legacy(model) => model.platform_data_mut(vendor),
        }
    }
}

fn legacy_intent_view(intent: &LegacyIntent) -> Intent {
    let entities = intent.inputs.as_ref().map(|inputs| {
        inputs
            .iter()
            .map(|input| (input.name.clone(), legacy_input_view(input)))
            .collect::<BTreeMap<_, _>>()
    });

    Intent {
        phrases: intent.phrases.clone(),
        entities,
        platforms: intent.platforms.clone(),
    }
}

fn legacy_input_view(input: &LegacyInput) -> IntentEntity {
    IntentEntity {
        entity_type: input.input_type.clone(),
        text: input.text.clone(),
        platforms: input.platforms.clone(),
    }
}
