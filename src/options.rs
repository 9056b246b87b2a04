//! Options shared by the importer and the exporter.

use unic_langid::LanguageIdentifier;
use uuid::Uuid;

// Namespace for deterministic record ids.
const ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f3c_2a1e_9b4d_4c1a_8e77_d2f0_5a6b_91c3);

/// How the exporter generates `id` fields of native records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// A fresh random UUID per record.
    #[default]
    Random,
    /// A name-based UUID derived from the record's key, stable across exports.
    Deterministic,
}

impl IdStrategy {
    pub fn generate(&self, key: &str) -> String {
        match self {
            IdStrategy::Random => Uuid::new_v4().to_string(),
            IdStrategy::Deterministic => Uuid::new_v5(&ID_NAMESPACE, key.as_bytes()).to_string(),
        }
    }
}

/// Conversion behavior for [`crate::Importer`] and [`crate::Exporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Locale of the converted data, e.g. `en-US`.
    pub locale: String,
    pub id_strategy: IdStrategy,
}

impl ConversionOptions {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            id_strategy: IdStrategy::default(),
        }
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    /// Primary language subtag of the locale (`en` for `en-US`).
    pub fn language(&self) -> String {
        match self.locale.parse::<LanguageIdentifier>() {
            Ok(id) => id.language.to_string(),
            Err(_) => self
                .locale
                .split(['-', '_'])
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase(),
        }
    }

    /// Whether a native message language tag belongs to this locale.
    pub fn matches_language_tag(&self, lang: &str) -> bool {
        lang.eq_ignore_ascii_case(&self.locale) || lang.eq_ignore_ascii_case(&self.language())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_subtag() {
        assert_eq!(ConversionOptions::new("en-US").language(), "en");
        assert_eq!(ConversionOptions::new("de").language(), "de");
        assert_eq!(ConversionOptions::new("pt-BR").language(), "pt");
    }

    #[test]
    fn test_matches_language_tag() {
        let options = ConversionOptions::new("en-US");
        assert!(options.matches_language_tag("en"));
        assert!(options.matches_language_tag("en-us"));
        assert!(!options.matches_language_tag("de"));
    }

    #[test]
    fn test_deterministic_ids_are_stable() {
        let strategy = IdStrategy::Deterministic;
        assert_eq!(strategy.generate("intent:A"), strategy.generate("intent:A"));
        assert_ne!(strategy.generate("intent:A"), strategy.generate("intent:B"));
    }

    #[test]
    fn test_random_ids_differ() {
        let strategy = IdStrategy::Random;
        assert_ne!(strategy.generate("intent:A"), strategy.generate("intent:A"));
    }
}
