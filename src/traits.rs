//! Reading and writing canonical model documents as JSON.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::Error,
    types::{CanonicalModel, LegacyModelData, ModelData},
};

/// A model document that can be loaded from and saved to JSON.
///
/// # Example
///
/// ```rust,no_run
/// use dialogflow_model::{CanonicalModel, traits::JsonDocument};
/// let model = CanonicalModel::read_from("models/en-US.json")?;
/// model.write_to("models/en-US.copy.json")?;
/// Ok::<(), dialogflow_model::Error>(())
/// ```
pub trait JsonDocument: Serialize + DeserializeOwned {
    fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        serde_json::from_reader(reader).map_err(Error::Parse)
    }

    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn from_json_str(s: &str) -> Result<Self, Error> {
        serde_json::from_str(s).map_err(Error::Parse)
    }

    /// Writes pretty-printed JSON.
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(writer, self).map_err(Error::Parse)
    }

    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn to_json_string(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::Parse)
    }
}

impl JsonDocument for CanonicalModel {}
impl JsonDocument for ModelData {}
impl JsonDocument for LegacyModelData {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::ModelAccessor;

    #[test]
    fn test_read_write_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let model = CanonicalModel::from_json_str(
            r#"{ "invocation": "demo", "intents": [{ "name": "HelloWorldIntent", "phrases": ["hi"] }] }"#,
        )
        .unwrap();
        model.write_to(&path).unwrap();

        let reloaded = CanonicalModel::read_from(&path).unwrap();
        assert!(reloaded.is_legacy());
        assert_eq!(reloaded, model);
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let err = ModelData::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = ModelData::read_from("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
