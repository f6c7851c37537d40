// JSON trailer of .img files

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Describes the radio an image came from. Keys not modelled here are
/// carried in `extra` so a reader can round-trip them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub variant: String,
    #[serde(default)]
    pub rclass: String,

    /// Version of the writer; the key name is part of the file format
    #[serde(default, rename = "chirp_version")]
    pub writer_version: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    pub fn for_radio(vendor: &str, model: &str, rclass: &str) -> Self {
        Self {
            vendor: vendor.to_string(),
            model: model.to_string(),
            variant: String::new(),
            rclass: rclass.to_string(),
            writer_version: crate::VERSION.to_string(),
            extra: Map::new(),
        }
    }

    /// Yaesu FT-817 EEPROM image
    pub fn ft817() -> Self {
        Self::for_radio("Yaesu", "FT-817", "FT817Radio")
    }

    /// Record a dump detail such as how much of the image is valid
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.extra.insert(key.to_string(), value.into());
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
