use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::AppError;

crate::stored_enum! {
    /// How a source stream is read.
    pub enum SyncMode {
        FullRefresh => "full_refresh",
        Incremental => "incremental",
    }
}

crate::stored_enum! {
    /// How records are written to the destination.
    pub enum DestinationSyncMode {
        Append => "append",
        Overwrite => "overwrite",
        AppendDedup => "append_dedup",
    }
}

/// A stream as discovered from a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirbyteStream {
    pub name: String,
    pub json_schema: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_sync_modes: Option<Vec<SyncMode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_defined_cursor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cursor_field: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_defined_primary_key: Option<Vec<Vec<String>>>,
    /// Keys this model does not know about are carried through untouched.
    #[serde(flatten)]
    pub additional: Map<String, JsonValue>,
}

/// Catalog as discovered from a source (streams + schemas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirbyteCatalog {
    pub streams: Vec<AirbyteStream>,
    #[serde(flatten)]
    pub additional: Map<String, JsonValue>,
}

/// A stream selected for a connection together with its sync settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredAirbyteStream {
    pub stream: AirbyteStream,
    pub sync_mode: SyncMode,
    pub destination_sync_mode: DestinationSyncMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_field: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<Vec<String>>>,
    #[serde(flatten)]
    pub additional: Map<String, JsonValue>,
}

/// Catalog stored on a connection (streams + schemas + per-stream sync settings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredAirbyteCatalog {
    pub streams: Vec<ConfiguredAirbyteStream>,
    #[serde(flatten)]
    pub additional: Map<String, JsonValue>,
}

/// Shared access to the per-stream JSON schemas of both catalog shapes.
pub trait CatalogDocument: Sized + for<'de> Deserialize<'de> {
    const KIND: &'static str;

    fn schemas(&self) -> Box<dyn Iterator<Item = &JsonValue> + '_>;

    fn schemas_mut(&mut self) -> Box<dyn Iterator<Item = &mut JsonValue> + '_>;

    /// Decodes a stored document and checks its structural shape.
    fn from_json(value: JsonValue) -> Result<Self, AppError> {
        let doc: Self = serde_json::from_value(value).map_err(|e| {
            AppError::CatalogValidation(format!("{} is malformed: {}", Self::KIND, e))
        })?;
        doc.validate()?;
        Ok(doc)
    }

    fn validate(&self) -> Result<(), AppError> {
        for (idx, schema) in self.schemas().enumerate() {
            if !schema.is_object() {
                return Err(AppError::CatalogValidation(format!(
                    "{} stream #{} has a json_schema that is not an object",
                    Self::KIND,
                    idx
                )));
            }
        }
        Ok(())
    }
}

impl CatalogDocument for AirbyteCatalog {
    const KIND: &'static str = "catalog";

    fn schemas(&self) -> Box<dyn Iterator<Item = &JsonValue> + '_> {
        Box::new(self.streams.iter().map(|s| &s.json_schema))
    }

    fn schemas_mut(&mut self) -> Box<dyn Iterator<Item = &mut JsonValue> + '_> {
        Box::new(self.streams.iter_mut().map(|s| &mut s.json_schema))
    }
}

impl CatalogDocument for ConfiguredAirbyteCatalog {
    const KIND: &'static str = "configured catalog";

    fn schemas(&self) -> Box<dyn Iterator<Item = &JsonValue> + '_> {
        Box::new(self.streams.iter().map(|s| &s.stream.json_schema))
    }

    fn schemas_mut(&mut self) -> Box<dyn Iterator<Item = &mut JsonValue> + '_> {
        Box::new(self.streams.iter_mut().map(|s| &mut s.stream.json_schema))
    }
}
