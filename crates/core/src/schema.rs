//! Column naming for node tables
//!
//! Historical versions of the terrain analysis tool name the node id and
//! receiver columns differently (`NI`/`receiver_NI` vs `node`/`receiver_node`),
//! so every column name is configurable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Names of the node table columns.
///
/// Missing keys in a TOML file fall back to [`NodeSchema::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSchema {
    pub node_id: String,
    pub receiver: String,
    pub source_key: String,
    pub longitude: String,
    pub latitude: String,
    pub elevation: String,
    pub flow_distance: String,
    pub drainage_area: String,
    pub chi: String,
    pub m_chi: String,
    pub basin_key: String,
}

impl Default for NodeSchema {
    fn default() -> Self {
        Self {
            node_id: "NI".into(),
            receiver: "receiver_NI".into(),
            source_key: "source_key".into(),
            longitude: "longitude".into(),
            latitude: "latitude".into(),
            elevation: "elevation".into(),
            flow_distance: "flow_distance".into(),
            drainage_area: "drainage_area".into(),
            chi: "chi".into(),
            m_chi: "m_chi".into(),
            basin_key: "basin_key".into(),
        }
    }
}

impl NodeSchema {
    /// Older `node` / `receiver_node` naming.
    pub fn legacy() -> Self {
        Self {
            node_id: "node".into(),
            receiver: "receiver_node".into(),
            ..Self::default()
        }
    }

    /// Parse a schema from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let schema: Self = toml::from_str(text)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Load a schema from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Every column name must be non-empty and the required ones distinct.
    pub fn validate(&self) -> Result<()> {
        let required = self.required();
        for (field, name) in required.iter().chain(self.optional().iter()) {
            if name.trim().is_empty() {
                return Err(Error::Config(format!("column name for `{}` is empty", field)));
            }
        }
        for (i, (field, name)) in required.iter().enumerate() {
            if let Some((other, _)) = required[i + 1..].iter().find(|(_, n)| n == name) {
                return Err(Error::Config(format!(
                    "`{}` and `{}` both map to column `{}`",
                    field, other, name
                )));
            }
        }
        Ok(())
    }

    /// (field, column) pairs that must be present in every table.
    pub fn required(&self) -> [(&'static str, &str); 8] {
        [
            ("node_id", self.node_id.as_str()),
            ("receiver", self.receiver.as_str()),
            ("source_key", self.source_key.as_str()),
            ("longitude", self.longitude.as_str()),
            ("latitude", self.latitude.as_str()),
            ("elevation", self.elevation.as_str()),
            ("flow_distance", self.flow_distance.as_str()),
            ("drainage_area", self.drainage_area.as_str()),
        ]
    }

    /// (field, column) pairs that may be absent.
    pub fn optional(&self) -> [(&'static str, &str); 3] {
        [
            ("chi", self.chi.as_str()),
            ("m_chi", self.m_chi.as_str()),
            ("basin_key", self.basin_key.as_str()),
        ]
    }

    /// Whether `column` is one of the columns this schema interprets.
    pub fn knows(&self, column: &str) -> bool {
        self.required()
            .iter()
            .chain(self.optional().iter())
            .any(|(_, name)| *name == column)
    }
}
