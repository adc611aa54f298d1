//! Bill of materials entries
//!
//! A [`BomEntry`] is one component in the build or launch BOM: a name plus a
//! free-form metadata table. Entries are written verbatim into the
//! `[[bom]]` arrays of `build.toml` and `launch.toml`.

pub mod module;
pub mod report;

pub use module::{ModuleBom, ModuleBomGenerator};
pub use report::{ComponentRecord, CycloneDxReport};

use serde::{Deserialize, Serialize};

/// Metadata keys used on module entries
pub mod keys {
    pub const VERSION: &str = "version";
    pub const PURL: &str = "purl";
    pub const LICENSES: &str = "licenses";
}

/// A single component in a bill of materials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomEntry {
    /// Component name
    pub name: String,

    /// Free-form metadata (version, purl, licenses, checksums...)
    #[serde(default)]
    pub metadata: toml::Table,
}

impl BomEntry {
    /// Create an entry with empty metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: toml::Table::new(),
        }
    }

    /// Add a metadata value, builder style
    pub fn with(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Read a string metadata value
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    pub fn version(&self) -> Option<&str> {
        self.metadata_str(keys::VERSION)
    }

    pub fn purl(&self) -> Option<&str> {
        self.metadata_str(keys::PURL)
    }

    /// License identifiers in recorded order
    pub fn licenses(&self) -> Vec<&str> {
        self.metadata
            .get(keys::LICENSES)
            .and_then(|v| v.as_array())
            .map(|ids| ids.iter().filter_map(|id| id.as_str()).collect())
            .unwrap_or_default()
    }
}
