//! CycloneDX report decoding
//!
//! Only the fields that end up in the BOM are decoded. Missing and `null`
//! fields decode to empty values rather than failing the report.

use super::{keys, BomEntry};
use serde::{Deserialize, Deserializer};

/// Top-level report written by `cyclonedx-bom`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CycloneDxReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<ComponentRecord>,
}

/// A discovered component
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub purl: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub licenses: Vec<LicenseChoice>,
}

/// One element of a component's `licenses` array
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LicenseChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub license: License,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct License {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

/// Decode `null` the same way as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl CycloneDxReport {
    /// Decode a report from raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Map every component to a BOM entry, keeping report order
    pub fn into_entries(self) -> Vec<BomEntry> {
        self.components
            .into_iter()
            .map(ComponentRecord::into_entry)
            .collect()
    }
}

impl ComponentRecord {
    pub fn into_entry(self) -> BomEntry {
        let licenses: Vec<String> = self
            .licenses
            .into_iter()
            .map(|choice| choice.license.id)
            .collect();

        BomEntry::new(self.name)
            .with(keys::VERSION, self.version)
            .with(keys::PURL, self.purl)
            .with(keys::LICENSES, licenses)
    }
}
