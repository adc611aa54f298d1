//! Build layers
//!
//! A layer is a directory under the layers root plus a sibling
//! `<name>.toml` file recording its types and metadata:
//!
//! ```toml
//! [types]
//! build = false
//! launch = false
//! cache = true
//!
//! [metadata]
//! dependency-sha = "..."
//! built_at = "2024-01-15T10:00:00.000000000Z"
//! ```
//!
//! The metadata file is the only record of what a cached layer holds.

pub mod inventory;

pub use inventory::LayerInventory;

use crate::error::{BomError, BomResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Metadata keys recorded on the tool layer
pub mod keys {
    /// SHA-256 of the dependency the layer contents came from
    pub const DEPENDENCY_SHA: &str = "dependency-sha";
    /// When the layer was last provisioned (RFC 3339)
    pub const BUILT_AT: &str = "built_at";
}

/// The layers root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layers {
    pub path: PathBuf,
}

/// A single layer
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub path: PathBuf,
    pub build: bool,
    pub launch: bool,
    pub cache: bool,
    pub metadata: toml::Table,
}

/// On-disk `<name>.toml`
#[derive(Debug, Default, Serialize, Deserialize)]
struct LayerToml {
    #[serde(default)]
    types: LayerTypes,
    #[serde(default)]
    metadata: toml::Table,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LayerTypes {
    #[serde(default)]
    build: bool,
    #[serde(default)]
    launch: bool,
    #[serde(default)]
    cache: bool,
}

/// Layer names become file names, so only allow a safe character set
fn validate_layer_name(name: &str) -> BomResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(BomError::Layer {
            name: name.to_string(),
            reason: "must contain only alphanumeric characters, hyphens, or underscores"
                .to_string(),
        });
    }
    Ok(())
}

impl Layers {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Look up a layer, loading any metadata left by a previous build.
    ///
    /// Nothing is created on disk.
    pub async fn get(&self, name: &str) -> BomResult<Layer> {
        validate_layer_name(name)?;

        let mut layer = Layer {
            name: name.to_string(),
            path: self.path.join(name),
            build: false,
            launch: false,
            cache: false,
            metadata: toml::Table::new(),
        };

        let metadata_file = layer.metadata_file();
        let content = match fs::read_to_string(&metadata_file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No metadata for layer {}", name);
                return Ok(layer);
            }
            Err(e) => {
                return Err(BomError::io(
                    format!("reading {}", metadata_file.display()),
                    e,
                ))
            }
        };

        let parsed: LayerToml = toml::from_str(&content).map_err(|e| BomError::Layer {
            name: name.to_string(),
            reason: format!("{}: {}", metadata_file.display(), e),
        })?;

        layer.build = parsed.types.build;
        layer.launch = parsed.types.launch;
        layer.cache = parsed.types.cache;
        layer.metadata = parsed.metadata;
        Ok(layer)
    }

    /// Persist a layer's types and metadata to `<name>.toml`
    pub async fn write(&self, layer: &Layer) -> BomResult<()> {
        fs::create_dir_all(&self.path)
            .await
            .map_err(|e| BomError::io(format!("creating {}", self.path.display()), e))?;

        let content = toml::to_string(&LayerToml {
            types: LayerTypes {
                build: layer.build,
                launch: layer.launch,
                cache: layer.cache,
            },
            metadata: layer.metadata.clone(),
        })?;

        let metadata_file = layer.metadata_file();
        fs::write(&metadata_file, content)
            .await
            .map_err(|e| BomError::io(format!("writing {}", metadata_file.display()), e))
    }
}

impl Layer {
    /// Path of the sibling `<name>.toml`
    pub fn metadata_file(&self) -> PathBuf {
        let mut file = self.path.clone().into_os_string();
        file.push(".toml");
        PathBuf::from(file)
    }

    /// Checksum recorded by the last provisioning, if any
    pub fn dependency_sha(&self) -> Option<&str> {
        self.metadata
            .get(keys::DEPENDENCY_SHA)
            .and_then(|v| v.as_str())
    }

    /// Directory inside the layer holding executables
    pub fn bin_dir(&self, dir: impl AsRef<Path>) -> PathBuf {
        self.path.join(dir)
    }

    /// Wipe the layer: empty directory, no metadata file, all flags cleared
    pub async fn reset(mut self) -> BomResult<Self> {
        remove_if_exists(&self.path, true).await?;
        remove_if_exists(&self.metadata_file(), false).await?;

        fs::create_dir_all(&self.path)
            .await
            .map_err(|e| BomError::io(format!("creating {}", self.path.display()), e))?;

        self.build = false;
        self.launch = false;
        self.cache = false;
        self.metadata.clear();
        Ok(self)
    }
}

async fn remove_if_exists(path: &Path, dir: bool) -> BomResult<()> {
    let result = if dir {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BomError::io(format!("removing {}", path.display()), e)),
    }
}
