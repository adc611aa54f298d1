//! Configuration schema for module-bom
//!
//! Configuration is read from `module-bom.toml` next to `buildpack.toml`,
//! or from the path given with `--config`.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Analysis tool settings
    pub tool: ToolConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Analysis tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Dependency id in the buildpack.toml catalog
    pub id: String,

    /// Version constraint ("*" for any, "default" for the catalog default)
    pub version: String,

    /// Name of the cache layer holding the tool
    pub layer: String,

    /// Executable name looked up on the search path
    pub executable: String,

    /// Report file written by the tool into the working directory
    pub report_file: String,

    /// Directory inside the layer that holds the executable
    pub bin_dir: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            id: "cyclonedx-node-module".to_string(),
            version: "*".to_string(),
            layer: "cyclonedx-node-module".to_string(),
            executable: "cyclonedx-bom".to_string(),
            report_file: "bom.json".to_string(),
            bin_dir: "bin".to_string(),
        }
    }
}
