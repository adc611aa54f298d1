//! Dependency resolution and delivery
//!
//! Dependencies are described in the `[[metadata.dependencies]]` catalog of
//! `buildpack.toml`. A [`DependencyManager`] resolves one of those entries
//! for the current stack, delivers it into a layer and describes it as a
//! BOM entry.

pub mod catalog;
pub mod service;

pub use catalog::{BuildpackInfo, BuildpackToml};
pub use service::DependencyService;

use crate::bom::BomEntry;
use crate::error::BomResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A concrete dependency resolved from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub version: String,

    /// Hex-encoded SHA-256 of the artifact at `uri`
    pub sha256: String,

    pub uri: String,

    /// Stacks this artifact runs on ("*" for any)
    #[serde(default)]
    pub stacks: Vec<String>,

    /// Leading path components dropped when extracting
    #[serde(default, rename = "strip-components")]
    pub strip_components: u32,
}

/// Resolves, delivers and describes dependencies
#[async_trait]
pub trait DependencyManager: Send + Sync {
    /// Pick the dependency matching `id`, `version` and `stack` from the catalog
    async fn resolve(
        &self,
        catalog_path: &Path,
        id: &str,
        version: &str,
        stack: &str,
    ) -> BomResult<Dependency>;

    /// Fetch the dependency and install it into `layer_path`
    async fn deliver(
        &self,
        dependency: &Dependency,
        cnb_path: &Path,
        layer_path: &Path,
        platform_path: &Path,
    ) -> BomResult<()>;

    /// Describe dependencies as BOM entries
    fn generate_bill_of_materials(&self, dependencies: &[Dependency]) -> Vec<BomEntry>;
}

/// One BOM entry per dependency, named by id
pub fn bill_of_materials(dependencies: &[Dependency]) -> Vec<BomEntry> {
    dependencies
        .iter()
        .map(|dependency| {
            BomEntry::new(dependency.id.as_str())
                .with("name", dependency.name.as_str())
                .with("version", dependency.version.as_str())
                .with("sha256", dependency.sha256.as_str())
                .with("stacks", dependency.stacks.clone())
                .with("uri", dependency.uri.as_str())
        })
        .collect()
}
