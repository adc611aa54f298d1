//! `buildpack.toml` dependency catalog
//!
//! ```toml
//! [buildpack]
//! id = "paketo-community/node-module-bom"
//! name = "Node Module BOM"
//! version = "0.1.0"
//!
//! [metadata.default-versions]
//! cyclonedx-node-module = "3.*"
//!
//! [[metadata.dependencies]]
//! id = "cyclonedx-node-module"
//! name = "CycloneDX Node.js Module"
//! version = "3.0.0"
//! sha256 = "..."
//! uri = "https://..."
//! stacks = ["io.buildpacks.stacks.bionic"]
//! ```

use crate::dependency::Dependency;
use crate::error::{BomError, BomResult};
use semver::{Version, VersionReq};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Parsed `buildpack.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildpackToml {
    #[serde(default)]
    pub buildpack: BuildpackInfo,

    #[serde(default)]
    pub metadata: CatalogMetadata,
}

/// The `[buildpack]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildpackInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// The `[metadata]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    #[serde(default, rename = "default-versions")]
    pub default_versions: HashMap<String, String>,
}

impl BuildpackToml {
    pub async fn load(path: &Path) -> BomResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BomError::io(format!("reading {}", path.display()), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> BomResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Select the highest version of `id` that satisfies `version` on `stack`.
    ///
    /// `version` may be a semver requirement, `*`, or empty/`default` to
    /// use the catalog's default version for `id`.
    pub fn resolve(&self, id: &str, version: &str, stack: &str) -> BomResult<Dependency> {
        let failure = |reason: String| BomError::Resolution {
            id: id.to_string(),
            version: version.to_string(),
            stack: stack.to_string(),
            reason,
        };

        let constraint = match version {
            "" | "default" => self
                .metadata
                .default_versions
                .get(id)
                .map(String::as_str)
                .unwrap_or("*"),
            other => other,
        };

        let requirement = if constraint == "*" {
            VersionReq::STAR
        } else {
            VersionReq::parse(constraint).map_err(|e| {
                failure(format!("invalid version constraint {:?}: {}", constraint, e))
            })?
        };

        let mut supported = Vec::new();
        let mut best: Option<(Version, &Dependency)> = None;

        for dependency in &self.metadata.dependencies {
            if dependency.id != id || !supports_stack(dependency, stack) {
                continue;
            }

            let parsed = parse_version(&dependency.version).ok_or_else(|| {
                failure(format!(
                    "catalog entry has invalid version {:?}",
                    dependency.version
                ))
            })?;
            supported.push(dependency.version.clone());

            if !requirement.matches(&parsed) {
                continue;
            }
            if best.as_ref().is_none_or(|(current, _)| parsed > *current) {
                best = Some((parsed, dependency));
            }
        }

        match best {
            Some((_, dependency)) => {
                debug!("Resolved {} {} for {}", id, dependency.version, stack);
                Ok(dependency.clone())
            }
            None => Err(failure(format!(
                "no compatible versions. Supported versions are: [{}]",
                supported.join(", ")
            ))),
        }
    }
}

fn supports_stack(dependency: &Dependency, stack: &str) -> bool {
    dependency.stacks.iter().any(|s| s == stack || s == "*")
}

/// Parse a catalog version, accepting short forms such as `3` or `3.1`
fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim().trim_start_matches('v');
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let (core, rest) = match trimmed.find(['-', '+']) {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };
    let padded = match core.matches('.').count() {
        0 => format!("{}.0.0{}", core, rest),
        1 => format!("{}.0{}", core, rest),
        _ => return None,
    };
    Version::parse(&padded).ok()
}
