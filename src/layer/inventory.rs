//! Tool layer reuse
//!
//! Decides whether the layer left by a previous build still holds the
//! resolved dependency. The decision is keyed solely on the recorded
//! `dependency-sha`:
//!
//! | Recorded sha | Action |
//! |--------------|--------|
//! | equal | reuse contents and metadata as-is |
//! | different / absent | reset, deliver, record new sha + timestamp |

use crate::clock::{format_duration, measure, Clock};
use crate::dependency::{Dependency, DependencyManager};
use crate::error::BomResult;
use crate::layer::{keys, Layer, Layers};
use std::path::Path;
use tracing::{debug, info};

/// Provides dependency layers, reusing cached contents when valid
pub struct LayerInventory<'a> {
    layers: &'a Layers,
    manager: &'a dyn DependencyManager,
    clock: &'a dyn Clock,
}

impl<'a> LayerInventory<'a> {
    pub fn new(
        layers: &'a Layers,
        manager: &'a dyn DependencyManager,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            layers,
            manager,
            clock,
        }
    }

    /// Return layer `name` holding `dependency`, delivering it if needed.
    ///
    /// A failed delivery leaves an empty layer with no metadata.
    pub async fn obtain(
        &self,
        name: &str,
        dependency: &Dependency,
        cnb_path: &Path,
        platform_path: &Path,
    ) -> BomResult<Layer> {
        let layer = self.layers.get(name).await?;

        if layer.dependency_sha() == Some(dependency.sha256.as_str()) {
            info!("  Reusing cached layer {}", layer.path.display());
            return Ok(layer);
        }

        debug!(
            "Layer {} is stale (cached {:?}, resolved {})",
            name,
            layer.dependency_sha(),
            dependency.sha256
        );

        let mut layer = layer.reset().await?;

        info!("  Executing build process");
        info!("    Installing {} {}", dependency.name, dependency.version);

        let (delivered, elapsed) = measure(self.manager.deliver(
            dependency,
            cnb_path,
            &layer.path,
            platform_path,
        ))
        .await;
        delivered?;

        info!("      Completed in {}", format_duration(elapsed));

        layer.metadata.insert(
            keys::DEPENDENCY_SHA.to_string(),
            dependency.sha256.clone().into(),
        );
        layer
            .metadata
            .insert(keys::BUILT_AT.to_string(), self.clock.timestamp().into());

        Ok(layer)
    }
}
