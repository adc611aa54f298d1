//! Build orchestration
//!
//! Resolve the tool, provide its layer, put the layer's `bin` directory on
//! the tool search path, run the module BOM extraction and assemble the
//! build and launch BOMs. Any failure aborts the build with no partial
//! result.

use crate::bom::{BomEntry, ModuleBomGenerator};
use crate::clock::Clock;
use crate::config::ToolConfig;
use crate::dependency::{BuildpackInfo, DependencyManager};
use crate::error::{BomError, BomResult};
use crate::layer::{Layer, LayerInventory, Layers};
use crate::process::ExecutionEnv;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Everything a build needs to know about its surroundings
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub buildpack: BuildpackInfo,
    /// Buildpack root, containing `buildpack.toml`
    pub cnb_path: PathBuf,
    pub platform_path: PathBuf,
    pub layers: Layers,
    pub stack: String,
    /// Application directory the tool runs in
    pub working_dir: PathBuf,
}

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq)]
pub struct BuildResult {
    pub layers: Vec<Layer>,
    /// Tool entries followed by every module entry
    pub build_bom: Vec<BomEntry>,
    /// Module entries only
    pub launch_bom: Vec<BomEntry>,
}

#[derive(Serialize)]
struct BomFile<'a> {
    bom: &'a [BomEntry],
}

impl BuildResult {
    /// Write layer metadata plus `build.toml` and `launch.toml`
    pub async fn persist(&self, layers: &Layers) -> BomResult<()> {
        for layer in &self.layers {
            layers.write(layer).await?;
        }

        write_bom(&layers.path.join("build.toml"), &self.build_bom).await?;
        write_bom(&layers.path.join("launch.toml"), &self.launch_bom).await
    }
}

async fn write_bom(path: &Path, entries: &[BomEntry]) -> BomResult<()> {
    let content = toml::to_string(&BomFile { bom: entries })?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| BomError::io(format!("writing {}", path.display()), e))
}

/// The build step
pub struct Build {
    dependencies: Arc<dyn DependencyManager>,
    module_bom: Arc<dyn ModuleBomGenerator>,
    clock: Arc<dyn Clock>,
    tool: ToolConfig,
    base_env: ExecutionEnv,
}

impl Build {
    /// Create a build whose tool search path starts from the process `PATH`
    pub fn new(
        dependencies: Arc<dyn DependencyManager>,
        module_bom: Arc<dyn ModuleBomGenerator>,
        clock: Arc<dyn Clock>,
        tool: ToolConfig,
    ) -> Self {
        Self {
            dependencies,
            module_bom,
            clock,
            tool,
            base_env: ExecutionEnv::from_process(),
        }
    }

    /// Replace the starting search path
    pub fn with_env(mut self, env: ExecutionEnv) -> Self {
        self.base_env = env;
        self
    }

    pub async fn run(&self, context: &BuildContext) -> BomResult<BuildResult> {
        info!("{} {}", context.buildpack.name, context.buildpack.version);

        info!("  Resolving {} version", self.tool.id);
        let dependency = self
            .dependencies
            .resolve(
                &context.cnb_path.join("buildpack.toml"),
                &self.tool.id,
                &self.tool.version,
                &context.stack,
            )
            .await?;
        info!("    Selected {} version {}", dependency.name, dependency.version);

        let inventory = LayerInventory::new(
            &context.layers,
            self.dependencies.as_ref(),
            self.clock.as_ref(),
        );
        let mut layer = inventory
            .obtain(
                &self.tool.layer,
                &dependency,
                &context.cnb_path,
                &context.platform_path,
            )
            .await?;
        layer.cache = true;

        info!("  Configuring environment");
        let bin_dir = layer.bin_dir(&self.tool.bin_dir);
        let mut env = self.base_env.clone();
        env.append_path(&bin_dir);
        info!("    Appending {} to PATH", bin_dir.display());

        let tool_bom = self
            .dependencies
            .generate_bill_of_materials(std::slice::from_ref(&dependency));

        info!("  Generating module BOM");
        let module_bom = self.module_bom.generate(&context.working_dir, &env).await?;
        debug!(
            "{} tool entries, {} module entries",
            tool_bom.len(),
            module_bom.len()
        );

        let mut build_bom = tool_bom;
        build_bom.extend(module_bom.iter().cloned());

        Ok(BuildResult {
            layers: vec![layer],
            build_bom,
            launch_bom: module_bom,
        })
    }
}
