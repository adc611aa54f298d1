//! Build command - provision the tool and record the module BOM

use crate::bom::ModuleBom;
use crate::build::{Build, BuildContext};
use crate::cli::args::BuildArgs;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::dependency::{BuildpackToml, DependencyService};
use crate::error::{BomError, BomResult};
use crate::layer::Layers;
use crate::process::ProcessExecutable;
use std::sync::Arc;
use tracing::info;

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> BomResult<()> {
    let working_dir = super::working_dir_or_current(args.working_dir)?;
    let catalog = BuildpackToml::load(&args.buildpack_dir.join("buildpack.toml"))
        .await
        .map_err(|e| BomError::Resolution {
            id: config.tool.id.clone(),
            version: config.tool.version.clone(),
            stack: args.stack.clone(),
            reason: e.to_string(),
        })?;

    let context = BuildContext {
        buildpack: catalog.buildpack,
        cnb_path: args.buildpack_dir,
        platform_path: args.platform,
        layers: Layers::new(args.layers),
        stack: args.stack,
        working_dir,
    };

    let executable = Arc::new(ProcessExecutable::new(config.tool.executable.as_str()));
    let build = Build::new(
        Arc::new(DependencyService::new()),
        Arc::new(ModuleBom::new(executable, config.tool.report_file.as_str())),
        Arc::new(SystemClock),
        config.tool.clone(),
    );

    let result = build.run(&context).await?;
    result.persist(&context.layers).await?;

    info!(
        "  Recorded {} build and {} launch BOM entries",
        result.build_bom.len(),
        result.launch_bom.len()
    );
    Ok(())
}
