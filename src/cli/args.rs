//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// module-bom - Node.js module bill of materials for buildpack builds
///
/// Provisions the cyclonedx-node-module tool into a cached layer and records
/// the application's modules in the build and launch BOMs.
#[derive(Parser, Debug)]
#[command(name = "module-bom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path (defaults to module-bom.toml in the buildpack directory)
    #[arg(short, long, global = true, env = "MODULE_BOM_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether the application has a package.json
    Detect(DetectArgs),

    /// Install the BOM tool and record the module BOM
    Build(BuildArgs),
}

/// Arguments for the detect command
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Application directory (defaults to current directory)
    #[arg(short, long)]
    pub working_dir: Option<PathBuf>,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Layers directory
    #[arg(long, env = "CNB_LAYERS_DIR")]
    pub layers: PathBuf,

    /// Platform directory
    #[arg(long, env = "CNB_PLATFORM_DIR", default_value = "/platform")]
    pub platform: PathBuf,

    /// Buildpack directory containing buildpack.toml
    #[arg(long, env = "CNB_BUILDPACK_DIR")]
    pub buildpack_dir: PathBuf,

    /// Stack identifier used to select dependencies
    #[arg(long, env = "CNB_STACK_ID")]
    pub stack: String,

    /// Application directory (defaults to current directory)
    #[arg(short, long)]
    pub working_dir: Option<PathBuf>,
}
