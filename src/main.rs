//! module-bom - buildpack entry point
//!
//! CLI entry point that dispatches to detect and build.

use clap::Parser;
use console::style;
use module_bom::cli::{Cli, Commands};
use module_bom::config::{Config, ConfigManager};
use module_bom::detect::DETECT_FAIL_CODE;
use module_bom::error::BomResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> BomResult<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(&cli).await?;
    init_logging(cli.verbose, &config);

    match cli.command {
        Commands::Detect(args) => {
            if module_bom::cli::commands::detect(args).await? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(DETECT_FAIL_CODE))
            }
        }
        Commands::Build(args) => {
            module_bom::cli::commands::build(args, &config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn load_config(cli: &Cli) -> BomResult<Config> {
    let manager = match (&cli.config, &cli.command) {
        (Some(path), _) => ConfigManager::with_path(path.clone()),
        (None, Commands::Build(args)) => ConfigManager::new(&args.buildpack_dir),
        (None, Commands::Detect(_)) => return Ok(Config::default()),
    };
    manager.load().await
}

/// Build logs go to stdout: 0 = info, 1 = debug, 2+ = trace
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("module_bom=info"),
        1 => EnvFilter::new("module_bom=debug"),
        _ => EnvFilter::new("module_bom=trace"),
    };

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(false)
            .without_time()
            .init();
    }
}
