//! Detect command - decide whether the buildpack applies

use crate::cli::args::DetectArgs;
use crate::detect::{detect, PACKAGE_JSON};
use crate::error::BomResult;
use tracing::info;

/// Execute the detect command, returning whether detection passed
pub async fn execute(args: DetectArgs) -> BomResult<bool> {
    let working_dir = super::working_dir_or_current(args.working_dir)?;
    let passed = detect(&working_dir).await?;

    if !passed {
        info!("No {} found in {}", PACKAGE_JSON, working_dir.display());
    }
    Ok(passed)
}
