//! Detection
//!
//! The buildpack applies to any application with a `package.json`.

use crate::error::{BomError, BomResult};
use std::path::Path;
use tracing::debug;

/// Exit code signalling that the buildpack does not apply
pub const DETECT_FAIL_CODE: u8 = 100;

/// Manifest whose presence marks a Node.js application
pub const PACKAGE_JSON: &str = "package.json";

/// Whether the buildpack should participate for `working_dir`
pub async fn detect(working_dir: &Path) -> BomResult<bool> {
    let manifest = working_dir.join(PACKAGE_JSON);
    let found = tokio::fs::try_exists(&manifest)
        .await
        .map_err(|e| BomError::io(format!("checking {}", manifest.display()), e))?;

    debug!("{} present: {}", manifest.display(), found);
    Ok(found)
}
