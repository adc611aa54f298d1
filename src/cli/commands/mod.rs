//! CLI command implementations

pub mod build;
pub mod detect;

pub use build::execute as build;
pub use detect::execute as detect;

use crate::error::{BomError, BomResult};
use std::path::PathBuf;

/// Use the given directory, or the current directory
fn working_dir_or_current(dir: Option<PathBuf>) -> BomResult<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().map_err(|e| BomError::io("getting current directory", e)),
    }
}
