//! Execution environment handed to child processes
//!
//! Instead of mutating the process-wide `PATH`, each build carries an
//! [`ExecutionEnv`] snapshot. Directories appended to it are visible only
//! to executions that receive this value.

use crate::error::{BomError, BomResult};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Search path and related settings for spawned tools
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionEnv {
    search_path: Vec<PathBuf>,
}

impl ExecutionEnv {
    /// Snapshot the current process `PATH`
    pub fn from_process() -> Self {
        let search_path = std::env::var_os("PATH")
            .map(|path| {
                std::env::split_paths(&path)
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self { search_path }
    }

    /// Build an environment with an explicit search path
    pub fn with_search_path(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    /// Append a directory to the end of the search path
    pub fn append_path(&mut self, dir: impl Into<PathBuf>) {
        self.search_path.push(dir.into());
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// The search path joined with the platform separator, as `PATH` expects
    pub fn path_var(&self) -> BomResult<OsString> {
        std::env::join_paths(&self.search_path)
            .map_err(|e| BomError::Internal(format!("invalid search path entry: {}", e)))
    }

    /// Locate an executable on the search path
    pub fn lookup(&self, program: &str, cwd: &Path) -> Option<PathBuf> {
        let path_var = self.path_var().ok()?;
        which::which_in(program, Some(path_var), cwd).ok()
    }
}
