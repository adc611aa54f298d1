//! Executable abstraction
//!
//! The BOM extractor only needs "run this tool with these arguments in
//! this directory and give me its output". Tests substitute a fake.

use crate::error::BomResult;
use crate::process::env::ExecutionEnv;
use async_trait::async_trait;
use std::path::PathBuf;

/// A single invocation of an executable
#[derive(Debug, Clone)]
pub struct Execution {
    /// Arguments, not including the program name
    pub args: Vec<String>,
    /// Working directory
    pub dir: PathBuf,
    /// Search path used to find the program and passed on as `PATH`
    pub env: ExecutionEnv,
}

/// Combined stdout and stderr of a finished execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub lines: Vec<String>,
}

impl ExecOutput {
    /// The last lines of output, for error messages
    pub fn tail(&self) -> String {
        super::build_error_output(&self.lines)
    }
}

/// Something that can be executed with arguments
#[async_trait]
pub trait Executable: Send + Sync {
    /// Run to completion. Spawn failures and non-zero exits are errors.
    async fn execute(&self, execution: &Execution) -> BomResult<ExecOutput>;

    /// Program name, for logging
    fn name(&self) -> &str;
}
