//! Executable backed by a real child process

use crate::error::{BomError, BomResult};
use crate::process::executable::{ExecOutput, Executable, Execution};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs a named program found on the execution search path
pub struct ProcessExecutable {
    name: String,
}

impl ProcessExecutable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn command_line(&self, execution: &Execution) -> String {
        if execution.args.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, execution.args.join(" "))
        }
    }
}

#[async_trait]
impl Executable for ProcessExecutable {
    async fn execute(&self, execution: &Execution) -> BomResult<ExecOutput> {
        let command_line = self.command_line(execution);

        let program = execution
            .env
            .lookup(&self.name, &execution.dir)
            .ok_or_else(|| {
                BomError::tool_execution(&command_line, "executable not found on search path")
            })?;

        debug!("Executing: {} {:?}", program.display(), execution.args);

        let mut child = Command::new(&program)
            .args(&execution.args)
            .current_dir(&execution.dir)
            .env("PATH", execution.env.path_var()?)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BomError::tool_execution(&command_line, e.to_string()))?;

        let log_line = |line: String| debug!("  {}", line);
        let lines = super::stream_child_output(&mut child, &log_line).await?;

        let status = child
            .wait()
            .await
            .map_err(|e| BomError::tool_execution(&command_line, e.to_string()))?;

        let output = ExecOutput { lines };
        if !status.success() {
            return Err(BomError::tool_execution(
                command_line,
                format!("{}\n{}", status, output.tail()),
            ));
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
