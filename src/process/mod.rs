//! Tool invocation
//!
//! Runs the provisioned analysis tool as a child process with an explicit
//! search path, collecting its combined output for diagnostics.

pub mod env;
mod executable;
mod native;

pub use env::ExecutionEnv;
pub use executable::{ExecOutput, Executable, Execution};
pub use native::ProcessExecutable;

use crate::error::{BomError, BomResult};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Max number of output lines to include in tool error messages.
const ERROR_TAIL_LINES: usize = 50;

/// Return the last `ERROR_TAIL_LINES` lines of collected output.
pub(crate) fn build_error_output(lines: &[String]) -> String {
    let start = lines.len().saturating_sub(ERROR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Stream stdout+stderr from a child process, calling `on_output` for each line.
///
/// Both pipes are drained until EOF. Lines are read as raw bytes and decoded
/// lossily, so output that is not valid UTF-8 never stops a pipe from being
/// read. Returns all collected output lines in arrival order.
pub(crate) async fn stream_child_output(
    child: &mut tokio::process::Child,
    on_output: &(dyn Fn(String) + Send + Sync),
) -> BomResult<Vec<String>> {
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| BomError::Internal("child stderr was not piped".to_string()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| BomError::Internal("child stdout was not piped".to_string()))?;

    let mut stderr_reader = BufReader::new(stderr);
    let mut stdout_reader = BufReader::new(stdout);
    // Partial reads survive a cancelled select branch in these buffers.
    let mut stderr_buf = Vec::new();
    let mut stdout_buf = Vec::new();

    let mut all_output = Vec::new();
    let mut stderr_done = false;
    let mut stdout_done = false;

    while !stderr_done || !stdout_done {
        let (read, buf, done) = tokio::select! {
            read = stderr_reader.read_until(b'\n', &mut stderr_buf), if !stderr_done => {
                (read, &mut stderr_buf, &mut stderr_done)
            }
            read = stdout_reader.read_until(b'\n', &mut stdout_buf), if !stdout_done => {
                (read, &mut stdout_buf, &mut stdout_done)
            }
        };

        let read = read.map_err(|e| BomError::io("reading tool output", e))?;
        if read == 0 {
            *done = true;
        }
        if !buf.is_empty() {
            let line = take_line(buf);
            on_output(line.clone());
            all_output.push(line);
        }
    }

    Ok(all_output)
}

/// Decode and clear a buffered line, dropping its terminator
fn take_line(buf: &mut Vec<u8>) -> String {
    let mut end = buf.len();
    if buf[..end].ends_with(b"\n") {
        end -= 1;
    }
    if buf[..end].ends_with(b"\r") {
        end -= 1;
    }
    let line = String::from_utf8_lossy(&buf[..end]).into_owned();
    buf.clear();
    line
}
