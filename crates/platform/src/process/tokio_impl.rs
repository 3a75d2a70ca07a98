//! Process operations backed by `tokio::process`

use async_trait::async_trait;
use flowtidy_errors::{Error, PlatformError};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use super::{CommandOutput, PlatformCommand, ProcessOperations};

/// Spawns real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessOperations;

impl TokioProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessOperations for TokioProcessOperations {
    async fn execute_command(&self, cmd: &PlatformCommand) -> Result<CommandOutput, Error> {
        let start = Instant::now();

        let mut command = Command::new(cmd.program());
        command
            .args(cmd.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // dropping the wait future on timeout must not leave the child running
            .kill_on_drop(true);
        if let Some(dir) = cmd.get_current_dir() {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PlatformError::CommandNotFound {
                command: cmd.program().to_string(),
            },
            _ => PlatformError::ProcessExecutionFailed {
                command: cmd.to_string(),
                message: e.to_string(),
            },
        })?;

        let wait = child.wait_with_output();
        let output = match cmd.get_timeout() {
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                PlatformError::Timeout {
                    command: cmd.to_string(),
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                }
            })?,
            None => wait.await,
        }
        .map_err(|e| PlatformError::ProcessExecutionFailed {
            command: cmd.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(
            command = %cmd,
            code = ?output.status.code(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "process finished"
        );

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
