//! Process execution operations

mod tokio_impl;

pub use tokio_impl::TokioProcessOperations;

use async_trait::async_trait;
use flowtidy_errors::{Error, PlatformError};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Command line plus execution limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl PlatformCommand {
    /// Create a new platform command
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout: None,
        }
    }

    /// Build from a full argv, first element being the program
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::EmptyCommand` when `argv` is empty.
    pub fn from_argv<I, S>(argv: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parts = argv.into_iter();
        let program = parts.next().ok_or(PlatformError::EmptyCommand)?;
        let mut cmd = Self::new(program.as_ref());
        cmd.args(parts);
        Ok(cmd)
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Set the working directory for the command
    pub fn current_dir<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Kill the process if it has not exited after `timeout`
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn get_current_dir(&self) -> Option<&PathBuf> {
        self.current_dir.as_ref()
    }

    #[must_use]
    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Display for PlatformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Most useful diagnostic text: stderr when present, else stdout
    #[must_use]
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Trait for process execution operations
#[async_trait]
pub trait ProcessOperations: Send + Sync {
    /// Run `cmd` to completion and capture its output
    ///
    /// A non-zero exit is reported through `CommandOutput::success`, not as an
    /// error. Errors are reserved for spawn failures and timeouts.
    async fn execute_command(&self, cmd: &PlatformCommand) -> Result<CommandOutput, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_argv_splits_program() {
        let cmd = PlatformCommand::from_argv(["npx", "n8n", "--version"]).unwrap();
        assert_eq!(cmd.program(), "npx");
        assert_eq!(cmd.get_args(), ["n8n", "--version"]);
        assert_eq!(cmd.to_string(), "npx n8n --version");
    }

    #[test]
    fn from_argv_rejects_empty() {
        let err = PlatformCommand::from_argv(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::Platform(PlatformError::EmptyCommand)));
    }

    #[test]
    fn diagnostic_prefers_stderr() {
        let output = CommandOutput {
            success: false,
            code: Some(1),
            stdout: "partial\n".into(),
            stderr: "  boom \n".into(),
        };
        assert_eq!(output.diagnostic(), "boom");

        let output = CommandOutput {
            stderr: String::new(),
            ..output
        };
        assert_eq!(output.diagnostic(), "partial");
    }
}
