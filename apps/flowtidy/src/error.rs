//! CLI error handling

use std::fmt;

use flowtidy_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or merged
    Config(flowtidy_errors::ConfigError),
    /// An operation failed as a whole
    Ops(flowtidy_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// Writing output failed
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => {
                write!(f, "Configuration error: {}", e.user_message())?;
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::Ops(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::InvalidArguments(_) => None,
        }
    }
}

impl From<flowtidy_errors::Error> for CliError {
    fn from(e: flowtidy_errors::Error) -> Self {
        match e {
            flowtidy_errors::Error::Config(config) => CliError::Config(config),
            other => CliError::Ops(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowtidy_errors::{ConfigError, OpsError};

    #[test]
    fn config_errors_are_unwrapped() {
        let err: CliError = flowtidy_errors::Error::from(ConfigError::NotFound {
            path: "/nowhere/config.toml".into(),
        })
        .into();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn aborted_operation_renders_message() {
        let err: CliError = flowtidy_errors::Error::from(OpsError::Aborted).into();
        assert!(matches!(err, CliError::Ops(_)));
        assert!(!err.to_string().is_empty());
    }
}
