//! Workflow import error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ImportError {
    #[error("workflow engine CLI not available: {command}")]
    EngineNotFound { command: String },

    #[error("workflow engine unreachable at {url}: {reason}")]
    EngineUnavailable { url: String, reason: String },

    #[error("no workflow files found in {dir}")]
    NoWorkflowFiles { dir: String },

    #[error("import of {filename} timed out")]
    Timeout { filename: String },
}

impl UserFacingError for ImportError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::EngineNotFound { .. } => {
                Some("Install the engine (`npm install -g n8n`) or run it through `npx n8n start`.")
            }
            Self::EngineUnavailable { .. } => Some(
                "Start the engine first, or use --health-policy assume-available to skip the check.",
            ),
            Self::NoWorkflowFiles { .. } => {
                Some("Point --dir at the workflow tree, or drop --no-recursive to search subdirectories.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::EngineUnavailable { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::EngineNotFound { .. } => "import.engine_not_found",
            Self::EngineUnavailable { .. } => "import.engine_unavailable",
            Self::NoWorkflowFiles { .. } => "import.no_workflow_files",
            Self::Timeout { .. } => "import.timeout",
        };
        Some(code)
    }
}
