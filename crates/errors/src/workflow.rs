//! Malformed workflow document errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    #[error("invalid JSON{}: {message}", path.as_ref().map(|p| format!(" in {p}")).unwrap_or_default())]
    InvalidJson {
        path: Option<String>,
        message: String,
    },

    #[error("not a JSON object: {path}")]
    NotAnObject { path: String },

    #[error("missing required field `{field}` in {path}")]
    MissingField { path: String, field: String },

    #[error("malformed workflow {path}: {message}")]
    Malformed { path: String, message: String },
}

impl UserFacingError for WorkflowError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidJson { .. } => "workflow.invalid_json",
            Self::NotAnObject { .. } => "workflow.not_an_object",
            Self::MissingField { .. } => "workflow.missing_field",
            Self::Malformed { .. } => "workflow.malformed",
        };
        Some(code)
    }
}
