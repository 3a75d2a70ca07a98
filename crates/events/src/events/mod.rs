use serde::{Deserialize, Serialize};

use crate::EventSource;
use flowtidy_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod dedupe;
pub mod general;
pub mod import;
pub mod progress;
pub mod repair;
pub mod site;

pub use dedupe::*;
pub use general::*;
pub use import::*;
pub use progress::*;
pub use repair::*;
pub use site::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Batch progress
    Progress(ProgressEvent),

    /// Duplicate detection and removal
    Dedupe(DedupeEvent),

    /// Connection repair
    Repair(RepairEvent),

    /// Workflow import
    Import(ImportEvent),

    /// Static site patching
    Site(SiteEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Progress(_) => EventSource::PROGRESS,
            Self::Dedupe(_) => EventSource::DEDUPE,
            Self::Repair(_) => EventSource::REPAIR,
            Self::Import(_) => EventSource::IMPORT,
            Self::Site(_) => EventSource::SITE,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. })
            | Self::Progress(ProgressEvent::Failed { .. })
            | Self::Dedupe(DedupeEvent::RemoveFailed { .. })
            | Self::Repair(RepairEvent::FileFailed { .. })
            | Self::Import(ImportEvent::FileFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Dedupe(DedupeEvent::FileSkipped { .. })
            | Self::Import(ImportEvent::FileSkipped { .. })
            | Self::Site(SiteEvent::StepSkipped { .. } | SiteEvent::FileMissing { .. }) => {
                Level::WARN
            }

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Progress(ProgressEvent::Updated { .. })
            | Self::Import(ImportEvent::RateLimited { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "flowtidy::events::general",
            Self::Progress(_) => "flowtidy::events::progress",
            Self::Dedupe(_) => "flowtidy::events::dedupe",
            Self::Repair(_) => "flowtidy::events::repair",
            Self::Import(_) => "flowtidy::events::import",
            Self::Site(_) => "flowtidy::events::site",
        }
    }
}
