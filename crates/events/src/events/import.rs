use flowtidy_types::HealthStatus;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Workflow import events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImportEvent {
    EngineDetected {
        version: String,
    },

    HealthChecked {
        url: String,
        status: HealthStatus,
    },

    BatchStarted {
        dir: PathBuf,
        files: usize,
    },

    /// Rejected by validation before import
    FileSkipped {
        path: PathBuf,
        reasons: Vec<String>,
    },

    FileImported {
        filename: String,
    },

    FileFailed {
        filename: String,
        error: String,
        timed_out: bool,
    },

    CategoryUpdated {
        filename: String,
        category: String,
        created: bool,
    },

    RateLimited {
        pause_ms: u64,
    },

    LogSaved {
        path: PathBuf,
    },
}
