use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Static site patch events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SiteEvent {
    TimestampPatched {
        path: PathBuf,
        meta_inserted: bool,
    },

    FileWritten {
        path: PathBuf,
    },

    ReferencesRewritten {
        path: PathBuf,
        count: usize,
    },

    StepSkipped {
        step: String,
        reason: String,
    },

    FileMissing {
        path: String,
    },
}
