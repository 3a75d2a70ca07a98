use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Duplicate detection and removal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DedupeEvent {
    ScanStarted {
        dir: PathBuf,
    },

    /// A file could not be read as a JSON object
    FileSkipped {
        path: PathBuf,
        reason: String,
    },

    DuplicateGroupFound {
        hash: String,
        kept: PathBuf,
        duplicates: usize,
    },

    FileRemoved {
        path: PathBuf,
    },

    RemoveFailed {
        path: PathBuf,
        error: String,
    },

    IndexDeduplicated {
        removed: usize,
        remaining: usize,
    },

    ReindexFinished {
        success: bool,
    },
}
