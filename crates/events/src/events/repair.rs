use flowtidy_types::RepairMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Connection repair batch events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RepairEvent {
    BatchStarted {
        mode: RepairMode,
        files: usize,
        dry_run: bool,
    },

    BackupCreated {
        dir: PathBuf,
    },

    FileRepaired {
        path: PathBuf,
        orphans_before: usize,
        orphans_after: usize,
        removed: usize,
        linked: usize,
    },

    /// Orphans remain that the selected policy leaves alone
    FileUnresolved {
        path: PathBuf,
        orphans: usize,
    },

    FileFailed {
        path: PathBuf,
        failure: FailureContext,
    },
}
