use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Batch progress over a known number of files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEvent {
    Started {
        id: String,
        operation: String,
        total: Option<u64>,
    },

    Updated {
        id: String,
        current: u64,
        total: Option<u64>,
    },

    Completed {
        id: String,
        duration: Duration,
        total_processed: u64,
    },

    Failed {
        id: String,
        failure: FailureContext,
        completed_items: u64,
    },
}

impl ProgressEvent {
    pub fn started(id: impl Into<String>, operation: impl Into<String>, total: Option<u64>) -> Self {
        Self::Started {
            id: id.into(),
            operation: operation.into(),
            total,
        }
    }

    pub fn updated(id: impl Into<String>, current: u64, total: Option<u64>) -> Self {
        Self::Updated {
            id: id.into(),
            current,
            total,
        }
    }

    pub fn completed(id: impl Into<String>, duration: Duration, total_processed: u64) -> Self {
        Self::Completed {
            id: id.into(),
            duration,
            total_processed,
        }
    }
}
