#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Workflow maintenance operations for flowtidy
//!
//! This crate is the orchestration layer between the CLI and the
//! specialized crates. Every operation takes an `OpsCtx`, reports progress
//! through events and returns a typed report.

pub mod categories;
mod context;
mod dedupe;
mod import;
mod repair;
pub mod site;
mod types;

pub use context::{OpsContextBuilder, OpsCtx};
pub use types::{DedupeRequest, ImportRequest, RepairRequest};

pub use dedupe::dedupe;
pub use import::import;
pub use repair::{check_file as repair_check, run as repair};
pub use site::patch_site;

use flowtidy_errors::Error;
use flowtidy_types::{DedupeReport, ImportReport, RepairReport, SiteReport, WorkflowAnalysis};

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Duplicate scan (and removal) report
    Dedupe(DedupeReport),
    /// Single-file connectivity analysis
    RepairCheck(WorkflowAnalysis),
    /// Repair batch report
    Repair(RepairReport),
    /// Import batch report
    Import(ImportReport),
    /// Static site patch report
    Site(SiteReport),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be serialized.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            flowtidy_errors::OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Whether the command should exit successfully
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            OperationResult::Dedupe(_)
            | OperationResult::RepairCheck(_)
            | OperationResult::Site(_) => true,
            OperationResult::Repair(report) => report.tally.failed == 0,
            OperationResult::Import(report) => report.is_success(),
        }
    }
}
