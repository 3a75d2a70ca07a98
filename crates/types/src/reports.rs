//! Report type definitions for operations

use crate::{HealthStatus, NodeRole, RepairMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file left out of a batch, with the reason
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Files whose normalized content hashes to the same value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Hex digest of the normalized content
    pub hash: String,
    /// Lexicographically first path, always preserved
    pub kept: PathBuf,
    /// Remaining members (deleted unless the run only checks)
    pub duplicates: Vec<PathBuf>,
}

/// Files sharing a workflow name (informational only)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameGroup {
    pub name: String,
    pub files: Vec<PathBuf>,
}

/// Duplicate detection report
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DedupeReport {
    pub dir: PathBuf,
    pub scanned: usize,
    pub skipped: Vec<SkippedFile>,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub name_groups: Vec<NameGroup>,
    /// Number of files that would be removed
    pub removable: usize,
    /// Number of files actually removed
    pub removed: usize,
    /// Entries dropped from the category index, when the index was fixed
    pub index_entries_removed: Option<usize>,
    pub dry_run: bool,
}

/// Per-orphan details for single-file analysis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrphanInfo {
    pub name: String,
    pub id: Option<String>,
    pub node_type: String,
    pub role: NodeRole,
}

/// Connectivity analysis of one workflow file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowAnalysis {
    pub path: PathBuf,
    pub workflow_name: Option<String>,
    pub total_nodes: usize,
    pub connected_nodes: usize,
    pub orphaned_nodes: usize,
    /// Percentage of nodes that take part in at least one connection
    pub coverage: f64,
    pub orphans: Vec<OrphanInfo>,
}

/// Running counters for a repair batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairTally {
    pub scanned: usize,
    pub fixed: usize,
    pub already_ok: usize,
    pub failed: usize,
    /// Nodes removed by minimal repair
    pub nodes_removed: usize,
    /// Nodes spliced into a chain by aggressive repair
    pub nodes_linked: usize,
    /// Orphans that no policy could resolve
    pub unresolved: usize,
}

/// A per-file failure in a batch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

/// Connection repair batch report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepairReport {
    pub mode: RepairMode,
    pub dry_run: bool,
    pub backup_dir: Option<PathBuf>,
    pub tally: RepairTally,
    pub errors: Vec<FileError>,
    pub duration_ms: u64,
}

impl RepairReport {
    /// Average number of removed nodes per fixed workflow
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_nodes_removed(&self) -> f64 {
        if self.tally.fixed == 0 {
            0.0
        } else {
            self.tally.nodes_removed as f64 / self.tally.fixed as f64
        }
    }
}

/// Outcome of importing one file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Success,
    Failed,
    Timeout,
}

/// One line of the persisted import log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImportLogEntry {
    pub filename: String,
    pub path: PathBuf,
    pub status: ImportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Running counters for an import batch
///
/// `failed` includes timeouts; `timed_out` breaks them out. Files rejected by
/// validation are only counted as `skipped`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTally {
    pub total: usize,
    pub imported: usize,
    pub failed: usize,
    pub skipped: usize,
    pub timed_out: usize,
}

impl ImportTally {
    /// Record the outcome of an attempted import
    pub fn record(&mut self, status: ImportStatus) {
        match status {
            ImportStatus::Success => self.imported += 1,
            ImportStatus::Failed => self.failed += 1,
            ImportStatus::Timeout => {
                self.failed += 1;
                self.timed_out += 1;
            }
        }
    }

    /// Record a file rejected before import
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }
}

/// The import log file as persisted on disk
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportLog {
    pub timestamp: DateTime<Utc>,
    pub summary: ImportTally,
    pub logs: Vec<ImportLogEntry>,
}

/// Import batch report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportReport {
    pub dir: PathBuf,
    pub health: HealthStatus,
    pub tally: ImportTally,
    pub errors: Vec<String>,
    pub log_path: Option<PathBuf>,
    pub duration_ms: u64,
}

impl ImportReport {
    /// Aggregate success: nothing failed and at least one workflow imported
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.tally.failed == 0 && self.tally.imported > 0
    }
}

/// Static documentation site patch report
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SiteReport {
    pub root: PathBuf,
    /// Whether `index.html` was found and patched
    pub html_patched: bool,
    /// Whether a timestamp meta tag was inserted (false if one existed)
    pub meta_inserted: bool,
    pub stats_updated: bool,
    pub files_written: Vec<PathBuf>,
    /// Files whose root-relative references were rewritten, with a count
    pub references_rewritten: Vec<(PathBuf, usize)>,
    pub present_files: Vec<String>,
    pub missing_files: Vec<String>,
    pub warnings: Vec<String>,
}

/// Category index entry
///
/// Fields not named here survive a load/save cycle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
