//! Connection repair over a workflow tree

use crate::{OpsCtx, RepairRequest};
use chrono::Local;
use flowtidy_errors::{Error, UserFacingError, WorkflowError};
use flowtidy_events::{AppEvent, EventEmitter, FailureContext, RepairEvent};
use flowtidy_graph::{repair, Connectivity, RepairOutcome, RepairStatus};
use flowtidy_platform::fs;
use flowtidy_types::{FileError, RepairMode, RepairReport, RepairTally, Workflow, WorkflowAnalysis};
use std::path::{Path, PathBuf};
use std::time::Instant;

const PROGRESS_ID: &str = "repair";

/// Analyze a single workflow file without changing it
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a workflow document.
pub async fn check_file(ctx: &OpsCtx, path: &Path) -> Result<WorkflowAnalysis, Error> {
    let workflow = load_workflow(path).await?;
    let analysis = Connectivity::analyze(&workflow).to_analysis(&workflow, path);
    ctx.emit_debug(format!(
        "{}: {} of {} nodes orphaned",
        path.display(),
        analysis.orphaned_nodes,
        analysis.total_nodes
    ));
    Ok(analysis)
}

/// Repair every workflow under the configured directory
///
/// A dry run repairs in memory only. Otherwise each file that changes is
/// first copied into a timestamped backup directory, the copy verified by
/// hash, and only then overwritten.
///
/// # Errors
///
/// Returns an error if the directory is missing or the user declines the
/// confirmation. Per-file failures are counted in the report instead.
pub async fn run(ctx: &OpsCtx, request: RepairRequest) -> Result<RepairReport, Error> {
    let start = Instant::now();
    let dir = request
        .dir
        .clone()
        .unwrap_or_else(|| ctx.config.workflows_dir());
    let mut files = fs::collect_json_files(&dir, true)?;

    let limit = request.limit.or(if request.dry_run {
        ctx.config.repair.dry_run_limit
    } else {
        None
    });
    if let Some(limit) = limit {
        files.truncate(limit);
    }

    if !request.dry_run {
        ctx.confirm(&confirmation_prompt(request.mode, files.len()))?;
    }

    ctx.emit(AppEvent::Repair(RepairEvent::BatchStarted {
        mode: request.mode,
        files: files.len(),
        dry_run: request.dry_run,
    }));
    let total = u64::try_from(files.len()).unwrap_or(u64::MAX);
    ctx.emit_progress_started(PROGRESS_ID, "Repairing workflow connections", Some(total));

    let mut backup = Backup::new(ctx.config.backup_root());
    let mut tally = RepairTally::default();
    let mut errors = Vec::new();
    let every = ctx.config.repair.progress_every.max(1);

    for (i, path) in files.iter().enumerate() {
        tally.scanned += 1;
        let had_backup = backup.dir.is_some();
        let target = if request.dry_run { None } else { Some(&mut backup) };
        let result = repair_file(path, &dir, request.mode, target).await;
        if let (false, Some(created)) = (had_backup, &backup.dir) {
            ctx.emit(AppEvent::Repair(RepairEvent::BackupCreated {
                dir: created.clone(),
            }));
        }
        match result {
            Ok(outcome) => record(ctx, &mut tally, path, &outcome),
            Err(e) => {
                tally.failed += 1;
                ctx.emit(AppEvent::Repair(RepairEvent::FileFailed {
                    path: path.clone(),
                    failure: FailureContext::from_error(&e),
                }));
                errors.push(FileError {
                    path: path.clone(),
                    message: e.user_message().into_owned(),
                });
            }
        }

        if (i + 1) % every == 0 {
            let done = u64::try_from(i + 1).unwrap_or(u64::MAX);
            ctx.emit_progress_updated(PROGRESS_ID, done, Some(total));
        }
    }

    ctx.emit_progress_completed(PROGRESS_ID, start.elapsed(), total);

    Ok(RepairReport {
        mode: request.mode,
        dry_run: request.dry_run,
        backup_dir: backup.dir,
        tally,
        errors,
        duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    })
}

fn confirmation_prompt(mode: RepairMode, files: usize) -> String {
    match mode {
        RepairMode::Minimal => {
            format!("Repair up to {files} workflow files in place (originals are backed up)?")
        }
        RepairMode::Aggressive => format!(
            "Aggressive mode links orphaned nodes into a chain and may change workflow logic. \
             Repair up to {files} workflow files in place (originals are backed up)?"
        ),
    }
}

async fn load_workflow(path: &Path) -> Result<Workflow, Error> {
    let value = fs::read_json(path).await?;
    Workflow::from_value(value).map_err(|e| {
        WorkflowError::Malformed {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Load, repair and (outside dry runs) back up and save one file
async fn repair_file(
    path: &Path,
    root: &Path,
    mode: RepairMode,
    backup: Option<&mut Backup>,
) -> Result<RepairOutcome, Error> {
    let mut workflow = load_workflow(path).await?;
    let outcome = repair(&mut workflow, mode);

    if outcome.changed() {
        if let Some(backup) = backup {
            backup.save(path, root).await?;
            fs::write_json_pretty(path, &workflow).await?;
        }
    }
    Ok(outcome)
}

fn record(ctx: &OpsCtx, tally: &mut RepairTally, path: &Path, outcome: &RepairOutcome) {
    match outcome.status {
        RepairStatus::Clean | RepairStatus::Empty => tally.already_ok += 1,
        RepairStatus::Repaired => {
            tally.fixed += 1;
            tally.nodes_removed += outcome.removed.len();
            tally.nodes_linked += outcome.linked.len();
            ctx.emit(AppEvent::Repair(RepairEvent::FileRepaired {
                path: path.to_path_buf(),
                orphans_before: outcome.orphans_before,
                orphans_after: outcome.orphans_after,
                removed: outcome.removed.len(),
                linked: outcome.linked.len(),
            }));
        }
        RepairStatus::Unresolved => {
            tally.unresolved += 1;
            ctx.emit(AppEvent::Repair(RepairEvent::FileUnresolved {
                path: path.to_path_buf(),
                orphans: outcome.orphans_after,
            }));
        }
    }
}

/// Backup directory, created on first use
struct Backup {
    root: PathBuf,
    dir: Option<PathBuf>,
}

impl Backup {
    fn new(root: PathBuf) -> Self {
        Self { root, dir: None }
    }

    async fn save(&mut self, path: &Path, workflows_root: &Path) -> Result<(), Error> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => {
                let dir = self.root.join(format!(
                    "workflows_backup_{}",
                    Local::now().format("%Y%m%d_%H%M%S")
                ));
                fs::create_dir_all(&dir).await?;
                tracing::info!(dir = %dir.display(), "created backup directory");
                self.dir = Some(dir.clone());
                dir
            }
        };

        let relative = path
            .strip_prefix(workflows_root)
            .ok()
            .map(Path::to_path_buf)
            .or_else(|| path.file_name().map(PathBuf::from))
            .unwrap_or_else(|| path.to_path_buf());
        let dest = dir.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        flowtidy_hash::copy_verified(path, &dest).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn dry_run_leaves_file_untouched() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("flow.json");
        let original = json!({
            "nodes": [
                {"name": "A", "id": "a", "type": "n8n-nodes-base.start"},
                {"name": "Note", "id": "doc-1", "type": "n8n-nodes-base.stickyNote"}
            ],
            "connections": {}
        })
        .to_string();
        std::fs::write(&path, &original).unwrap();

        let outcome = repair_file(&path, temp.path(), RepairMode::Minimal, None)
            .await
            .unwrap();
        assert_eq!(outcome.status, RepairStatus::Repaired);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn backup_keeps_relative_layout() {
        let temp = tempfile::TempDir::new().unwrap();
        let workflows = temp.path().join("workflows");
        std::fs::create_dir_all(workflows.join("Slack")).unwrap();
        let path = workflows.join("Slack/notify.json");
        std::fs::write(&path, "{\"nodes\": []}").unwrap();

        let mut backup = Backup::new(temp.path().to_path_buf());
        backup.save(&path, &workflows).await.unwrap();

        let dir = backup.dir.clone().unwrap();
        assert!(dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("workflows_backup_"));
        assert_eq!(
            std::fs::read_to_string(dir.join("Slack/notify.json")).unwrap(),
            "{\"nodes\": []}"
        );
    }
}
