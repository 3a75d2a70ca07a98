//! Bulk workflow import through the engine CLI

use crate::categories;
use crate::{ImportRequest, OpsCtx};
use chrono::Utc;
use flowtidy_config::constants::FILE_PLACEHOLDER;
use flowtidy_errors::{Error, ImportError, PlatformError, UserFacingError};
use flowtidy_events::{AppEvent, EventEmitter, ImportEvent};
use flowtidy_graph::validate_for_import;
use flowtidy_net::resolve_health;
use flowtidy_platform::{fs, PlatformCommand};
use flowtidy_types::{
    CategoryEntry, HealthStatus, ImportLog, ImportLogEntry, ImportReport, ImportStatus, ImportTally,
    Workflow,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const PROGRESS_ID: &str = "import";

/// Accumulator threaded through every per-file step
#[derive(Default)]
struct BatchState {
    tally: ImportTally,
    logs: Vec<ImportLogEntry>,
    errors: Vec<String>,
    attempts: usize,
}

/// Category index loaded once per batch and saved when touched
struct IndexState {
    path: PathBuf,
    entries: Vec<CategoryEntry>,
    dirty: bool,
}

/// Validate and import every workflow file under the configured directory
///
/// # Errors
///
/// Returns an error if the engine CLI is missing, the health policy rejects
/// an unreachable engine, the directory is missing or holds no workflow
/// files. Per-file failures are recorded in the report instead.
pub async fn import(ctx: &OpsCtx, request: ImportRequest) -> Result<ImportReport, Error> {
    let start = Instant::now();
    let dir = request
        .dir
        .clone()
        .unwrap_or_else(|| ctx.config.workflows_dir());
    fs::ensure_dir(&dir).await?;

    let version = check_engine(ctx).await?;
    ctx.emit(AppEvent::Import(ImportEvent::EngineDetected { version }));

    let health = check_health(ctx).await;
    if let HealthStatus::Unreachable { reason } = &health {
        return Err(ImportError::EngineUnavailable {
            url: ctx.config.import.health_url.clone(),
            reason: reason.clone(),
        }
        .into());
    }

    let mut files = fs::collect_json_files(&dir, ctx.config.import.recursive)?;
    if let Some(limit) = request.limit {
        files.truncate(limit);
    }
    if files.is_empty() {
        return Err(ImportError::NoWorkflowFiles {
            dir: dir.display().to_string(),
        }
        .into());
    }

    ctx.emit(AppEvent::Import(ImportEvent::BatchStarted {
        dir: dir.clone(),
        files: files.len(),
    }));
    let total = u64::try_from(files.len()).unwrap_or(u64::MAX);
    ctx.emit_progress_started(PROGRESS_ID, "Importing workflows", Some(total));

    let mut index = load_index(ctx).await;
    let mut state = BatchState::default();

    for (i, path) in files.iter().enumerate() {
        let attempted = process_file(ctx, path, &mut state, index.as_mut()).await;
        let done = u64::try_from(i + 1).unwrap_or(u64::MAX);
        ctx.emit_progress_updated(PROGRESS_ID, done, Some(total));

        let every = ctx.config.import.rate_limit_every;
        let more_left = i + 1 < files.len();
        if attempted && every > 0 && state.attempts % every == 0 && more_left {
            let pause_ms = ctx.config.import.rate_limit_pause_ms;
            ctx.emit(AppEvent::Import(ImportEvent::RateLimited { pause_ms }));
            tokio::time::sleep(Duration::from_millis(pause_ms)).await;
        }
    }

    if let Some(index) = index.filter(|i| i.dirty) {
        if let Err(e) = categories::save_index(&index.path, &index.entries).await {
            ctx.emit_warning_with_context("Failed to save category index", e.user_message());
        }
    }

    let log_path = save_log(ctx, &state).await;
    ctx.emit_progress_completed(PROGRESS_ID, start.elapsed(), total);

    Ok(ImportReport {
        dir,
        health,
        tally: state.tally,
        errors: state.errors,
        log_path,
        duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    })
}

/// Confirm the engine CLI runs and return its version string
async fn check_engine(ctx: &OpsCtx) -> Result<String, Error> {
    let argv = &ctx.config.import.version_command;
    let not_found = || ImportError::EngineNotFound {
        command: argv.join(" "),
    };

    let mut cmd = PlatformCommand::from_argv(argv)?;
    cmd.timeout(Duration::from_secs(ctx.config.import.version_timeout_secs));
    match ctx.process.execute_command(&cmd).await {
        Ok(output) if output.success => Ok(output.stdout.trim().to_string()),
        Ok(output) => {
            tracing::debug!(stderr = %output.stderr, "version command failed");
            Err(not_found().into())
        }
        Err(e) => {
            tracing::debug!(error = %e, "version command did not run");
            Err(not_found().into())
        }
    }
}

async fn check_health(ctx: &OpsCtx) -> HealthStatus {
    let url = &ctx.config.import.health_url;
    let timeout = Duration::from_millis(ctx.config.import.health_timeout_ms);
    let result = ctx.probe.probe(url, timeout).await;
    let status = resolve_health(ctx.config.import.health_policy, result);

    if let HealthStatus::Assumed { reason } = &status {
        ctx.emit_warning_with_context(
            "Workflow engine health check failed; assuming it is available",
            reason.clone(),
        );
    }
    ctx.emit(AppEvent::Import(ImportEvent::HealthChecked {
        url: url.clone(),
        status: status.clone(),
    }));
    status
}

async fn load_index(ctx: &OpsCtx) -> Option<IndexState> {
    let path = ctx.config.category_index_path();
    match categories::load_index(&path).await {
        Ok(entries) => Some(IndexState {
            path,
            entries,
            dirty: false,
        }),
        Err(e) => {
            ctx.emit_warning_with_context(
                "Category index unreadable; categories will not be updated",
                e.user_message(),
            );
            None
        }
    }
}

/// Validate, import and categorize one file
///
/// Returns true when the engine was invoked.
async fn process_file(
    ctx: &OpsCtx,
    path: &Path,
    state: &mut BatchState,
    index: Option<&mut IndexState>,
) -> bool {
    state.tally.total += 1;

    let workflow = match load_valid(path).await {
        Ok(workflow) => workflow,
        Err(reasons) => {
            state.tally.record_skipped();
            ctx.emit(AppEvent::Import(ImportEvent::FileSkipped {
                path: path.to_path_buf(),
                reasons,
            }));
            return false;
        }
    };

    let filename = file_name(path);
    let (status, error) = import_file(ctx, path, &filename).await;
    state.attempts += 1;
    state.tally.record(status);
    state.logs.push(ImportLogEntry {
        filename: filename.clone(),
        path: path.to_path_buf(),
        status,
        error: error.clone(),
        timestamp: Utc::now(),
    });

    match status {
        ImportStatus::Success => {
            ctx.emit(AppEvent::Import(ImportEvent::FileImported {
                filename: filename.clone(),
            }));
            if let Some(index) = index {
                update_category(ctx, index, &filename, &workflow);
            }
        }
        ImportStatus::Failed | ImportStatus::Timeout => {
            let error = error.unwrap_or_default();
            state.errors.push(format!("{filename}: {error}"));
            ctx.emit(AppEvent::Import(ImportEvent::FileFailed {
                filename,
                error,
                timed_out: status == ImportStatus::Timeout,
            }));
        }
    }
    true
}

/// The document is read once and reused for validation and categorization
async fn load_valid(path: &Path) -> Result<Workflow, Vec<String>> {
    let value = fs::read_json(path)
        .await
        .map_err(|e| vec![e.user_message().into_owned()])?;
    validate_for_import(value).map_err(|issues| issues.iter().map(ToString::to_string).collect())
}

async fn import_file(ctx: &OpsCtx, path: &Path, filename: &str) -> (ImportStatus, Option<String>) {
    let cmd = match import_command(&ctx.config.import.command, path) {
        Ok(mut cmd) => {
            cmd.timeout(Duration::from_secs(ctx.config.import.timeout_secs));
            cmd
        }
        Err(e) => return (ImportStatus::Failed, Some(e.user_message().into_owned())),
    };

    match ctx.process.execute_command(&cmd).await {
        Ok(output) if output.success => (ImportStatus::Success, None),
        Ok(output) => {
            let message = match output.diagnostic() {
                "" => format!("exit code {}", output.code.map_or("unknown".into(), |c| c.to_string())),
                text => text.to_string(),
            };
            (ImportStatus::Failed, Some(message))
        }
        Err(Error::Platform(PlatformError::Timeout { .. })) => (
            ImportStatus::Timeout,
            Some(
                ImportError::Timeout {
                    filename: filename.to_string(),
                }
                .to_string(),
            ),
        ),
        Err(e) => (ImportStatus::Failed, Some(e.user_message().into_owned())),
    }
}

/// Substitute the file path into the configured argv; append it when no
/// argument carries the placeholder
fn import_command(argv: &[String], path: &Path) -> Result<PlatformCommand, Error> {
    let file = path.display().to_string();
    let mut substituted = false;
    let mut args: Vec<String> = argv
        .iter()
        .map(|arg| {
            if arg.contains(FILE_PLACEHOLDER) {
                substituted = true;
                arg.replace(FILE_PLACEHOLDER, &file)
            } else {
                arg.clone()
            }
        })
        .collect();
    if !substituted {
        args.push(file);
    }
    PlatformCommand::from_argv(args)
}

fn update_category(ctx: &OpsCtx, index: &mut IndexState, filename: &str, workflow: &Workflow) {
    let category = categories::categorize(filename, &ctx.config.import.categories);
    let entry = categories::entry_for(filename, workflow, category.clone());
    let created = categories::upsert(&mut index.entries, entry);
    index.dirty = true;
    ctx.emit(AppEvent::Import(ImportEvent::CategoryUpdated {
        filename: filename.to_string(),
        category,
        created,
    }));
}

async fn save_log(ctx: &OpsCtx, state: &BatchState) -> Option<PathBuf> {
    let path = ctx.config.import_log_path();
    let log = ImportLog {
        timestamp: Utc::now(),
        summary: state.tally,
        logs: state.logs.clone(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            ctx.emit_warning_with_context("Failed to save import log", e.user_message());
            return None;
        }
    }
    match fs::write_json_pretty(&path, &log).await {
        Ok(()) => {
            ctx.emit(AppEvent::Import(ImportEvent::LogSaved { path: path.clone() }));
            Some(path)
        }
        Err(e) => {
            ctx.emit_warning_with_context("Failed to save import log", e.user_message());
            None
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn placeholder_is_substituted() {
        let cmd = import_command(
            &argv(&["npx", "n8n", "import:workflow", "--input={file}"]),
            Path::new("workflows/a.json"),
        )
        .unwrap();
        assert_eq!(cmd.to_string(), "npx n8n import:workflow --input=workflows/a.json");
    }

    #[test]
    fn path_is_appended_without_placeholder() {
        let cmd = import_command(&argv(&["engine", "import"]), Path::new("a.json")).unwrap();
        assert_eq!(cmd.get_args(), ["import", "a.json"]);
    }

    #[tokio::test]
    async fn invalid_document_reports_every_issue() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{\"nodes\": {}}").unwrap();

        let reasons = load_valid(&path).await.unwrap_err();
        assert_eq!(reasons.len(), 2);
        assert!(reasons.iter().any(|r| r.contains("connections")));
    }
}
