//! Tracing setup and structured logging of events
//!
//! Every event that reaches the CLI is also written to the tracing
//! subscriber, so a `--debug` log file holds the full history of a run.

use flowtidy_events::{
    AppEvent, DedupeEvent, EventMessage, GeneralEvent, ImportEvent, RepairEvent,
};
use std::path::Path;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::EnvFilter;

/// Crates whose `debug!` output belongs in a `--debug` log
const DEBUG_TARGETS: &[&str] = &[
    "flowtidy",
    "flowtidy_ops",
    "flowtidy_platform",
    "flowtidy_config",
    "flowtidy_net",
];
const NORMAL_FILTER: &str = "warn,flowtidy=warn,flowtidy_ops=warn";

fn debug_filter() -> String {
    std::iter::once("info".to_string())
        .chain(DEBUG_TARGETS.iter().map(|target| format!("{target}=debug")))
        .collect::<Vec<_>>()
        .join(",")
}

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Open a fresh timestamped log file under `log_dir`
fn open_log_file(log_dir: &Path) -> std::io::Result<(std::fs::File, std::path::PathBuf)> {
    std::fs::create_dir_all(log_dir)?;
    let path = log_dir.join(format!(
        "flowtidy-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    let file = std::fs::File::create(&path)?;
    Ok((file, path))
}

/// Install the global tracing subscriber
///
/// JSON mode keeps stdout clean: logs go to a file when debugging and are
/// dropped otherwise. Debug mode writes JSON lines to a timestamped file;
/// normal mode only prints warnings to stderr.
pub fn init_tracing(json_mode: bool, debug_flag: bool, log_dir: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_flag;

    if json_mode {
        if debug_enabled {
            if let Ok((file, _)) = open_log_file(log_dir) {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(env_filter(&debug_filter()))
                    .init();
                return;
            }
        }
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else if debug_enabled {
        match open_log_file(log_dir) {
            Ok((file, path)) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(env_filter(&debug_filter()))
                    .init();
                eprintln!("Debug logging enabled: {}", path.display());
            }
            Err(e) => {
                eprintln!("Warning: Failed to create log file: {e}");
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(env_filter("info"))
                    .init();
            }
        }
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter(NORMAL_FILTER))
            .init();
    }
}

/// Log an event with structured fields at the level recorded in its metadata
#[allow(clippy::too_many_lines)]
pub fn log_event_with_tracing(message: &EventMessage) {
    let event = &message.event;
    let meta = &message.meta;
    let level = meta.tracing_level();

    match event {
        AppEvent::General(GeneralEvent::Warning { message, context }) => {
            warn!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                message = %message,
                context = ?context,
                "Warning"
            );
        }
        AppEvent::General(GeneralEvent::Error { message, details }) => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                message = %message,
                details = ?details,
                "Error"
            );
        }
        AppEvent::General(GeneralEvent::OperationFailed { operation, failure }) => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                operation = %operation,
                code = ?failure.code,
                message = %failure.message,
                retryable = failure.retryable,
                "Operation failed"
            );
        }
        AppEvent::Dedupe(DedupeEvent::DuplicateGroupFound {
            hash,
            kept,
            duplicates,
        }) => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                hash = %hash,
                kept = %kept.display(),
                duplicates = duplicates,
                "Duplicate group found"
            );
        }
        AppEvent::Dedupe(DedupeEvent::RemoveFailed { path, error }) => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                path = %path.display(),
                error = %error,
                "Failed to remove duplicate"
            );
        }
        AppEvent::Repair(RepairEvent::FileRepaired {
            path,
            orphans_before,
            orphans_after,
            removed,
            linked,
        }) => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                path = %path.display(),
                orphans_before = orphans_before,
                orphans_after = orphans_after,
                removed = removed,
                linked = linked,
                "Workflow repaired"
            );
        }
        AppEvent::Repair(RepairEvent::FileFailed { path, failure }) => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                path = %path.display(),
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                "Repair failed"
            );
        }
        AppEvent::Import(ImportEvent::FileFailed {
            filename,
            error,
            timed_out,
        }) => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                filename = %filename,
                error = %error,
                timed_out = timed_out,
                "Import failed"
            );
        }
        AppEvent::Import(ImportEvent::FileSkipped { path, reasons }) => {
            warn!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                path = %path.display(),
                reasons = ?reasons,
                "Workflow failed validation"
            );
        }
        _ => match level {
            tracing::Level::ERROR => {
                error!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
            }
            tracing::Level::WARN => {
                warn!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
            }
            tracing::Level::INFO => {
                info!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
            }
            tracing::Level::DEBUG => {
                debug!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
            }
            tracing::Level::TRACE => {
                trace!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_filter_lifts_every_library_crate() {
        let filter = debug_filter();
        for target in ["flowtidy_ops", "flowtidy_platform", "flowtidy_config", "flowtidy_net"] {
            assert!(filter.contains(&format!("{target}=debug")), "{target} missing");
        }
        assert!(EnvFilter::try_new(&filter).is_ok());
    }
}
