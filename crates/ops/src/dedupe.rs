//! Duplicate workflow detection and removal

use crate::categories;
use crate::{DedupeRequest, OpsCtx};
use flowtidy_errors::{Error, UserFacingError, WorkflowError};
use flowtidy_events::{AppEvent, DedupeEvent, EventEmitter};
use flowtidy_hash::{strip_volatile_fields, Hash};
use flowtidy_platform::{fs, PlatformCommand};
use flowtidy_types::{DedupeReport, DuplicateGroup, NameGroup, SkippedFile};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

const UNNAMED: &str = "Unnamed";

/// Find duplicate workflows and optionally remove them
///
/// Content duplicates are grouped by the hash of the normalized document;
/// the lexicographically first path of each group is always kept. Name
/// groups are informational only.
///
/// # Errors
///
/// Returns an error if the workflow directory does not exist, the user
/// declines the confirmation, or the category index cannot be rewritten.
pub async fn dedupe(ctx: &OpsCtx, request: DedupeRequest) -> Result<DedupeReport, Error> {
    let dir = request
        .dir
        .clone()
        .unwrap_or_else(|| ctx.config.workflows_dir());
    let files = fs::collect_json_files(&dir, true)?;

    ctx.emit(AppEvent::Dedupe(DedupeEvent::ScanStarted { dir: dir.clone() }));

    let mut by_hash: HashMap<Hash, Vec<PathBuf>> = HashMap::new();
    let mut by_name: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    let mut report = DedupeReport {
        dir,
        scanned: files.len(),
        dry_run: !request.fix_files,
        ..DedupeReport::default()
    };

    for path in files {
        match fingerprint(&path).await {
            Ok((hash, name)) => {
                by_hash.entry(hash).or_default().push(path.clone());
                by_name.entry(name).or_default().push(path);
            }
            Err(e) => {
                let reason = e.user_message().into_owned();
                ctx.emit(AppEvent::Dedupe(DedupeEvent::FileSkipped {
                    path: path.clone(),
                    reason: reason.clone(),
                }));
                report.skipped.push(SkippedFile { path, reason });
            }
        }
    }

    report.duplicate_groups = duplicate_groups(by_hash);
    report.name_groups = by_name
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(name, files)| NameGroup { name, files })
        .collect();
    report.removable = report
        .duplicate_groups
        .iter()
        .map(|g| g.duplicates.len())
        .sum();

    for group in &report.duplicate_groups {
        ctx.emit(AppEvent::Dedupe(DedupeEvent::DuplicateGroupFound {
            hash: group.hash.clone(),
            kept: group.kept.clone(),
            duplicates: group.duplicates.len(),
        }));
    }

    if request.is_check_only() {
        return Ok(report);
    }

    let deleting = request.fix_files && report.removable > 0;
    if deleting || request.fix_index {
        ctx.confirm(&confirmation_prompt(&request, report.removable))?;
    }

    if deleting {
        report.removed = remove_duplicates(ctx, &report.duplicate_groups).await;
    }

    if request.fix_index {
        report.index_entries_removed = Some(fix_index(ctx).await?);
    }

    Ok(report)
}

async fn fingerprint(path: &Path) -> Result<(Hash, String), Error> {
    let mut value = fs::read_json(path).await?;
    if !value.is_object() {
        return Err(WorkflowError::NotAnObject {
            path: path.display().to_string(),
        }
        .into());
    }

    let name = value
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(UNNAMED)
        .to_string();
    strip_volatile_fields(&mut value);
    let hash = Hash::from_canonical_json(&value)?;
    Ok((hash, name))
}

fn duplicate_groups(by_hash: HashMap<Hash, Vec<PathBuf>>) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = by_hash
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(hash, mut paths)| {
            paths.sort();
            let duplicates = paths.split_off(1);
            DuplicateGroup {
                hash: hash.to_hex(),
                kept: paths.remove(0),
                duplicates,
            }
        })
        .collect();
    groups.sort_by(|a, b| a.kept.cmp(&b.kept));
    groups
}

fn confirmation_prompt(request: &DedupeRequest, removable: usize) -> String {
    match (request.fix_files && removable > 0, request.fix_index) {
        (true, true) => {
            format!("Delete {removable} duplicate workflow files and rewrite the category index?")
        }
        (true, false) => format!("Delete {removable} duplicate workflow files?"),
        _ => "Rewrite the category index without duplicate entries?".to_string(),
    }
}

async fn remove_duplicates(ctx: &OpsCtx, groups: &[DuplicateGroup]) -> usize {
    let mut removed = 0;
    for path in groups.iter().flat_map(|g| &g.duplicates) {
        match fs::remove_file(path).await {
            Ok(()) => {
                removed += 1;
                ctx.emit(AppEvent::Dedupe(DedupeEvent::FileRemoved { path: path.clone() }));
            }
            Err(e) => ctx.emit(AppEvent::Dedupe(DedupeEvent::RemoveFailed {
                path: path.clone(),
                error: e.user_message().into_owned(),
            })),
        }
    }
    removed
}

async fn fix_index(ctx: &OpsCtx) -> Result<usize, Error> {
    let path = ctx.config.category_index_path();
    if !fs::exists(&path).await {
        ctx.emit_warning_with_context(
            "Category index not found; nothing to deduplicate",
            path.display().to_string(),
        );
        return Ok(0);
    }

    let entries = categories::load_index(&path).await?;
    let (kept, removed) = categories::dedupe_by_filename(entries);
    categories::save_index(&path, &kept).await?;

    ctx.emit(AppEvent::Dedupe(DedupeEvent::IndexDeduplicated {
        removed,
        remaining: kept.len(),
    }));

    if let Some(argv) = &ctx.config.dedupe.reindex_command {
        run_reindex(ctx, argv).await;
    }

    Ok(removed)
}

/// A failing re-index leaves the deduplicated file in place; it is reported,
/// not fatal.
async fn run_reindex(ctx: &OpsCtx, argv: &[String]) {
    let success = match PlatformCommand::from_argv(argv) {
        Ok(cmd) => match ctx.process.execute_command(&cmd).await {
            Ok(output) if output.success => true,
            Ok(output) => {
                ctx.emit_warning_with_context("Re-index command failed", output.diagnostic());
                false
            }
            Err(e) => {
                ctx.emit_warning_with_context("Re-index command failed", e.user_message());
                false
            }
        },
        Err(e) => {
            ctx.emit_warning_with_context("Re-index command is empty", e.user_message());
            false
        }
    };
    ctx.emit(AppEvent::Dedupe(DedupeEvent::ReindexFinished { success }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn volatile_fields_do_not_change_fingerprint() {
        let temp = tempfile::TempDir::new().unwrap();
        let a = temp.path().join("a.json");
        let b = temp.path().join("b.json");
        std::fs::write(
            &a,
            json!({"id": "1", "name": "Flow", "createdAt": "2024-01-01", "nodes": [], "connections": {}})
                .to_string(),
        )
        .unwrap();
        std::fs::write(
            &b,
            json!({"connections": {}, "nodes": [], "name": "Flow", "id": "2", "updatedAt": "2025-02-02"})
                .to_string(),
        )
        .unwrap();

        let (hash_a, name) = fingerprint(&a).await.unwrap();
        let (hash_b, _) = fingerprint(&b).await.unwrap();
        assert_eq!(hash_a, hash_b);
        assert_eq!(name, "Flow");
    }

    #[tokio::test]
    async fn non_object_documents_are_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("list.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let err = fingerprint(&path).await.unwrap_err();
        assert!(matches!(err, Error::Workflow(WorkflowError::NotAnObject { .. })));
    }

    #[test]
    fn groups_keep_smallest_path() {
        let hash = Hash::from_data(b"same");
        let mut by_hash = HashMap::new();
        by_hash.insert(
            hash,
            vec![PathBuf::from("b.json"), PathBuf::from("a.json"), PathBuf::from("c.json")],
        );
        by_hash.insert(Hash::from_data(b"single"), vec![PathBuf::from("d.json")]);

        let groups = duplicate_groups(by_hash);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kept, PathBuf::from("a.json"));
        assert_eq!(
            groups[0].duplicates,
            vec![PathBuf::from("b.json"), PathBuf::from("c.json")]
        );
    }
}
