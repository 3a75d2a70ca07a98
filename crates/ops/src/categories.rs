//! Category index maintenance

use flowtidy_config::{constants::UNCATEGORIZED, CategoryRule};
use flowtidy_errors::{Error, WorkflowError};
use flowtidy_platform::fs;
use flowtidy_types::{CategoryEntry, Workflow};
use std::collections::HashSet;
use std::path::Path;

/// Load the category index; a missing file is an empty index
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or is not a
/// JSON array of entries.
pub async fn load_index(path: &Path) -> Result<Vec<CategoryEntry>, Error> {
    if !fs::exists(path).await {
        return Ok(Vec::new());
    }
    let value = fs::read_json(path).await?;
    serde_json::from_value(value).map_err(|e| {
        WorkflowError::Malformed {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Rewrite the category index, creating its directory when needed
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the write fails.
pub async fn save_index(path: &Path, entries: &[CategoryEntry]) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write_json_pretty(path, entries).await
}

/// Category of the first rule with a keyword contained in `filename`
#[must_use]
pub fn categorize(filename: &str, rules: &[CategoryRule]) -> String {
    let lower = filename.to_lowercase();
    rules
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|keyword| lower.contains(&keyword.to_lowercase()))
        })
        .map_or_else(|| UNCATEGORIZED.to_string(), |rule| rule.category.clone())
}

/// New index entry describing `workflow`
#[must_use]
pub fn entry_for(filename: &str, workflow: &Workflow, category: String) -> CategoryEntry {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    CategoryEntry {
        filename: Some(filename.to_string()),
        category,
        name: workflow
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| stem.to_string()),
        description: workflow.description().unwrap_or_default().to_string(),
        nodes: workflow.node_types(),
        extra: serde_json::Map::new(),
    }
}

/// Update the category of the entry for the same filename, or append
///
/// Returns true when a new entry was appended.
pub fn upsert(entries: &mut Vec<CategoryEntry>, entry: CategoryEntry) -> bool {
    let existing = entries
        .iter_mut()
        .find(|e| e.filename.is_some() && e.filename == entry.filename);
    match existing {
        Some(current) => {
            current.category = entry.category;
            false
        }
        None => {
            entries.push(entry);
            true
        }
    }
}

/// Keep the first entry per filename; entries without one are dropped
///
/// Returns the surviving entries and the number removed.
#[must_use]
pub fn dedupe_by_filename(entries: Vec<CategoryEntry>) -> (Vec<CategoryEntry>, usize) {
    let before = entries.len();
    let mut seen = HashSet::new();
    let kept: Vec<_> = entries
        .into_iter()
        .filter(|e| match &e.filename {
            Some(name) => seen.insert(name.clone()),
            None => false,
        })
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowtidy_types::Node;

    fn entry(filename: Option<&str>, category: &str) -> CategoryEntry {
        CategoryEntry {
            filename: filename.map(str::to_string),
            category: category.to_string(),
            ..CategoryEntry::default()
        }
    }

    #[test]
    fn categorize_matches_keywords_case_insensitively() {
        let rules = vec![CategoryRule {
            category: "Communication & Messaging".into(),
            keywords: vec!["Slack".into()],
        }];
        assert_eq!(
            categorize("0042_SLACK_Notify.json", &rules),
            "Communication & Messaging"
        );
        assert_eq!(categorize("0043_Cron_Backup.json", &rules), UNCATEGORIZED);
    }

    #[test]
    fn upsert_updates_category_only() {
        let mut entries = vec![CategoryEntry {
            name: "Kept name".into(),
            ..entry(Some("a.json"), "Old")
        }];
        let created = upsert(&mut entries, entry(Some("a.json"), "New"));
        assert!(!created);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, "New");
        assert_eq!(entries[0].name, "Kept name");

        assert!(upsert(&mut entries, entry(Some("b.json"), "New")));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn dedupe_keeps_first_and_drops_nameless() {
        let entries = vec![
            entry(Some("a.json"), "First"),
            entry(None, "Orphan"),
            entry(Some("a.json"), "Second"),
            entry(Some("b.json"), "Other"),
        ];
        let (kept, removed) = dedupe_by_filename(entries);
        assert_eq!(removed, 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].category, "First");
    }

    #[test]
    fn entry_falls_back_to_file_stem_with_distinct_types() {
        let mut workflow = Workflow::default();
        workflow.nodes.push(Node::new("Start", None, "n8n-nodes-base.start"));
        workflow.nodes.push(Node::new("Start again", None, "n8n-nodes-base.start"));
        let built = entry_for("0001_daily_report.json", &workflow, "Uncategorized".into());
        assert_eq!(built.name, "0001_daily_report");
        assert_eq!(built.nodes, vec!["n8n-nodes-base.start".to_string()]);
    }
}
