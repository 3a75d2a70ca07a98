//! Structural checks run before a workflow is handed to the engine

use flowtidy_types::Workflow;
use serde_json::Value;
use thiserror::Error;

use crate::analysis::Connectivity;

/// Largest tolerated share of orphaned nodes
pub const MAX_ORPHAN_RATIO: f64 = 0.5;

/// A reason a document cannot be imported
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    #[error("document is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("workflow has no nodes")]
    EmptyNodes,

    #[error("invalid workflow structure: {0}")]
    Unreadable(String),

    #[error("too many orphaned nodes: {orphaned} of {total}")]
    TooManyOrphans { orphaned: usize, total: usize },
}

/// Check a parsed document and return it as a workflow when importable
///
/// All structural issues are collected. The orphan ratio is only checked
/// once the document reads as a workflow with at least two nodes, so a
/// lone node without connections is accepted.
///
/// # Errors
///
/// Returns every issue found when the document should not be imported.
#[allow(clippy::cast_precision_loss)]
pub fn validate_for_import(value: Value) -> Result<Workflow, Vec<ValidationIssue>> {
    let Value::Object(map) = &value else {
        return Err(vec![ValidationIssue::NotAnObject]);
    };

    let mut issues = Vec::new();
    match map.get("nodes") {
        None => issues.push(ValidationIssue::MissingField("nodes")),
        Some(Value::Array(nodes)) if nodes.is_empty() => issues.push(ValidationIssue::EmptyNodes),
        Some(Value::Array(_)) => {}
        Some(_) => issues.push(ValidationIssue::WrongType {
            field: "nodes",
            expected: "an array",
        }),
    }
    match map.get("connections") {
        None => issues.push(ValidationIssue::MissingField("connections")),
        Some(Value::Object(_)) => {}
        Some(_) => issues.push(ValidationIssue::WrongType {
            field: "connections",
            expected: "an object",
        }),
    }
    if !issues.is_empty() {
        return Err(issues);
    }

    let workflow = Workflow::from_value(value)
        .map_err(|e| vec![ValidationIssue::Unreadable(e.to_string())])?;

    let connectivity = Connectivity::analyze(&workflow);
    let total = connectivity.all.len();
    let orphaned = connectivity.orphaned.len();
    if total >= 2 && orphaned as f64 / total as f64 > MAX_ORPHAN_RATIO {
        return Err(vec![ValidationIssue::TooManyOrphans { orphaned, total }]);
    }

    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_single_node_without_connections() {
        let wf = validate_for_import(json!({
            "nodes": [{"name": "A", "type": "n8n-nodes-base.start"}],
            "connections": {}
        }))
        .unwrap();
        assert_eq!(wf.nodes.len(), 1);
    }

    #[test]
    fn rejects_non_object() {
        let issues = validate_for_import(json!([1, 2])).unwrap_err();
        assert_eq!(issues, vec![ValidationIssue::NotAnObject]);
    }

    #[test]
    fn collects_all_structural_issues() {
        let issues = validate_for_import(json!({"nodes": []})).unwrap_err();
        assert_eq!(
            issues,
            vec![
                ValidationIssue::EmptyNodes,
                ValidationIssue::MissingField("connections")
            ]
        );
    }

    #[test]
    fn rejects_wrong_field_types() {
        let issues = validate_for_import(json!({"nodes": {}, "connections": []})).unwrap_err();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].to_string().contains("nodes"));
    }

    #[test]
    fn half_orphaned_is_accepted_more_is_rejected() {
        let half = json!({
            "nodes": [{"name": "A"}, {"name": "B"}, {"name": "C"}, {"name": "D"}],
            "connections": {"A": {"main": [[{"node": "B", "type": "main", "index": 0}]]}}
        });
        assert!(validate_for_import(half).is_ok());

        let most = json!({
            "nodes": [{"name": "A"}, {"name": "B"}, {"name": "C"}],
            "connections": {"A": {"main": [[]]}}
        });
        let issues = validate_for_import(most).unwrap_err();
        assert_eq!(
            issues,
            vec![ValidationIssue::TooManyOrphans {
                orphaned: 2,
                total: 3
            }]
        );
    }

    #[test]
    fn nodes_without_names_are_unreadable() {
        let issues = validate_for_import(json!({
            "nodes": [{"type": "x"}],
            "connections": {}
        }))
        .unwrap_err();
        assert!(matches!(issues[0], ValidationIssue::Unreadable(_)));
    }
}
