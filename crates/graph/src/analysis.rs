//! Connectivity analysis

use flowtidy_types::{OrphanInfo, Workflow, WorkflowAnalysis};
use std::collections::HashSet;
use std::path::Path;

use crate::classify::classify;

/// Node sets derived from one pass over a workflow
#[derive(Debug, Clone, Default)]
pub struct Connectivity {
    /// Every node name, in document order
    pub all: Vec<String>,
    /// Names that appear as a connection source or target
    ///
    /// May contain names with no matching node.
    pub connected: HashSet<String>,
    /// `all` minus `connected`, in document order
    pub orphaned: Vec<String>,
}

impl Connectivity {
    #[must_use]
    pub fn analyze(workflow: &Workflow) -> Self {
        let mut connected = HashSet::new();
        for source in workflow.connections.keys() {
            connected.insert(source.clone());
        }
        for (_, target) in workflow.edges() {
            connected.insert(target.node.clone());
        }

        let all: Vec<String> = workflow.node_names().map(str::to_string).collect();
        let orphaned = all
            .iter()
            .filter(|name| !connected.contains(*name))
            .cloned()
            .collect();

        Self {
            all,
            connected,
            orphaned,
        }
    }

    #[must_use]
    pub fn is_orphan(&self, name: &str) -> bool {
        !self.connected.contains(name) && self.all.iter().any(|n| n == name)
    }

    /// Number of nodes taking part in at least one connection
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.all.len() - self.orphaned.len()
    }

    #[must_use]
    pub fn coverage(&self) -> f64 {
        coverage_percent(self.all.len(), self.orphaned.len())
    }

    /// Build the per-file report shown by single-file checks
    #[must_use]
    pub fn to_analysis(&self, workflow: &Workflow, path: &Path) -> WorkflowAnalysis {
        let orphans = self
            .orphaned
            .iter()
            .filter_map(|name| workflow.node(name))
            .map(|node| OrphanInfo {
                name: node.name.clone(),
                id: node.id.clone(),
                node_type: node.node_type.clone(),
                role: classify(node),
            })
            .collect();

        WorkflowAnalysis {
            path: path.to_path_buf(),
            workflow_name: workflow.name.clone(),
            total_nodes: self.all.len(),
            connected_nodes: self.connected_count(),
            orphaned_nodes: self.orphaned.len(),
            coverage: self.coverage(),
            orphans,
        }
    }
}

/// Share of non-orphaned nodes as a percentage, 0 for an empty workflow
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn coverage_percent(total: usize, orphaned: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (total.saturating_sub(orphaned)) as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workflow(value: serde_json::Value) -> Workflow {
        Workflow::from_value(value).unwrap()
    }

    #[test]
    fn sources_and_targets_are_connected() {
        let wf = workflow(json!({
            "nodes": [{"name": "A"}, {"name": "B"}, {"name": "C"}],
            "connections": {"A": {"main": [[{"node": "B", "type": "main", "index": 0}]]}}
        }));
        let c = Connectivity::analyze(&wf);
        assert_eq!(c.orphaned, vec!["C"]);
        assert_eq!(c.connected_count(), 2);
        assert!(c.is_orphan("C"));
        assert!(!c.is_orphan("A"));
    }

    #[test]
    fn dangling_references_do_not_inflate_coverage() {
        let wf = workflow(json!({
            "nodes": [{"name": "A"}, {"name": "B"}],
            "connections": {"Ghost": {"main": [[{"node": "A", "type": "main", "index": 0}]]}}
        }));
        let c = Connectivity::analyze(&wf);
        assert_eq!(c.orphaned, vec!["B"]);
        assert!((c.coverage() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_workflow_has_zero_coverage() {
        let wf = workflow(json!({"nodes": [], "connections": {}}));
        let c = Connectivity::analyze(&wf);
        assert!(c.all.is_empty());
        assert!(c.coverage().abs() < f64::EPSILON);
    }

    #[test]
    fn analysis_lists_orphan_roles() {
        let wf = workflow(json!({
            "name": "Demo",
            "nodes": [
                {"name": "Start", "id": "trigger-1", "type": "n8n-nodes-base.start"},
                {"name": "Note", "id": "doc-1", "type": "n8n-nodes-base.stickyNote"}
            ],
            "connections": {}
        }));
        let analysis = Connectivity::analyze(&wf).to_analysis(&wf, Path::new("demo.json"));
        assert_eq!(analysis.total_nodes, 2);
        assert_eq!(analysis.orphaned_nodes, 2);
        assert_eq!(analysis.orphans[0].role, flowtidy_types::NodeRole::Trigger);
        assert_eq!(analysis.orphans[1].role, flowtidy_types::NodeRole::Auxiliary);
    }
}
