//! Repair policies

use flowtidy_types::{ConnectionTarget, NodeRole, OutputSlot, RepairMode, Workflow, MAIN_CONNECTION};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::analysis::Connectivity;
use crate::classify::{classify, is_trigger_type};

/// What a repair pass did to a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    /// No orphans; document untouched
    Clean,
    /// Document was modified
    Repaired,
    /// Orphans remain and the policy had nothing it could change
    Unresolved,
    /// Document has no nodes
    Empty,
}

/// Statistics for a single repair pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairOutcome {
    pub status: RepairStatus,
    pub orphans_before: usize,
    pub orphans_after: usize,
    pub coverage_before: f64,
    pub coverage_after: f64,
    /// Nodes deleted by the minimal policy
    pub removed: Vec<String>,
    /// Nodes spliced into the chain by the aggressive policy
    pub linked: Vec<String>,
}

impl RepairOutcome {
    fn untouched(status: RepairStatus, before: &Connectivity) -> Self {
        Self {
            status,
            orphans_before: before.orphaned.len(),
            orphans_after: before.orphaned.len(),
            coverage_before: before.coverage(),
            coverage_after: before.coverage(),
            removed: Vec::new(),
            linked: Vec::new(),
        }
    }

    #[must_use]
    pub fn changed(&self) -> bool {
        self.status == RepairStatus::Repaired
    }
}

/// Apply `mode` to `workflow` in place
#[must_use]
pub fn repair(workflow: &mut Workflow, mode: RepairMode) -> RepairOutcome {
    let before = Connectivity::analyze(workflow);
    if workflow.nodes.is_empty() {
        return RepairOutcome::untouched(RepairStatus::Empty, &before);
    }
    if before.orphaned.is_empty() {
        return RepairOutcome::untouched(RepairStatus::Clean, &before);
    }

    let (removed, linked) = match mode {
        RepairMode::Minimal => (remove_auxiliary_orphans(workflow, &before), Vec::new()),
        RepairMode::Aggressive => (Vec::new(), link_orphans(workflow, &before)),
    };

    if removed.is_empty() && linked.is_empty() {
        return RepairOutcome::untouched(RepairStatus::Unresolved, &before);
    }

    let after = Connectivity::analyze(workflow);
    RepairOutcome {
        status: RepairStatus::Repaired,
        orphans_before: before.orphaned.len(),
        orphans_after: after.orphaned.len(),
        coverage_before: before.coverage(),
        coverage_after: after.coverage(),
        removed,
        linked,
    }
}

fn remove_auxiliary_orphans(workflow: &mut Workflow, before: &Connectivity) -> Vec<String> {
    let doomed: Vec<String> = workflow
        .nodes
        .iter()
        .filter(|n| before.is_orphan(&n.name) && classify(n) == NodeRole::Auxiliary)
        .map(|n| n.name.clone())
        .collect();
    if doomed.is_empty() {
        return doomed;
    }

    let doomed_set: HashSet<&str> = doomed.iter().map(String::as_str).collect();
    workflow.nodes.retain(|n| !doomed_set.contains(n.name.as_str()));

    workflow.connections.retain(|source, outputs| {
        if doomed_set.contains(source.as_str()) {
            return false;
        }
        let mut had_targets = false;
        let mut has_targets = false;
        for slot in outputs.values_mut().flatten() {
            had_targets |= !slot.0.is_empty();
            slot.0.retain(|t| !doomed_set.contains(t.node.as_str()));
            has_targets |= !slot.0.is_empty();
        }
        has_targets || !had_targets
    });

    doomed
}

/// Chain orphans after an anchor node, returning the names that were linked
fn link_orphans(workflow: &mut Workflow, before: &Connectivity) -> Vec<String> {
    let Some(anchor) = pick_anchor(workflow, before) else {
        return Vec::new();
    };
    let chain: Vec<String> = before
        .orphaned
        .iter()
        .filter(|name| **name != anchor)
        .cloned()
        .collect();
    let Some(first) = chain.first() else {
        return Vec::new();
    };

    let outputs = workflow.connections.entry(anchor).or_default();
    let main = outputs.entry(MAIN_CONNECTION.to_string()).or_default();
    if main.is_empty() {
        main.push(OutputSlot::default());
    }
    main[0].0.push(ConnectionTarget::main(first.clone()));

    for pair in chain.windows(2) {
        let outputs = workflow.connections.entry(pair[0].clone()).or_default();
        outputs.insert(
            MAIN_CONNECTION.to_string(),
            vec![OutputSlot(vec![ConnectionTarget::main(pair[1].clone())])],
        );
    }

    chain
}

/// Last connected node that is not the first trigger, else the first
/// trigger, else the first node
fn pick_anchor(workflow: &Workflow, before: &Connectivity) -> Option<String> {
    let first_trigger = workflow
        .nodes
        .iter()
        .find(|n| is_trigger_type(&n.node_type))
        .or_else(|| workflow.nodes.first())?;

    let last_connected = workflow
        .nodes
        .iter()
        .rev()
        .find(|n| n.name != first_trigger.name && before.connected.contains(&n.name));

    Some(last_connected.unwrap_or(first_trigger).name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Workflow {
        Workflow::from_value(json!({
            "nodes": [
                {"name": "A", "id": "trigger-1", "type": "n8n-nodes-base.start"},
                {"name": "B", "id": "doc-1", "type": "n8n-nodes-base.stickyNote"}
            ],
            "connections": {}
        }))
        .unwrap()
    }

    #[test]
    fn minimal_removes_only_auxiliary_orphan() {
        let mut wf = sample();
        let outcome = repair(&mut wf, RepairMode::Minimal);
        assert_eq!(outcome.status, RepairStatus::Repaired);
        assert_eq!(outcome.removed, vec!["B"]);
        assert_eq!(wf.node_names().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(outcome.orphans_before, 2);
        assert_eq!(outcome.orphans_after, 1);
    }

    #[test]
    fn aggressive_links_trigger_to_orphan() {
        let mut wf = sample();
        let outcome = repair(&mut wf, RepairMode::Aggressive);
        assert_eq!(outcome.status, RepairStatus::Repaired);
        assert_eq!(outcome.linked, vec!["B"]);
        assert_eq!(outcome.orphans_after, 0);
        assert_eq!(wf.connections["A"]["main"][0].0[0].node, "B");
        assert!((outcome.coverage_after - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn aggressive_appends_after_last_connected_node() {
        let mut wf = Workflow::from_value(json!({
            "nodes": [
                {"name": "Hook", "type": "n8n-nodes-base.webhook"},
                {"name": "Set", "type": "n8n-nodes-base.set"},
                {"name": "Lost1", "type": "n8n-nodes-base.noOp"},
                {"name": "Lost2", "type": "n8n-nodes-base.noOp"}
            ],
            "connections": {"Hook": {"main": [[{"node": "Set", "type": "main", "index": 0}]]}}
        }))
        .unwrap();
        let outcome = repair(&mut wf, RepairMode::Aggressive);
        assert_eq!(outcome.linked, vec!["Lost1", "Lost2"]);
        assert_eq!(wf.connections["Set"]["main"][0].0[0].node, "Lost1");
        assert_eq!(wf.connections["Lost1"]["main"][0].0[0].node, "Lost2");
        assert!(Connectivity::analyze(&wf).orphaned.is_empty());
    }

    #[test]
    fn minimal_keeps_unprefixed_orphans() {
        let mut wf = Workflow::from_value(json!({
            "nodes": [{"name": "A", "id": "x", "type": "n8n-nodes-base.stickyNote"}, {"name": "B", "id": "y"}],
            "connections": {}
        }))
        .unwrap();
        let outcome = repair(&mut wf, RepairMode::Minimal);
        assert_eq!(outcome.status, RepairStatus::Unresolved);
        assert_eq!(wf.nodes.len(), 2);
    }

    #[test]
    fn minimal_keeps_nodes_reached_from_dangling_sources() {
        let mut wf = Workflow::from_value(json!({
            "nodes": [
                {"name": "A", "type": "n8n-nodes-base.manualTrigger"},
                {"name": "B"},
                {"name": "Err", "id": "error-handler-1"}
            ],
            "connections": {
                "A": {"main": [[{"node": "B", "type": "main", "index": 0}]]},
                "Ghost": {"main": [[{"node": "Err", "type": "main", "index": 0}]]}
            }
        }))
        .unwrap();
        // Err is connected through Ghost, so nothing is removed
        let outcome = repair(&mut wf, RepairMode::Minimal);
        assert_eq!(outcome.status, RepairStatus::Clean);
        assert_eq!(wf.nodes.len(), 3);
    }

    #[test]
    fn lone_node_is_unresolved() {
        let mut wf = Workflow::from_value(json!({
            "nodes": [{"name": "Only", "type": "n8n-nodes-base.start"}],
            "connections": {}
        }))
        .unwrap();
        let outcome = repair(&mut wf, RepairMode::Aggressive);
        assert_eq!(outcome.status, RepairStatus::Unresolved);
        assert!(wf.connections.is_empty());
    }

    #[test]
    fn empty_and_clean_documents_are_untouched() {
        let mut wf = Workflow::from_value(json!({"nodes": [], "connections": {}})).unwrap();
        assert_eq!(repair(&mut wf, RepairMode::Aggressive).status, RepairStatus::Empty);

        let mut wf = Workflow::from_value(json!({
            "nodes": [{"name": "A"}, {"name": "B"}],
            "connections": {"A": {"main": [[{"node": "B", "type": "main", "index": 0}]]}}
        }))
        .unwrap();
        let outcome = repair(&mut wf, RepairMode::Minimal);
        assert_eq!(outcome.status, RepairStatus::Clean);
        assert!(!outcome.changed());
    }
}
