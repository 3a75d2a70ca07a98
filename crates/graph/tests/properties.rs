//! Property tests for orphan detection and repair

use flowtidy_graph::{classify, repair, Connectivity, RepairStatus, AUXILIARY_ID_PREFIXES};
use flowtidy_types::{ConnectionTarget, Node, NodeRole, OutputSlot, RepairMode, Workflow};
use proptest::prelude::*;
use std::collections::HashSet;

const TYPES: [&str; 5] = [
    "n8n-nodes-base.start",
    "n8n-nodes-base.webhook",
    "n8n-nodes-base.set",
    "n8n-nodes-base.stickyNote",
    "n8n-nodes-base.httpRequest",
];

fn arb_workflow() -> impl Strategy<Value = Workflow> {
    (1usize..8)
        .prop_flat_map(|n| {
            (
                Just(n),
                proptest::collection::vec((0usize..5, 0usize..5), n),
                proptest::collection::vec((0..n, 0..n), 0..n),
            )
        })
        .prop_map(|(n, kinds, edges)| {
            let nodes = (0..n)
                .map(|i| {
                    let (id_kind, type_idx) = kinds[i];
                    let id = match id_kind {
                        0..=2 => format!("{}{i}", AUXILIARY_ID_PREFIXES[id_kind]),
                        _ => format!("node-{i}"),
                    };
                    Node::new(format!("N{i}"), Some(id.as_str()), TYPES[type_idx])
                })
                .collect();
            let mut wf = Workflow {
                nodes,
                ..Workflow::default()
            };
            for (from, to) in edges {
                wf.connections
                    .entry(format!("N{from}"))
                    .or_default()
                    .entry("main".to_string())
                    .or_default()
                    .push(OutputSlot(vec![ConnectionTarget::main(format!("N{to}"))]));
            }
            wf
        })
}

proptest! {
    #[test]
    fn orphans_are_nodes_minus_referenced(wf in arb_workflow()) {
        let c = Connectivity::analyze(&wf);
        let referenced: HashSet<String> = wf
            .connections
            .keys()
            .cloned()
            .chain(wf.edges().map(|(_, t)| t.node.clone()))
            .collect();
        let expected: Vec<String> = wf
            .node_names()
            .filter(|n| !referenced.contains(*n))
            .map(str::to_string)
            .collect();
        prop_assert_eq!(c.orphaned, expected);
    }

    #[test]
    fn minimal_only_removes_auxiliary_orphans(wf in arb_workflow()) {
        let c = Connectivity::analyze(&wf);
        let original = wf.clone();
        let mut fixed = wf;
        let outcome = repair(&mut fixed, RepairMode::Minimal);
        for name in &outcome.removed {
            prop_assert!(c.orphaned.contains(name));
            let node = original.node(name).unwrap();
            prop_assert_eq!(classify(node), NodeRole::Auxiliary);
        }
        prop_assert_eq!(fixed.nodes.len() + outcome.removed.len(), original.nodes.len());
    }

    #[test]
    fn aggressive_leaves_no_orphans(wf in arb_workflow()) {
        prop_assume!(wf.nodes.len() >= 2);
        let mut fixed = wf;
        let outcome = repair(&mut fixed, RepairMode::Aggressive);
        prop_assert!(Connectivity::analyze(&fixed).orphaned.is_empty());
        prop_assert_ne!(outcome.status, RepairStatus::Unresolved);
    }
}
