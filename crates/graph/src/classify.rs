//! Node role classification

use flowtidy_types::{Node, NodeRole};

/// Id prefixes given to generated error-handler and documentation nodes
pub const AUXILIARY_ID_PREFIXES: [&str; 3] = ["error-handler-", "documentation-", "doc-"];

const TRIGGER_TYPE_MARKERS: [&str; 3] = ["trigger", "webhook", "cron"];
const MANUAL_START_TYPE: &str = "n8n-nodes-base.start";

/// Classify a node; the auxiliary id convention takes precedence
#[must_use]
pub fn classify(node: &Node) -> NodeRole {
    let id = node.id.as_deref().unwrap_or_default();
    if AUXILIARY_ID_PREFIXES.iter().any(|p| id.starts_with(p)) {
        NodeRole::Auxiliary
    } else if is_trigger_type(&node.node_type) {
        NodeRole::Trigger
    } else {
        NodeRole::Regular
    }
}

/// Whether a node type names a workflow entry point
#[must_use]
pub fn is_trigger_type(node_type: &str) -> bool {
    let lowered = node_type.to_lowercase();
    TRIGGER_TYPE_MARKERS.iter().any(|m| lowered.contains(m)) || node_type == MANUAL_START_TYPE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auxiliary_by_id_prefix() {
        let node = Node::new("Handle", Some("error-handler-42"), "n8n-nodes-base.set");
        assert_eq!(classify(&node), NodeRole::Auxiliary);
        let node = Node::new("Doc", Some("documentation-x"), "n8n-nodes-base.stickyNote");
        assert_eq!(classify(&node), NodeRole::Auxiliary);
    }

    #[test]
    fn auxiliary_prefix_beats_trigger_type() {
        let node = Node::new("Note", Some("doc-1"), "n8n-nodes-base.webhook");
        assert_eq!(classify(&node), NodeRole::Auxiliary);
    }

    #[test]
    fn sticky_note_without_prefix_is_regular() {
        let node = Node::new("Note", Some("abc"), "n8n-nodes-base.stickyNote");
        assert_eq!(classify(&node), NodeRole::Regular);
    }

    #[test]
    fn trigger_markers_are_case_insensitive() {
        assert!(is_trigger_type("n8n-nodes-base.scheduleTrigger"));
        assert!(is_trigger_type("n8n-nodes-base.Webhook"));
        assert!(is_trigger_type("n8n-nodes-base.cron"));
        assert!(is_trigger_type("n8n-nodes-base.start"));
        assert!(!is_trigger_type("n8n-nodes-base.httpRequest"));
    }

    #[test]
    fn missing_id_is_not_auxiliary() {
        let node = Node::new("X", None, "n8n-nodes-base.noOp");
        assert_eq!(classify(&node), NodeRole::Regular);
    }
}
