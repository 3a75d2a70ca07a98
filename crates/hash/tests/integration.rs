//! Integration tests for canonical workflow hashing

use flowtidy_hash::{strip_volatile_fields, Hash};
use serde_json::json;

fn normalized_hash(mut doc: serde_json::Value) -> Hash {
    strip_volatile_fields(&mut doc);
    Hash::from_canonical_json(&doc).unwrap()
}

#[test]
fn exports_differing_only_in_volatile_fields_match() {
    let first = json!({
        "id": "1",
        "createdAt": "2024-01-01T00:00:00Z",
        "name": "Slack alert",
        "nodes": [{"name": "A", "type": "n8n-nodes-base.slack"}],
        "connections": {}
    });
    let second = json!({
        "connections": {},
        "nodes": [{"type": "n8n-nodes-base.slack", "name": "A"}],
        "name": "Slack alert",
        "updatedAt": "2025-06-01T00:00:00Z",
        "id": "77"
    });
    assert_eq!(normalized_hash(first), normalized_hash(second));
}

#[test]
fn nested_ids_still_distinguish_documents() {
    let first = json!({"nodes": [{"name": "A", "id": "a-1"}]});
    let second = json!({"nodes": [{"name": "A", "id": "a-2"}]});
    assert_ne!(normalized_hash(first), normalized_hash(second));
}
