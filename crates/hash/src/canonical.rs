//! Canonical JSON form used for content comparison

use flowtidy_errors::Error;
use serde_json::{Map, Value};

/// Top-level fields that change on every export without changing the workflow
pub const VOLATILE_FIELDS: [&str; 3] = ["createdAt", "updatedAt", "id"];

/// Remove the volatile top-level fields from an object in place
///
/// Non-object values are left untouched.
pub fn strip_volatile_fields(value: &mut Value) {
    if let Value::Object(map) = value {
        for field in VOLATILE_FIELDS {
            map.shift_remove(field);
        }
    }
}

/// Rebuild `value` with every object's keys in sorted order
#[must_use]
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let sorted: Map<String, Value> = keys
                .into_iter()
                .map(|k| (k.clone(), canonicalize(&map[k])))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Compact serialization of the canonical form
///
/// # Errors
/// Returns an error if serialization fails.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>, Error> {
    Ok(serde_json::to_vec(&canonicalize(value))?)
}
