//! Workflow document model
//!
//! A workflow is an exported automation graph: an ordered list of nodes and
//! an adjacency map keyed by source node name. Fields the model does not name
//! are carried in `extra` maps so a load/save cycle leaves them untouched.

use indexmap::IndexMap;
use serde::de::{self, Error as _};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Connection kind used for the regular data flow between nodes
pub const MAIN_CONNECTION: &str = "main";

/// Outgoing connections of one node, keyed by connection kind
pub type NodeOutputs = IndexMap<String, Vec<OutputSlot>>;

/// Adjacency map keyed by source node name
pub type Connections = IndexMap<String, NodeOutputs>;

/// A complete workflow document
///
/// Serialization writes keys back in the order they were read, with the
/// named fields in their original positions. New keys go last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workflow {
    pub name: Option<String>,
    pub nodes: Vec<Node>,
    pub connections: Connections,
    pub extra: Map<String, Value>,
    /// Key order of the source document
    pub key_order: Vec<String>,
}

/// A single node record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub name: String,
    pub id: Option<String>,
    pub node_type: String,
    pub extra: Map<String, Value>,
    /// Key order of the source record
    pub key_order: Vec<String>,
}

/// Reference from an output slot to a target node input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    pub node: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub index: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_kind() -> String {
    MAIN_CONNECTION.to_string()
}

/// All targets wired to one output index of a node
///
/// Exports sometimes contain `null` for an unused output; it reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OutputSlot(pub Vec<ConnectionTarget>);

impl<'de> Deserialize<'de> for OutputSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let targets = Option::<Vec<ConnectionTarget>>::deserialize(deserializer)?;
        Ok(Self(targets.unwrap_or_default()))
    }
}

impl ConnectionTarget {
    /// Plain `main` link into input 0 of `node`
    #[must_use]
    pub fn main(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            kind: default_kind(),
            index: 0,
            extra: Map::new(),
        }
    }
}

impl Node {
    /// Create a node with the given name, id and type
    #[must_use]
    pub fn new(name: impl Into<String>, id: Option<&str>, node_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.map(str::to_string),
            node_type: node_type.into(),
            extra: Map::new(),
            key_order: Vec::new(),
        }
    }
}

impl Workflow {
    /// Interpret an already parsed JSON value as a workflow
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not have the workflow shape.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Serialize back to a JSON value
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Names of all nodes, in document order
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    /// Look up a node by name
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Every `(source, target)` pair across all connection kinds
    pub fn edges(&self) -> impl Iterator<Item = (&str, &ConnectionTarget)> {
        self.connections.iter().flat_map(|(source, outputs)| {
            outputs
                .values()
                .flatten()
                .flat_map(|slot| slot.0.iter())
                .map(move |target| (source.as_str(), target))
        })
    }

    /// Distinct node types in first-seen order
    #[must_use]
    pub fn node_types(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.nodes
            .iter()
            .filter(|n| !n.node_type.is_empty())
            .filter(|n| seen.insert(n.node_type.as_str()))
            .map(|n| n.node_type.clone())
            .collect()
    }

    /// Free-text description, if the document carries one
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.extra.get("description").and_then(Value::as_str)
    }
}

/// Rebuild an object with its keys in `key_order`
///
/// A named field that is `None` is written as `null` when the source had the
/// key and left out otherwise.
fn ordered_object(
    key_order: &[String],
    named: Vec<(&'static str, Option<Value>)>,
    extra: &Map<String, Value>,
) -> Map<String, Value> {
    let mut named: IndexMap<&str, Option<Value>> = named.into_iter().collect();
    let mut out = Map::new();
    for key in key_order {
        if let Some(value) = named.shift_remove(key.as_str()) {
            out.insert(key.clone(), value.unwrap_or(Value::Null));
        } else if let Some(value) = extra.get(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in named {
        if let Some(value) = value {
            out.insert(key.to_string(), value);
        }
    }
    for (key, value) in extra {
        if !out.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

/// Take an optional string field; `null` reads as absent
fn take_string<E: de::Error>(
    map: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, E> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(E::invalid_type(unexpected(&other), &"a string")),
    }
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(b) => de::Unexpected::Bool(*b),
        Value::Number(_) => de::Unexpected::Other("number"),
        Value::String(s) => de::Unexpected::Str(s),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
    }
}

impl<'de> Deserialize<'de> for Workflow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        let key_order = map.keys().cloned().collect();
        let name = take_string::<D::Error>(&mut map, "name")?;
        let nodes: Vec<Node> = match map.remove("nodes") {
            Some(value) => serde_json::from_value(value).map_err(D::Error::custom)?,
            None => return Err(D::Error::missing_field("nodes")),
        };
        let connections: Connections = match map.remove("connections") {
            Some(value) => serde_json::from_value(value).map_err(D::Error::custom)?,
            None => Connections::default(),
        };
        Ok(Self {
            name,
            nodes,
            connections,
            extra: map,
            key_order,
        })
    }
}

impl Serialize for Workflow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let nodes = serde_json::to_value(&self.nodes).map_err(S::Error::custom)?;
        let connections = serde_json::to_value(&self.connections).map_err(S::Error::custom)?;
        let named = vec![
            ("name", self.name.clone().map(Value::String)),
            ("nodes", Some(nodes)),
            ("connections", Some(connections)),
        ];
        ordered_object(&self.key_order, named, &self.extra).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        let key_order = map.keys().cloned().collect();
        let name = match map.remove("name") {
            Some(Value::String(name)) => name,
            Some(other) => return Err(D::Error::invalid_type(unexpected(&other), &"a string")),
            None => return Err(D::Error::missing_field("name")),
        };
        let id = take_string::<D::Error>(&mut map, "id")?;
        let node_type = match map.remove("type") {
            None => String::new(),
            Some(Value::String(t)) => t,
            Some(other) => return Err(D::Error::invalid_type(unexpected(&other), &"a string")),
        };
        Ok(Self {
            name,
            id,
            node_type,
            extra: map,
            key_order,
        })
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let had_type = self.key_order.iter().any(|k| k == "type");
        let node_type = (had_type || !self.node_type.is_empty())
            .then(|| Value::String(self.node_type.clone()));
        let named = vec![
            ("name", Some(Value::String(self.name.clone()))),
            ("id", self.id.clone().map(Value::String)),
            ("type", node_type),
        ];
        ordered_object(&self.key_order, named, &self.extra).serialize(serializer)
    }
}

/// Role a node plays for repair decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Entry point of the workflow (trigger, webhook, cron, manual start)
    Trigger,
    /// Error handler or documentation node recognised by id prefix
    Auxiliary,
    Regular,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trigger => write!(f, "trigger"),
            Self::Auxiliary => write!(f, "auxiliary"),
            Self::Regular => write!(f, "regular"),
        }
    }
}
