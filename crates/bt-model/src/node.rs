//! Node - a single entity in a behaviour tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::NodeType;

/// Unique within one tree, stable across saves.
pub type NodeId = String;

/// Property key carrying the inheritable role value.
pub const ROLE_PROPERTY: &str = "ROLE";

/// Property key naming the tree a subtree-reference leaf points at.
pub const REFERENCE_PROPERTY: &str = "name";

/// Layout coordinates. Owned by the presentation layer but persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A single node. Behaviour (arity, allowed children) is not encoded here
/// but looked up from the registry through `type_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,

    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub properties: BTreeMap<String, Value>,

    #[serde(default)]
    pub position: Position,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, type_name: impl Into<String>) -> Node {
        Node {
            id: id.into(),
            type_name: type_name.into(),
            properties: BTreeMap::new(),
            position: Position::default(),
        }
    }

    /// Create a node of the given type with a fresh id and schema defaults.
    pub fn from_type(node_type: &NodeType) -> Node {
        Node {
            id: generate_id(),
            type_name: node_type.name().to_string(),
            properties: node_type.default_properties(),
            position: Position::default(),
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: Value) {
        self.properties.insert(key.into(), value);
    }

    /// Removes a property, returning false if it was not present.
    pub fn remove_property(&mut self, key: &str) -> bool {
        if self.properties.remove(key).is_none() {
            tracing::warn!(node = %self.id, key, "attempted to remove non-existent property");
            return false;
        }
        true
    }

    /// The explicit `ROLE` property, if it is a string.
    pub fn role(&self) -> Option<&str> {
        self.properties.get(ROLE_PROPERTY).and_then(Value::as_str)
    }

    /// The referenced tree name on a subtree-reference leaf.
    pub fn reference(&self) -> Option<&str> {
        self.properties
            .get(REFERENCE_PROPERTY)
            .and_then(Value::as_str)
    }
}

/// Generates a fresh node id.
pub fn generate_id() -> NodeId {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_set_and_remove() {
        let mut node = Node::new("n1", "Kick");
        node.set_property("power", Value::from(8));
        assert_eq!(node.property("power"), Some(&Value::from(8)));
        assert!(node.remove_property("power"));
        assert!(!node.remove_property("power"));
    }

    #[test]
    fn role_helper_reads_only_strings() {
        let mut node = Node::new("n1", "Sequence");
        assert_eq!(node.role(), None);
        node.set_property(ROLE_PROPERTY, Value::from("defender"));
        assert_eq!(node.role(), Some("defender"));
        node.set_property(ROLE_PROPERTY, Value::from(3));
        assert_eq!(node.role(), None);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
