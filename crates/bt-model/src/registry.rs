//! Node type registry - the catalogue of legal node kinds.
//!
//! Loaded once at startup from external tabular data and read-only for the
//! rest of the process. The registry is passed by reference into the tree
//! model and the verifier rather than living in ambient global state, so
//! tests can run in parallel with distinct registries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, Result};

/// Category of a node kind, driving arity rules and structure checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Selector,
    Sequence,
    Decorator,
    Leaf,
    Role,
    Tactic,
    Strategy,
    Keeper,
    Other,
}

/// Allowed child count class for a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildArity {
    /// Leaf, no children.
    None,
    /// Decorator, exactly one child.
    One,
    /// Composite, one or more children.
    Many,
}

/// Expected value kind for a declared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Number,
    Bool,
}

impl PropertyKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            PropertyKind::String => value.is_string(),
            PropertyKind::Number => value.is_number(),
            PropertyKind::Bool => value.is_boolean(),
        }
    }
}

/// One declared property in a node type's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,

    pub kind: PropertyKind,

    /// Value a freshly created node starts with.
    #[serde(default)]
    pub default: Value,
}

/// One row of the external node type catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRow {
    pub name: String,

    pub category: NodeCategory,

    pub arity: ChildArity,

    #[serde(default)]
    pub properties: Vec<PropertySpec>,
}

/// Immutable descriptor of a legal node kind.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeType {
    name: String,
    category: NodeCategory,
    arity: ChildArity,
    schema: Vec<PropertySpec>,
}

impl NodeType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> NodeCategory {
        self.category
    }

    pub fn arity(&self) -> ChildArity {
        self.arity
    }

    pub fn schema(&self) -> &[PropertySpec] {
        &self.schema
    }

    /// Property map seeded with the schema defaults.
    pub fn default_properties(&self) -> BTreeMap<String, Value> {
        self.schema
            .iter()
            .map(|spec| (spec.name.clone(), spec.default.clone()))
            .collect()
    }
}

/// The loaded catalogue, keyed by type name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    types: BTreeMap<String, NodeType>,
}

impl Registry {
    /// Build a registry from catalogue rows.
    ///
    /// Fails with `MalformedRow` on an empty type name, a duplicate type
    /// name, or a property default that does not match its declared kind.
    pub fn load(rows: impl IntoIterator<Item = TypeRow>) -> Result<Registry> {
        let mut types = BTreeMap::new();
        for row in rows {
            if row.name.trim().is_empty() {
                return Err(ModelError::MalformedRow("empty type name".to_string()));
            }
            for spec in &row.properties {
                // Null defaults are filled in per kind below.
                if !spec.default.is_null() && !spec.kind.matches(&spec.default) {
                    return Err(ModelError::MalformedRow(format!(
                        "default for property {} of type {} does not match kind {:?}",
                        spec.name, row.name, spec.kind
                    )));
                }
            }
            let schema = row
                .properties
                .into_iter()
                .map(|mut spec| {
                    if spec.default.is_null() {
                        spec.default = match spec.kind {
                            PropertyKind::String => Value::String(String::new()),
                            PropertyKind::Number => Value::from(0),
                            PropertyKind::Bool => Value::Bool(false),
                        };
                    }
                    spec
                })
                .collect();
            let node_type = NodeType {
                name: row.name.clone(),
                category: row.category,
                arity: row.arity,
                schema,
            };
            if types.insert(row.name.clone(), node_type).is_some() {
                return Err(ModelError::MalformedRow(format!(
                    "duplicate type name {}",
                    row.name
                )));
            }
        }
        tracing::debug!(types = types.len(), "node type registry loaded");
        Ok(Registry { types })
    }

    pub fn get(&self, name: &str) -> Option<&NodeType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// All types of a given category, in name order.
    pub fn types_in(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
