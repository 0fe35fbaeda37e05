//! Document boundary - lossless round-trip between trees and the persisted
//! JSON tree format. File I/O itself lives outside this crate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::TreeCategory;
use crate::error::{ModelError, Result};
use crate::node::{Node, NodeId};
use crate::registry::Registry;
use crate::tree::{Edge, Tree};

/// The persisted shape of one tree file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDocument {
    pub name: String,
    pub category: TreeCategory,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Tree {
    /// Builds a tree from a parsed JSON document.
    ///
    /// Fails with `MalformedDocument` on missing/mistyped fields, duplicate
    /// node ids or edges naming nodes the document does not contain, and
    /// with `UnknownNodeType` on a type name absent from the registry.
    /// The returned tree starts clean.
    pub fn from_document(doc: Value, registry: &Registry) -> Result<Tree> {
        let doc: TreeDocument = serde_json::from_value(doc)
            .map_err(|e| ModelError::MalformedDocument(e.to_string()))?;

        let mut nodes: BTreeMap<NodeId, Node> = BTreeMap::new();
        for node in doc.nodes {
            if !registry.contains(&node.type_name) {
                return Err(ModelError::UnknownNodeType(node.type_name));
            }
            let id = node.id.clone();
            if nodes.insert(id.clone(), node).is_some() {
                return Err(ModelError::MalformedDocument(format!(
                    "duplicate node id {}",
                    id
                )));
            }
        }
        for edge in &doc.edges {
            for endpoint in [&edge.parent, &edge.child] {
                if !nodes.contains_key(endpoint) {
                    return Err(ModelError::MalformedDocument(format!(
                        "edge references missing node {}",
                        endpoint
                    )));
                }
            }
        }
        Ok(Tree::from_parts(doc.name, doc.category, nodes, doc.edges))
    }

    /// Serializes the tree back into document form. Nodes are emitted in
    /// ascending id order, edges in declared order.
    pub fn to_document(&self) -> Value {
        let doc = TreeDocument {
            name: self.name.clone(),
            category: self.category,
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().to_vec(),
        };
        serde_json::to_value(doc).expect("tree document serialization cannot fail")
    }
}
