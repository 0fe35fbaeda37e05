//! Tree - an in-memory directed graph of nodes and edges.
//!
//! Mutations deliberately do not validate arity or acyclicity: mid-edit
//! states (a dragged edge, a half-moved subtree) are allowed to be invalid
//! and the verifier is the single source of truth for validity.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::TreeCategory;
use crate::error::{ModelError, Result};
use crate::node::{Node, NodeId};
use crate::registry::NodeType;

/// Directed parent-child relation. `order_index` is significant for ordered
/// composites (Sequence) and carried but irrelevant for unordered ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub parent: NodeId,
    pub child: NodeId,
    #[serde(rename = "order", default)]
    pub order_index: u32,
}

/// How `remove_node` treats the removed node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMode {
    /// Drop incident edges only; children stay behind as new roots.
    Detach,
    /// Promote children to the removed node's former parents.
    ReconnectChildren,
    /// Delete the whole subtree below the node.
    Cascade,
}

/// One behaviour tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub name: String,
    pub category: TreeCategory,
    nodes: BTreeMap<NodeId, Node>,
    edges: Vec<Edge>,
    dirty: bool,
}

impl Tree {
    pub fn new(name: impl Into<String>, category: TreeCategory) -> Tree {
        Tree {
            name: name.into(),
            category,
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            dirty: false,
        }
    }

    /// Creates a node of the given type, seeded with schema defaults and
    /// overlaid with `properties`, and returns its generated id.
    pub fn add_node(
        &mut self,
        node_type: &NodeType,
        properties: BTreeMap<String, Value>,
    ) -> NodeId {
        let mut node = Node::from_type(node_type);
        node.properties.extend(properties);
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        self.dirty = true;
        id
    }

    /// Inserts a node that already carries an id, e.g. from a document.
    pub fn insert_node(&mut self, node: Node) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(ModelError::DuplicateId(node.id));
        }
        self.nodes.insert(node.id.clone(), node);
        self.dirty = true;
        Ok(())
    }

    /// Removes a node and its incident edges. The fate of its children is
    /// decided by `mode`.
    pub fn remove_node(&mut self, id: &str, mode: RemovalMode) -> Result<()> {
        if !self.nodes.contains_key(id) {
            return Err(ModelError::InvalidReference(id.to_string()));
        }
        match mode {
            RemovalMode::Detach => {
                self.drop_node(id);
            }
            RemovalMode::ReconnectChildren => {
                // Self-loops on the removed node would otherwise re-enter
                // the rewiring as both parent and child, producing edges
                // that name a node no longer in the tree.
                let parents: Vec<NodeId> = self
                    .edges
                    .iter()
                    .filter(|e| e.child == id && e.parent != id)
                    .map(|e| e.parent.clone())
                    .collect();
                let children: Vec<Edge> = self
                    .edges
                    .iter()
                    .filter(|e| e.parent == id && e.child != id)
                    .cloned()
                    .collect();
                self.drop_node(id);
                for parent in parents {
                    for edge in &children {
                        self.edges.push(Edge {
                            parent: parent.clone(),
                            child: edge.child.clone(),
                            order_index: edge.order_index,
                        });
                    }
                }
            }
            RemovalMode::Cascade => {
                for victim in self.subtree_ids(id) {
                    self.drop_node(&victim);
                }
            }
        }
        self.dirty = true;
        Ok(())
    }

    fn drop_node(&mut self, id: &str) {
        self.nodes.remove(id);
        self.edges.retain(|e| e.parent != id && e.child != id);
    }

    /// Adds a directed edge. Both endpoints must exist; nothing else is
    /// checked here.
    pub fn connect(&mut self, parent: &str, child: &str, order_index: u32) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(ModelError::InvalidReference(parent.to_string()));
        }
        if !self.nodes.contains_key(child) {
            return Err(ModelError::InvalidReference(child.to_string()));
        }
        self.edges.push(Edge {
            parent: parent.to_string(),
            child: child.to_string(),
            order_index,
        });
        self.dirty = true;
        Ok(())
    }

    /// Removes the first edge between the given endpoints.
    pub fn disconnect(&mut self, parent: &str, child: &str) -> Result<()> {
        let index = self
            .edges
            .iter()
            .position(|e| e.parent == parent && e.child == child)
            .ok_or_else(|| ModelError::InvalidReference(child.to_string()))?;
        self.edges.remove(index);
        self.dirty = true;
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's properties and position. Handing out the
    /// handle conservatively marks the tree dirty, whether or not the
    /// caller ends up writing through it.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        // Structural fields are only touched by Tree methods.
        let node = self.nodes.get_mut(id);
        if node.is_some() {
            self.dirty = true;
        }
        node
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Child ids of a node, ascending by edge order index.
    pub fn children_of(&self, id: &str) -> Vec<NodeId> {
        let mut edges: Vec<&Edge> = self.edges.iter().filter(|e| e.parent == id).collect();
        edges.sort_by_key(|e| e.order_index);
        edges.into_iter().map(|e| e.child.clone()).collect()
    }

    /// Parent ids of a node, ascending.
    pub fn parents_of(&self, id: &str) -> Vec<NodeId> {
        let mut parents: Vec<NodeId> = self
            .edges
            .iter()
            .filter(|e| e.child == id)
            .map(|e| e.parent.clone())
            .collect();
        parents.sort();
        parents
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.parent == id).count()
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.child == id).count()
    }

    /// Nodes with in-degree 0, ascending by id.
    pub fn roots(&self) -> Vec<NodeId> {
        let children: BTreeSet<&NodeId> = self.edges.iter().map(|e| &e.child).collect();
        self.nodes
            .keys()
            .filter(|id| !children.contains(id))
            .cloned()
            .collect()
    }

    /// All node ids reachable from `id`, including `id` itself. Safe on
    /// cyclic graphs.
    pub fn subtree_ids(&self, id: &str) -> Vec<NodeId> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(&current) || !seen.insert(current.clone()) {
                continue;
            }
            for child in self.children_of(&current) {
                stack.push(child);
            }
        }
        seen.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, e.g. after a save.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn from_parts(
        name: String,
        category: TreeCategory,
        nodes: BTreeMap<NodeId, Node>,
        edges: Vec<Edge>,
    ) -> Tree {
        Tree {
            name,
            category,
            nodes,
            edges,
            dirty: false,
        }
    }
}
