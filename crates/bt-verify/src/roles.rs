//! Role propagation - inheritance of the `ROLE` property from ancestors.
//!
//! A node's effective role is the nearest explicit `ROLE` value on the path
//! from the root to the node itself; an explicit value overrides whatever
//! is inherited and becomes the carried value for the node's own subtree.
//! A node with no explicit value under an inherited one is a mismatch. The
//! propagator is stateless per run and never caches prior results.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bt_model::{NodeId, Tree, ROLE_PROPERTY};

/// Read-only compares computed roles against stored properties; auto-update
/// writes the computed values back. Auto-update is unsafe while a stale
/// view of the tree is still displayed, so callers pick the mode
/// explicitly and read-only is the recommended default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationMode {
    ReadOnly,
    AutoUpdate,
}

/// A node whose stored properties disagree with its computed effective
/// role: an inherited value is in force but the node carries no explicit
/// `ROLE` string of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMismatch {
    pub node: NodeId,
    /// The role the node should inherit.
    pub expected: String,
}

/// Result of one propagation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationResult {
    /// Effective role per node; nodes with no role anywhere are absent.
    pub effective: BTreeMap<NodeId, String>,
    pub mismatches: Vec<RoleMismatch>,
    /// Node ids rewritten in auto-update mode, ascending. Empty when
    /// read-only.
    pub changed: Vec<NodeId>,
}

pub(crate) struct RolesOutcome {
    pub effective: BTreeMap<NodeId, String>,
    pub mismatches: Vec<RoleMismatch>,
}

/// Single top-down traversal carrying the inherited role. Requires a
/// unique root; returns None otherwise. Safe on cyclic graphs.
pub(crate) fn compute(tree: &Tree) -> Option<RolesOutcome> {
    let roots = tree.roots();
    if roots.len() != 1 {
        return None;
    }

    let mut effective = BTreeMap::new();
    let mut mismatches = Vec::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<(NodeId, Option<String>)> = vec![(roots[0].clone(), None)];

    while let Some((id, inherited)) = stack.pop() {
        if !visited.insert(id.clone()) {
            continue;
        }
        let Some(node) = tree.node(&id) else {
            continue;
        };
        let explicit = node.role().map(str::to_string);
        if explicit.is_none() {
            if let Some(expected) = &inherited {
                mismatches.push(RoleMismatch {
                    node: id.clone(),
                    expected: expected.clone(),
                });
            }
        }
        // An explicit value overrides the inherited one for this subtree.
        let carried = explicit.or(inherited);
        if let Some(role) = &carried {
            effective.insert(id.clone(), role.clone());
        }
        for child in tree.children_of(&id) {
            stack.push((child, carried.clone()));
        }
    }

    mismatches.sort_by(|a, b| a.node.cmp(&b.node));
    Some(RolesOutcome {
        effective,
        mismatches,
    })
}

/// Computes effective roles for a tree. Returns None when no unique root
/// exists. In auto-update mode the computed values are written back into
/// the nodes' properties and the changed ids are returned.
pub fn propagate_roles(tree: &mut Tree, mode: PropagationMode) -> Option<PropagationResult> {
    let outcome = compute(tree)?;
    let mut changed = Vec::new();

    if mode == PropagationMode::AutoUpdate {
        for (id, role) in &outcome.effective {
            let stored = tree.node(id).and_then(|n| n.role().map(str::to_string));
            if stored.as_deref() != Some(role.as_str()) {
                if let Some(node) = tree.node_mut(id) {
                    node.set_property(ROLE_PROPERTY, Value::String(role.clone()));
                    changed.push(id.clone());
                }
            }
        }
        if !changed.is_empty() {
            tracing::debug!(tree = %tree.name, changed = changed.len(), "roles written back");
        }
    }

    Some(PropagationResult {
        effective: outcome.effective,
        mismatches: outcome.mismatches,
        changed,
    })
}
