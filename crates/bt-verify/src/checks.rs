//! Structural checks. Each check is independent, pure, and returns its
//! findings sorted by ascending node id; the verifier runs all of them on
//! every call so one run surfaces every problem at once.

use std::collections::{HashMap, HashSet};

use bt_model::{ChildArity, Collection, NodeCategory, NodeId, Registry, Tree, TreeCategory};

use crate::report::{Finding, FindingKind, Severity};

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

/// Depth-first cycle detection with an explicit stack. A back-edge to a
/// node still on the traversal path yields one `Cycle` finding listing the
/// cycle's node set.
pub(crate) fn check_cycles(tree: &Tree) -> Vec<Finding> {
    struct Frame {
        id: NodeId,
        children: Vec<NodeId>,
        next: usize,
    }

    let mut findings = Vec::new();
    let mut marks: HashMap<NodeId, Mark> = HashMap::new();

    for start in tree.node_ids() {
        if marks.contains_key(start) {
            continue;
        }
        marks.insert(start.clone(), Mark::InProgress);
        let mut path: Vec<NodeId> = vec![start.clone()];
        let mut stack = vec![Frame {
            id: start.clone(),
            children: tree.children_of(start),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.children.len() {
                let child = frame.children[frame.next].clone();
                frame.next += 1;
                match marks.get(&child) {
                    None => {
                        marks.insert(child.clone(), Mark::InProgress);
                        path.push(child.clone());
                        let children = tree.children_of(&child);
                        stack.push(Frame {
                            id: child,
                            children,
                            next: 0,
                        });
                    }
                    Some(Mark::InProgress) => {
                        // Back-edge: the cycle is the path suffix starting
                        // at the revisited node.
                        let pos = path
                            .iter()
                            .position(|id| *id == child)
                            .unwrap_or(path.len() - 1);
                        let mut ids: Vec<NodeId> = path[pos..].to_vec();
                        ids.sort();
                        ids.dedup();
                        findings.push(Finding::new(
                            FindingKind::Cycle,
                            Severity::Error,
                            format!(
                                "cycle detected in tree {} involving nodes {}",
                                tree.name,
                                ids.join(", ")
                            ),
                            ids,
                        ));
                    }
                    Some(Mark::Done) => {}
                }
            } else {
                marks.insert(frame.id.clone(), Mark::Done);
                stack.pop();
                path.pop();
            }
        }
    }

    findings.sort_by(|a, b| a.node_ids.cmp(&b.node_ids));
    findings
}

/// A valid tree has exactly one node with in-degree 0.
pub(crate) fn check_roots(tree: &Tree) -> Vec<Finding> {
    if tree.is_empty() {
        return vec![Finding::new(
            FindingKind::MissingRoot,
            Severity::Error,
            format!("tree {} has no nodes and therefore no root", tree.name),
            vec![],
        )];
    }
    let roots = tree.roots();
    match roots.len() {
        0 => vec![Finding::new(
            FindingKind::MissingRoot,
            Severity::Error,
            format!(
                "tree {} has no root: every node has an incoming edge",
                tree.name
            ),
            vec![],
        )],
        1 => vec![],
        _ => vec![Finding::new(
            FindingKind::MultipleRoots,
            Severity::Error,
            format!(
                "tree {} has {} roots: {}",
                tree.name,
                roots.len(),
                roots.join(", ")
            ),
            roots,
        )],
    }
}

/// Reports every node unreachable from the root. Without a unique root the
/// walk starts from the node with the fewest incoming edges on a
/// best-effort basis and the findings say so.
pub(crate) fn check_connectivity(tree: &Tree, severity: Severity) -> Vec<Finding> {
    if tree.is_empty() {
        return vec![];
    }
    let roots = tree.roots();
    let (start, degraded) = if roots.len() == 1 {
        (roots[0].clone(), false)
    } else {
        let start = tree
            .node_ids()
            .min_by_key(|id| tree.in_degree(id))
            .expect("tree is non-empty")
            .clone();
        (start, true)
    };

    let mut reachable: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if !reachable.insert(id.clone()) {
            continue;
        }
        stack.extend(tree.children_of(&id));
    }

    tree.node_ids()
        .filter(|id| !reachable.contains(*id))
        .map(|id| {
            let message = if degraded {
                format!(
                    "node {} is not reachable in tree {} (degraded check: no unique root)",
                    id, tree.name
                )
            } else {
                format!("node {} is not reachable from the root of tree {}", id, tree.name)
            };
            Finding::new(FindingKind::UnconnectedNode, severity, message, vec![id.clone()])
        })
        .collect()
}

/// Outgoing edge count must match the node type's child arity class.
pub(crate) fn check_arity(tree: &Tree, registry: &Registry) -> Vec<Finding> {
    let mut findings = Vec::new();
    for node in tree.nodes() {
        // Unknown types are the structure check's business.
        let Some(node_type) = registry.get(&node.type_name) else {
            continue;
        };
        let actual = tree.out_degree(&node.id);
        let expected = match node_type.arity() {
            ChildArity::None if actual != 0 => "no children",
            ChildArity::One if actual != 1 => "exactly one child",
            ChildArity::Many if actual < 1 => "at least one child",
            _ => continue,
        };
        findings.push(Finding::new(
            FindingKind::ArityViolation,
            Severity::Error,
            format!(
                "node {} ({}) in tree {} expects {}, found {}",
                node.id, node.type_name, tree.name, expected, actual
            ),
            vec![node.id.clone()],
        ));
    }
    findings
}

/// Category layering: a Strategy root's direct children must be Tactic
/// nodes, a Tactic root's must be Role nodes, a Role root's must be Keeper
/// or Leaf nodes. Unregistered type names are reported here as well.
pub(crate) fn check_structure(
    tree: &Tree,
    registry: &Registry,
    severity: Severity,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for node in tree.nodes() {
        if registry.get(&node.type_name).is_none() {
            findings.push(Finding::new(
                FindingKind::StructureViolation,
                severity,
                format!(
                    "node {} in tree {} has unregistered type {}",
                    node.id, tree.name, node.type_name
                ),
                vec![node.id.clone()],
            ));
        }
    }

    let allowed: &[NodeCategory] = match tree.category {
        TreeCategory::Strategy => &[NodeCategory::Tactic],
        TreeCategory::Tactic => &[NodeCategory::Role],
        TreeCategory::Role => &[NodeCategory::Keeper, NodeCategory::Leaf],
        // No layering rule of its own.
        TreeCategory::Keeper => &[],
    };
    let roots = tree.roots();
    if !allowed.is_empty() && roots.len() == 1 {
        for child_id in tree.children_of(&roots[0]) {
            let Some(child) = tree.node(&child_id) else {
                continue;
            };
            let Some(child_type) = registry.get(&child.type_name) else {
                continue;
            };
            if !allowed.contains(&child_type.category()) {
                findings.push(Finding::new(
                    FindingKind::StructureViolation,
                    severity,
                    format!(
                        "node {} ({}) below the root of {} tree {} is a {:?} node, which breaks \
                         the Strategy -> Tactic -> Role layering",
                        child_id,
                        child.type_name,
                        tree.category,
                        tree.name,
                        child_type.category()
                    ),
                    vec![child_id.clone()],
                ));
            }
        }
    }

    findings.sort_by(|a, b| a.node_ids.cmp(&b.node_ids));
    findings
}

/// Every Tactic/Role-category leaf must name a tree that exists in the
/// matching collection bucket.
pub(crate) fn check_references(
    tree: &Tree,
    registry: &Registry,
    collection: &Collection,
    severity: Severity,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for node in tree.nodes() {
        let Some(node_type) = registry.get(&node.type_name) else {
            continue;
        };
        let target = match node_type.category() {
            NodeCategory::Tactic => TreeCategory::Tactic,
            NodeCategory::Role => TreeCategory::Role,
            _ => continue,
        };
        if tree.out_degree(&node.id) != 0 {
            continue;
        }
        match node.reference() {
            None => findings.push(Finding::new(
                FindingKind::DanglingReference,
                severity,
                format!(
                    "leaf node {} in tree {} carries no name property referencing a {} tree",
                    node.id, tree.name, target
                ),
                vec![node.id.clone()],
            )),
            Some(name) if collection.resolve(target, name).is_none() => {
                findings.push(Finding::new(
                    FindingKind::DanglingReference,
                    severity,
                    format!(
                        "node {} in tree {} references {} tree {} which does not exist",
                        node.id, tree.name, target, name
                    ),
                    vec![node.id.clone()],
                ));
            }
            Some(_) => {}
        }
    }
    findings
}
