use bt_model::{
    ChildArity, Collection, Node, NodeCategory, Registry, Tree, TreeCategory, TypeRow,
    REFERENCE_PROPERTY,
};
use bt_verify::{FindingKind, Severity, Verifier, VerifyOptions};
use serde_json::Value;

fn registry() -> Registry {
    let rows = [
        ("Strategy", NodeCategory::Strategy, ChildArity::Many),
        ("Sequence", NodeCategory::Sequence, ChildArity::Many),
        ("Kick", NodeCategory::Leaf, ChildArity::None),
        ("Keeper", NodeCategory::Keeper, ChildArity::None),
        ("Tactic", NodeCategory::Tactic, ChildArity::None),
        ("Role", NodeCategory::Role, ChildArity::None),
    ]
    .into_iter()
    .map(|(name, category, arity)| TypeRow {
        name: name.to_string(),
        category,
        arity,
        properties: vec![],
    });
    Registry::load(rows).expect("registry")
}

fn reference_node(id: &str, type_name: &str, target: &str) -> Node {
    let mut node = Node::new(id, type_name);
    node.set_property(REFERENCE_PROPERTY, Value::String(target.to_string()));
    node
}

/// A strategy whose direct child is a Role node breaks the layering.
#[test]
fn strategy_with_role_child_is_a_structure_violation() {
    let registry = registry();
    let mut tree = Tree::new("offence", TreeCategory::Strategy);
    tree.insert_node(Node::new("root", "Strategy")).unwrap();
    tree.insert_node(reference_node("wrong", "Role", "attacker")).unwrap();
    tree.connect("root", "wrong", 0).unwrap();

    let mut collection = Collection::new();
    collection
        .insert(Tree::new("attacker", TreeCategory::Role))
        .unwrap();

    let report = Verifier::new(&registry).verify(&tree, &collection);
    let structure: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::StructureViolation)
        .collect();
    assert_eq!(structure.len(), 1);
    assert_eq!(structure[0].node_ids, vec!["wrong".to_string()]);
}

#[test]
fn strategy_with_tactic_children_is_well_layered() {
    let registry = registry();
    let mut tree = Tree::new("offence", TreeCategory::Strategy);
    tree.insert_node(Node::new("root", "Strategy")).unwrap();
    tree.insert_node(reference_node("t1", "Tactic", "press")).unwrap();
    tree.connect("root", "t1", 0).unwrap();

    let mut collection = Collection::new();
    collection
        .insert(Tree::new("press", TreeCategory::Tactic))
        .unwrap();

    let report = Verifier::new(&registry).verify(&tree, &collection);
    assert!(report.passed, "findings: {:?}", report.findings);
}

#[test]
fn role_tree_accepts_keeper_and_leaf_children() {
    let registry = registry();
    let mut tree = Tree::new("defence", TreeCategory::Role);
    tree.insert_node(Node::new("root", "Sequence")).unwrap();
    tree.insert_node(Node::new("k", "Keeper")).unwrap();
    tree.insert_node(Node::new("l", "Kick")).unwrap();
    tree.connect("root", "k", 0).unwrap();
    tree.connect("root", "l", 1).unwrap();

    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    assert!(report.passed, "findings: {:?}", report.findings);
}

#[test]
fn unregistered_type_is_a_structure_violation() {
    let registry = registry();
    let mut tree = Tree::new("defence", TreeCategory::Keeper);
    tree.insert_node(Node::new("root", "Teleport")).unwrap();

    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    let structure: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::StructureViolation)
        .collect();
    assert_eq!(structure.len(), 1);
    assert!(structure[0].message.contains("Teleport"));
}

#[test]
fn dangling_tactic_reference_is_reported_once() {
    let registry = registry();
    let mut tree = Tree::new("press", TreeCategory::Tactic);
    tree.insert_node(Node::new("root", "Sequence")).unwrap();
    tree.insert_node(reference_node("r1", "Role", "ghost_role")).unwrap();
    tree.connect("root", "r1", 0).unwrap();

    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    let dangling: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::DanglingReference)
        .collect();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].node_ids, vec!["r1".to_string()]);
    assert!(dangling[0].message.contains("ghost_role"));
}

#[test]
fn resolved_reference_is_clean() {
    let registry = registry();
    let mut tree = Tree::new("press", TreeCategory::Tactic);
    tree.insert_node(Node::new("root", "Sequence")).unwrap();
    tree.insert_node(reference_node("r1", "Role", "attacker")).unwrap();
    tree.connect("root", "r1", 0).unwrap();

    let mut collection = Collection::new();
    collection
        .insert(Tree::new("attacker", TreeCategory::Role))
        .unwrap();

    let report = Verifier::new(&registry).verify(&tree, &collection);
    assert!(report.passed, "findings: {:?}", report.findings);
}

#[test]
fn reference_leaf_without_name_property_is_dangling() {
    let registry = registry();
    let mut tree = Tree::new("press", TreeCategory::Tactic);
    tree.insert_node(Node::new("root", "Sequence")).unwrap();
    tree.insert_node(Node::new("r1", "Role")).unwrap();
    tree.connect("root", "r1", 0).unwrap();

    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    assert!(report
        .errors()
        .any(|f| f.kind == FindingKind::DanglingReference && f.node_ids == vec!["r1".to_string()]));
}

#[test]
fn downgraded_severities_turn_failures_into_warnings() {
    let registry = registry();
    let mut tree = Tree::new("offence", TreeCategory::Strategy);
    tree.insert_node(Node::new("root", "Strategy")).unwrap();
    tree.insert_node(reference_node("wrong", "Role", "ghost")).unwrap();
    tree.connect("root", "wrong", 0).unwrap();

    let options = VerifyOptions {
        structure_severity: Severity::Warning,
        reference_severity: Severity::Warning,
        ..VerifyOptions::default()
    };
    let report = Verifier::with_options(&registry, options).verify(&tree, &Collection::new());
    assert!(report.passed, "findings: {:?}", report.findings);
    assert!(report.warnings().count() >= 2);
}
