use bt_model::{
    ChildArity, Collection, Node, NodeCategory, Registry, Tree, TreeCategory, TypeRow,
};
use bt_verify::{FindingKind, Severity, Verifier};

fn registry() -> Registry {
    let rows = [
        ("Strategy", NodeCategory::Strategy, ChildArity::Many),
        ("Sequence", NodeCategory::Sequence, ChildArity::Many),
        ("Selector", NodeCategory::Selector, ChildArity::Many),
        ("Inverter", NodeCategory::Decorator, ChildArity::One),
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

fn kinds(report: &bt_verify::VerificationReport) -> Vec<FindingKind> {
    report.findings.iter().map(|f| f.kind).collect()
}

#[test]
fn single_node_tree_passes() {
    let registry = registry();
    let mut tree = Tree::new("solo", TreeCategory::Role);
    tree.insert_node(Node::new("n1", "Kick")).unwrap();

    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    assert!(report.passed);
    assert!(report.findings.is_empty());
}

#[test]
fn empty_tree_reports_missing_root_and_nothing_else() {
    let registry = registry();
    let tree = Tree::new("void", TreeCategory::Role);

    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    assert!(!report.passed);
    assert_eq!(kinds(&report), vec![FindingKind::MissingRoot]);
}

#[test]
fn self_loop_is_a_single_node_cycle() {
    let registry = registry();
    let mut tree = Tree::new("loop", TreeCategory::Role);
    tree.insert_node(Node::new("a", "Selector")).unwrap();
    tree.connect("a", "a", 0).unwrap();

    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    let cycles: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::Cycle)
        .collect();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].node_ids, vec!["a".to_string()]);
    assert_eq!(cycles[0].severity, Severity::Error);
}

#[test]
fn multi_node_cycle_lists_the_cycle_node_set() {
    let registry = registry();
    let mut tree = Tree::new("ring", TreeCategory::Role);
    for id in ["a", "b", "c"] {
        tree.insert_node(Node::new(id, "Selector")).unwrap();
    }
    tree.connect("a", "b", 0).unwrap();
    tree.connect("b", "c", 0).unwrap();
    tree.connect("c", "a", 0).unwrap();

    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    let cycles: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::Cycle)
        .collect();
    assert_eq!(cycles.len(), 1);
    assert_eq!(
        cycles[0].node_ids,
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
}

#[test]
fn two_isolated_nodes_do_not_pass() {
    let registry = registry();
    let mut tree = Tree::new("split", TreeCategory::Role);
    tree.insert_node(Node::new("a", "Kick")).unwrap();
    tree.insert_node(Node::new("b", "Kick")).unwrap();

    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    assert!(!report.passed);

    let kinds = kinds(&report);
    assert!(kinds.contains(&FindingKind::MultipleRoots));
    assert!(kinds.contains(&FindingKind::UnconnectedNode));

    // The unreachable node is reported by the degraded walk, as a warning.
    let unconnected: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::UnconnectedNode)
        .collect();
    assert_eq!(unconnected.len(), 1);
    assert_eq!(unconnected[0].node_ids, vec!["b".to_string()]);
    assert_eq!(unconnected[0].severity, Severity::Warning);
}

#[test]
fn unconnected_node_alone_is_only_a_warning_against_roots_errors() {
    let registry = registry();
    let mut tree = Tree::new("floating", TreeCategory::Role);
    tree.insert_node(Node::new("root", "Sequence")).unwrap();
    tree.insert_node(Node::new("leaf", "Kick")).unwrap();
    tree.insert_node(Node::new("stray", "Kick")).unwrap();
    tree.connect("root", "leaf", 0).unwrap();

    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    // Two roots exist, so the report fails on MultipleRoots; the stray
    // node itself is only warned about.
    assert!(!report.passed);
    assert!(report
        .warnings()
        .any(|f| f.kind == FindingKind::UnconnectedNode));
}

#[test]
fn arity_violations_name_node_and_counts() {
    let registry = registry();
    let mut tree = Tree::new("attack", TreeCategory::Role);
    tree.insert_node(Node::new("root", "Sequence")).unwrap();
    tree.insert_node(Node::new("inv", "Inverter")).unwrap();
    tree.insert_node(Node::new("kick", "Kick")).unwrap();
    tree.insert_node(Node::new("extra", "Kick")).unwrap();
    tree.connect("root", "inv", 0).unwrap();
    tree.connect("root", "kick", 1).unwrap();
    tree.connect("kick", "extra", 0).unwrap();

    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    let arity: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::ArityViolation)
        .collect();
    // The decorator has zero children, the leaf has one.
    assert_eq!(arity.len(), 2);
    assert_eq!(arity[0].node_ids, vec!["inv".to_string()]);
    assert!(arity[0].message.contains("exactly one child"));
    assert_eq!(arity[1].node_ids, vec!["kick".to_string()]);
    assert!(arity[1].message.contains("no children"));
}

#[test]
fn duplicate_edge_to_a_decorator_child_is_an_arity_violation() {
    let registry = registry();
    let mut tree = Tree::new("attack", TreeCategory::Role);
    tree.insert_node(Node::new("root", "Inverter")).unwrap();
    tree.insert_node(Node::new("kick", "Kick")).unwrap();
    tree.connect("root", "kick", 0).unwrap();
    tree.connect("root", "kick", 1).unwrap();

    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    assert!(!report.passed);
    let arity: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::ArityViolation)
        .collect();
    assert_eq!(arity.len(), 1);
    assert_eq!(arity[0].node_ids, vec!["root".to_string()]);
    assert!(arity[0].message.contains("exactly one child"));
    assert!(arity[0].message.contains("found 2"));
}

#[test]
fn duplicate_edge_under_a_composite_is_not_reported() {
    let registry = registry();
    let mut tree = Tree::new("attack", TreeCategory::Role);
    tree.insert_node(Node::new("root", "Sequence")).unwrap();
    tree.insert_node(Node::new("kick", "Kick")).unwrap();
    tree.connect("root", "kick", 0).unwrap();
    tree.connect("root", "kick", 1).unwrap();

    // A composite accepts any out-degree >= 1, so the duplicate is legal.
    let report = Verifier::new(&registry).verify(&tree, &Collection::new());
    assert!(report.passed, "findings: {:?}", report.findings);
    assert!(report.findings.is_empty());
}

#[test]
fn reports_are_deterministic() {
    let registry = registry();
    let mut tree = Tree::new("messy", TreeCategory::Role);
    for id in ["a", "b", "c", "d"] {
        tree.insert_node(Node::new(id, "Selector")).unwrap();
    }
    tree.connect("a", "b", 0).unwrap();
    tree.connect("b", "a", 0).unwrap();
    tree.connect("c", "d", 0).unwrap();

    let verifier = Verifier::new(&registry);
    let first = verifier.verify(&tree, &Collection::new());
    let second = verifier.verify(&tree, &Collection::new());
    assert_eq!(first, second);
}
