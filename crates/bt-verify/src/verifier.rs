//! Verifier - runs every check over a tree snapshot and assembles the
//! report.
//!
//! Verification is a pure read over the tree and collection handed in:
//! callers must not mutate them for the duration of one call. The verifier
//! holds only a registry reference and its options, never check state.

use bt_model::{Collection, Registry, Tree, TreeCategory};

use crate::checks;
use crate::report::{Finding, FindingKind, Severity, VerificationReport};
use crate::roles;

/// Severity configuration. Defaults: everything is an Error except
/// unconnected nodes, which only warn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    pub structure_severity: Severity,
    pub reference_severity: Severity,
    pub unconnected_severity: Severity,
}

impl Default for VerifyOptions {
    fn default() -> VerifyOptions {
        VerifyOptions {
            structure_severity: Severity::Error,
            reference_severity: Severity::Error,
            unconnected_severity: Severity::Warning,
        }
    }
}

/// The verification engine.
pub struct Verifier<'a> {
    registry: &'a Registry,
    options: VerifyOptions,
}

impl<'a> Verifier<'a> {
    pub fn new(registry: &'a Registry) -> Verifier<'a> {
        Verifier {
            registry,
            options: VerifyOptions::default(),
        }
    }

    pub fn with_options(registry: &'a Registry, options: VerifyOptions) -> Verifier<'a> {
        Verifier { registry, options }
    }

    /// Runs every check, in fixed order, with no short-circuiting, and
    /// returns the assembled report. Total: always produces a report, even
    /// for an empty tree.
    pub fn verify(&self, tree: &Tree, collection: &Collection) -> VerificationReport {
        let mut findings = Vec::new();
        findings.extend(checks::check_cycles(tree));
        findings.extend(checks::check_roots(tree));
        findings.extend(checks::check_connectivity(
            tree,
            self.options.unconnected_severity,
        ));
        findings.extend(checks::check_arity(tree, self.registry));
        findings.extend(checks::check_structure(
            tree,
            self.registry,
            self.options.structure_severity,
        ));
        findings.extend(checks::check_references(
            tree,
            self.registry,
            collection,
            self.options.reference_severity,
        ));
        findings.extend(self.check_roles(tree));

        let report = VerificationReport::from_findings(findings);
        tracing::debug!(
            tree = %tree.name,
            passed = report.passed,
            findings = report.findings.len(),
            "verification finished"
        );
        report
    }

    /// Bulk verification of every tree in the collection, in category then
    /// name order.
    pub fn verify_all(
        &self,
        collection: &Collection,
    ) -> Vec<(TreeCategory, String, VerificationReport)> {
        collection
            .all_trees()
            .map(|tree| (tree.category, tree.name.clone(), self.verify(tree, collection)))
            .collect()
    }

    /// Read-only role inheritance, folded into the report.
    fn check_roles(&self, tree: &Tree) -> Vec<Finding> {
        if tree.is_empty() {
            return vec![];
        }
        match roles::compute(tree) {
            None => vec![Finding::new(
                FindingKind::RoleInconsistency,
                Severity::Warning,
                format!(
                    "role inheritance check skipped for tree {}: no unique root",
                    tree.name
                ),
                vec![],
            )],
            Some(outcome) => outcome
                .mismatches
                .into_iter()
                .map(|mismatch| {
                    Finding::new(
                        FindingKind::RoleInconsistency,
                        Severity::Error,
                        format!(
                            "node {} in tree {} is missing the inherited ROLE {}",
                            mismatch.node, tree.name, mismatch.expected
                        ),
                        vec![mismatch.node],
                    )
                })
                .collect(),
        }
    }
}
