//! Verification report - the immutable result of one verification run.

use serde::{Deserialize, Serialize};

use bt_model::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    Cycle,
    MissingRoot,
    MultipleRoots,
    UnconnectedNode,
    ArityViolation,
    StructureViolation,
    RoleInconsistency,
    DanglingReference,
}

/// One diagnosed problem, naming the nodes involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    pub node_ids: Vec<NodeId>,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        severity: Severity,
        message: impl Into<String>,
        node_ids: Vec<NodeId>,
    ) -> Finding {
        Finding {
            kind,
            severity,
            message: message.into(),
            node_ids,
        }
    }
}

/// Result of one verification run. Findings appear in fixed check order,
/// ascending by node id within a check, so reports are diffable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub passed: bool,
    pub findings: Vec<Finding>,
}

impl VerificationReport {
    /// `passed` holds iff no finding has Error severity.
    pub fn from_findings(findings: Vec<Finding>) -> VerificationReport {
        let passed = findings.iter().all(|f| f.severity != Severity::Error);
        VerificationReport { passed, findings }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }
}
