//! Behaviour tree verification engine.
//!
//! Pure, deterministic checks over `bt-model` trees: cycle detection, root
//! uniqueness, connectivity, arity, category layering, cross-tree
//! reference integrity and role inheritance. Every run returns a complete
//! `VerificationReport`; nothing here mutates, blocks or terminates.

mod checks;
pub mod report;
pub mod roles;
pub mod verifier;

pub use report::{Finding, FindingKind, Severity, VerificationReport};
pub use roles::{propagate_roles, PropagationMode, PropagationResult, RoleMismatch};
pub use verifier::{Verifier, VerifyOptions};
