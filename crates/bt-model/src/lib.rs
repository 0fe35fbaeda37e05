//! Behaviour tree data model.
//!
//! This crate owns the in-memory representation of behaviour trees used to
//! author robot decision logic: the node type registry, single trees with
//! their structural mutations, the collection of all loaded trees, and the
//! document boundary the file-I/O layer talks to. It performs no rendering,
//! no file-system access and no validation beyond reference integrity -
//! semantic verification lives in `bt-verify`.

pub mod collection;
pub mod document;
pub mod error;
pub mod node;
pub mod registry;
pub mod tree;

pub use collection::{Collection, TreeCategory};
pub use document::TreeDocument;
pub use error::{ModelError, Result};
pub use node::{generate_id, Node, NodeId, Position, REFERENCE_PROPERTY, ROLE_PROPERTY};
pub use registry::{ChildArity, NodeCategory, NodeType, PropertyKind, PropertySpec, Registry, TypeRow};
pub use tree::{Edge, RemovalMode, Tree};
