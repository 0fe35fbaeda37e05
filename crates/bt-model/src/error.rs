//! Model errors - all failures in this crate are explicit values.

use thiserror::Error;

use crate::collection::TreeCategory;
use crate::node::NodeId;

/// Errors produced by tree, collection and registry operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("node {0} does not exist in this tree")]
    InvalidReference(NodeId),

    #[error("node id {0} is already in use")]
    DuplicateId(NodeId),

    #[error("tree {name} already exists in category {category}")]
    DuplicateName { category: TreeCategory, name: String },

    #[error("tree {name} does not exist in category {category}")]
    UnknownTree { category: TreeCategory, name: String },

    #[error("malformed tree document: {0}")]
    MalformedDocument(String),

    #[error("node type {0} is not registered")]
    UnknownNodeType(String),

    #[error("malformed node type row: {0}")]
    MalformedRow(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
