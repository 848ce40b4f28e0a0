//! DOM Node Operations
//!
//! Error type shared by tree mutation APIs.

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node {0} not found")]
    NotFound(NodeId),
    /// Operation requires an element
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    /// Operation requires a text node
    #[error("node {0} is not a text node")]
    NotText(NodeId),
    /// Hierarchy error (e.g., inserting an ancestor)
    #[error("hierarchy request error for node {0}")]
    HierarchyRequest(NodeId),
    /// Node is not attached to a parent
    #[error("node {0} is not a child")]
    NotAChild(NodeId),
}
