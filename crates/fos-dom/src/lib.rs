//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM tree used as the input of style resolution.
//! Nodes are addressed by `NodeId` indices rather than pointers, and the
//! composed tree (shadow roots and slots flattened) is exposed through
//! `ComposedTreeIterator`.

mod node;
mod tree;
mod document;
mod shadow;
mod composed;
mod geometry;
mod operations;

pub use node::{Node, NodeData, ElementData, TextData, Attribute};
pub use tree::{DomTree, ChildIter};
pub use document::Document;
pub use composed::ComposedTreeIterator;
pub use geometry::{Rect, Size, LogicalAxis, PhysicalAxis, BoxSide};
pub use operations::{DomError, DomResult};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The document node is always the first node in the arena
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this ID refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}
