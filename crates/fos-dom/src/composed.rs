//! Composed Tree Traversal
//!
//! The composed (flat) tree replaces a shadow host's children with its
//! shadow tree and each `<slot>` with the light-DOM nodes assigned to it.
//! Style resolution walks this tree in pre-order.

use crate::{DomTree, NodeData, NodeId};

impl DomTree {
    /// Children of `node` in the composed tree
    pub fn composed_children(&self, node: NodeId) -> Vec<NodeId> {
        if let Some(shadow) = self.shadow_root(node) {
            return self.children(shadow).map(|(id, _)| id).collect();
        }
        if self.element(node).is_some_and(|e| e.is_slot()) && self.containing_shadow_root(node).is_some() {
            let assigned = self.assigned_nodes(node);
            if !assigned.is_empty() {
                return assigned;
            }
        }
        self.children(node).map(|(id, _)| id).collect()
    }

    /// Parent of `node` in the composed tree
    pub fn composed_parent(&self, node: NodeId) -> NodeId {
        let parent = self.parent(node);
        if !parent.is_valid() {
            return NodeId::NONE;
        }
        if self.shadow_root(parent).is_some() {
            // Light children of a host only render through a slot.
            return self.assigned_slot(node).unwrap_or(NodeId::NONE);
        }
        match self.get(parent).map(|n| &n.data) {
            Some(NodeData::ShadowRoot { host }) => *host,
            _ => parent,
        }
    }

    /// Nearest composed-tree ancestor that is an element
    pub fn composed_parent_element(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.composed_parent(node);
        while current.is_valid() {
            if self.is_element(current) {
                return Some(current);
            }
            current = self.composed_parent(current);
        }
        None
    }

    /// Pre-order traversal of the composed tree below `root`
    pub fn composed_tree_descendants(&self, root: NodeId) -> ComposedTreeIterator<'_> {
        ComposedTreeIterator::new(self, root)
    }
}

/// Pre-order composed tree iterator yielding `(node, depth)`.
///
/// Depth is relative to the iteration root, whose children have depth 1.
/// Call `skip_children` right after receiving a node to prune its subtree.
pub struct ComposedTreeIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<(NodeId, usize)>,
    last: Option<(NodeId, usize)>,
}

impl<'a> ComposedTreeIterator<'a> {
    pub fn new(tree: &'a DomTree, root: NodeId) -> Self {
        let mut iter = Self { tree, stack: Vec::new(), last: None };
        iter.push_children(root, 1);
        iter
    }

    fn push_children(&mut self, node: NodeId, depth: usize) {
        let children = self.tree.composed_children(node);
        self.stack.extend(children.into_iter().rev().map(|c| (c, depth)));
    }

    /// Do not descend into the node most recently returned
    pub fn skip_children(&mut self) {
        self.last = None;
    }
}

impl Iterator for ComposedTreeIterator<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((node, depth)) = self.last.take() {
            self.push_children(node, depth + 1);
        }
        let next = self.stack.pop()?;
        self.last = Some(next);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> (DomTree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let host = tree.create_element("div");
        tree.append_child(tree.root(), host).unwrap();
        let light = tree.create_element("span");
        tree.append_child(host, light).unwrap();
        let shadow = tree.attach_shadow(host).unwrap();
        let wrapper = tree.create_element("section");
        let slot = tree.create_element("slot");
        tree.append_child(shadow, wrapper).unwrap();
        tree.append_child(wrapper, slot).unwrap();
        (tree, host, light, wrapper, slot)
    }

    #[test]
    fn test_composed_order() {
        let (tree, host, light, wrapper, slot) = build();
        let order: Vec<_> = tree.composed_tree_descendants(tree.root()).collect();
        assert_eq!(order, vec![(host, 1), (wrapper, 2), (slot, 3), (light, 4)]);
    }

    #[test]
    fn test_composed_parent() {
        let (tree, host, light, wrapper, slot) = build();
        assert_eq!(tree.composed_parent(wrapper), host);
        assert_eq!(tree.composed_parent(light), slot);
        assert_eq!(tree.composed_parent_element(light), Some(slot));
    }

    #[test]
    fn test_skip_children() {
        let (tree, host, _, _, _) = build();
        let mut iter = tree.composed_tree_descendants(tree.root());
        assert_eq!(iter.next(), Some((host, 1)));
        iter.skip_children();
        assert_eq!(iter.next(), None);
    }
}
