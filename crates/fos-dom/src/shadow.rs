//! Shadow DOM
//!
//! Shadow roots and named slot assignment.

use crate::{DomTree, NodeData, NodeId};

impl DomTree {
    /// Shadow root containing `node`, if it lives in a shadow tree
    pub fn containing_shadow_root(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.parent(node);
        while current.is_valid() {
            if let Some(NodeData::ShadowRoot { .. }) = self.get(current).map(|n| &n.data) {
                return Some(current);
            }
            current = self.parent(current);
        }
        None
    }

    /// Host element of a shadow root
    pub fn shadow_host(&self, shadow_root: NodeId) -> Option<NodeId> {
        match self.get(shadow_root).map(|n| &n.data) {
            Some(NodeData::ShadowRoot { host }) => Some(*host),
            _ => None,
        }
    }

    /// Light-DOM children of the host assigned to `slot`.
    ///
    /// Named slots take children whose `slot` attribute matches; the default
    /// slot takes every element without a `slot` attribute plus text.
    pub fn assigned_nodes(&self, slot: NodeId) -> Vec<NodeId> {
        let Some(slot_elem) = self.element(slot).filter(|e| e.is_slot()) else {
            return Vec::new();
        };
        let Some(host) = self.containing_shadow_root(slot).and_then(|root| self.shadow_host(root)) else {
            return Vec::new();
        };
        let slot_name = slot_elem.get_attr("name").unwrap_or("");

        // Only the first slot with a given name in tree order receives nodes.
        if self.first_slot_named(host, slot_name) != Some(slot) {
            return Vec::new();
        }

        self.children(host)
            .filter(|(_, node)| match &node.data {
                NodeData::Element(e) => e.slot.as_deref().unwrap_or("") == slot_name,
                NodeData::Text(_) => slot_name.is_empty(),
                _ => false,
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Slot in `host`'s shadow tree that `node` is assigned to
    pub fn assigned_slot(&self, node: NodeId) -> Option<NodeId> {
        let host = self.parent(node);
        self.shadow_root(host)?;
        let name = match self.get(node).map(|n| &n.data) {
            Some(NodeData::Element(e)) => e.slot.as_deref().unwrap_or(""),
            Some(NodeData::Text(_)) => "",
            _ => return None,
        };
        self.first_slot_named(host, name)
    }

    fn first_slot_named(&self, host: NodeId, name: &str) -> Option<NodeId> {
        let shadow = self.shadow_root(host)?;
        let mut stack: Vec<NodeId> = self.children(shadow).map(|(id, _)| id).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            if let Some(elem) = self.element(id) {
                if elem.is_slot() && elem.get_attr("name").unwrap_or("") == name {
                    return Some(id);
                }
            }
            let mut kids: Vec<NodeId> = self.children(id).map(|(child, _)| child).collect();
            kids.reverse();
            stack.extend(kids);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_slot_assignment() {
        let mut tree = DomTree::new();
        let host = tree.create_element("div");
        tree.append_child(tree.root(), host).unwrap();
        let header = tree.create_element("h1");
        tree.set_attribute(header, "slot", "header").unwrap();
        let body = tree.create_element("p");
        tree.append_child(host, header).unwrap();
        tree.append_child(host, body).unwrap();

        let shadow = tree.attach_shadow(host).unwrap();
        let named = tree.create_element("slot");
        tree.set_attribute(named, "name", "header").unwrap();
        let default = tree.create_element("slot");
        tree.append_child(shadow, named).unwrap();
        tree.append_child(shadow, default).unwrap();

        assert_eq!(tree.assigned_nodes(named), vec![header]);
        assert_eq!(tree.assigned_nodes(default), vec![body]);
        assert_eq!(tree.assigned_slot(header), Some(named));
        assert_eq!(tree.assigned_slot(body), Some(default));
        assert_eq!(tree.containing_shadow_root(named), Some(shadow));
    }
}
