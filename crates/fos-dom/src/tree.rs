//! DOM Tree (arena-based allocation)

use crate::{DomError, DomResult, Node, NodeData, NodeId, ElementData};

/// Arena-based DOM tree for memory efficiency
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()] }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Element data for `id`, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data for `id`
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Whether `id` refers to an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        self.push(Node::element(local_name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content.to_string()))
    }

    /// Attach a shadow root to an element and return it
    pub fn attach_shadow(&mut self, host: NodeId) -> DomResult<NodeId> {
        let existing = self.element(host).ok_or(DomError::NotAnElement(host))?.shadow_root;
        if existing.is_valid() {
            return Err(DomError::HierarchyRequest(host));
        }
        let shadow = self.push(Node::shadow_root(host));
        if let Some(elem) = self.element_mut(host) {
            elem.shadow_root = shadow;
        }
        Ok(shadow)
    }

    /// Shadow root of `host`, if any
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.element(host)
            .map(|e| e.shadow_root)
            .filter(|id| id.is_valid())
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if self.get(parent).is_none() {
            return Err(DomError::NotFound(parent));
        }
        if self.get(child).is_none() {
            return Err(DomError::NotFound(child));
        }
        if child == parent || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest(child));
        }
        if self.nodes[child.index()].parent.is_valid() {
            self.remove_child(child)?;
        }

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
        Ok(())
    }

    /// Detach `child` from its parent
    pub fn remove_child(&mut self, child: NodeId) -> DomResult<()> {
        let node = self.get(child).ok_or(DomError::NotFound(child))?;
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return Err(DomError::NotAChild(child));
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[child.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// DOM parent (shadow roots report NONE)
    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map_or(NodeId::NONE, |n| n.parent)
    }

    /// Nearest ancestor element, crossing shadow boundaries to the host
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent(id);
        while current.is_valid() {
            match self.get(current).map(|n| &n.data) {
                Some(NodeData::Element(_)) => return Some(current),
                Some(NodeData::ShadowRoot { host }) => return Some(*host),
                _ => current = self.parent(current),
            }
        }
        None
    }

    /// Iterate over children of a node
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        let first = self.get(parent).map_or(NodeId::NONE, |n| n.first_child);
        ChildIter { tree: self, current: first }
    }

    /// Iterate over element children of a node
    pub fn element_children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent)
            .filter(|(_, node)| node.is_element())
            .map(|(id, _)| id)
    }

    /// True when `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = match self.get(current).map(|n| &n.data) {
                Some(NodeData::ShadowRoot { host }) => *host,
                Some(_) => self.parent(current),
                None => NodeId::NONE,
            };
        }
        false
    }

    /// True when `node` is a strict descendant of `ancestor` (shadow-inclusive)
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        node != ancestor && self.is_inclusive_ancestor(ancestor, node)
    }

    /// Previous element sibling
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id)?.prev_sibling;
        while current.is_valid() {
            let node = self.get(current)?;
            if node.is_element() {
                return Some(current);
            }
            current = node.prev_sibling;
        }
        None
    }

    /// Next element sibling
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id)?.next_sibling;
        while current.is_valid() {
            let node = self.get(current)?;
            if node.is_element() {
                return Some(current);
            }
            current = node.next_sibling;
        }
        None
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(id)
            .ok_or(DomError::NotAnElement(id))?
            .set_attr(name, value);
        Ok(())
    }

    /// Replace the content of a text node
    pub fn set_text_content(&mut self, id: NodeId, content: &str) -> DomResult<()> {
        match self.get_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Text(text)) => {
                text.content = content.to_string();
                Ok(())
            }
            Some(_) => Err(DomError::NotText(id)),
            None => Err(DomError::NotFound(id)),
        }
    }

    /// Move an element into or out of the top layer
    pub fn set_in_top_layer(&mut self, id: NodeId, in_top_layer: bool) -> DomResult<()> {
        self.element_mut(id)
            .ok_or(DomError::NotAnElement(id))?
            .in_top_layer = in_top_layer;
        Ok(())
    }
}

/// Iterator over a node's children
pub struct ChildIter<'a> {
    tree: &'a DomTree,
    current: NodeId,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.current.is_valid() {
            return None;
        }
        let id = self.current;
        let node = self.tree.get(id)?;
        self.current = node.next_sibling;
        Some((id, node))
    }
}
