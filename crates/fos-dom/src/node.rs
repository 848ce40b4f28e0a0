//! DOM Node - Compact representation
//!
//! Nodes link to each other through `NodeId` indices so the whole tree
//! lives in one `Vec` and never forms reference cycles.

use smallvec::SmallVec;

use crate::NodeId;

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(local_name: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(local_name)))
    }

    /// Create a new text node
    pub fn text(content: String) -> Self {
        Self::with_data(NodeData::Text(TextData { content }))
    }

    /// Create a comment node
    pub fn comment(content: String) -> Self {
        Self::with_data(NodeData::Comment(content))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Create a shadow root node attached to `host`
    pub fn shadow_root(host: NodeId) -> Self {
        Self::with_data(NodeData::ShadowRoot { host })
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
    /// Comment
    Comment(String),
    /// Root of a shadow tree; its children are the host's composed children
    ShadowRoot { host: NodeId },
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercased tag name
    pub local_name: Box<str>,
    /// Attributes in insertion order
    pub attrs: Vec<Attribute>,
    /// Cached id attribute
    pub id: Option<Box<str>>,
    /// Cached class list
    pub classes: SmallVec<[Box<str>; 4]>,
    /// Cached `slot` attribute
    pub slot: Option<Box<str>>,
    /// Shadow root node, if one was attached
    pub shadow_root: NodeId,
    /// Element is rendered in the top layer (dialog, popover, fullscreen)
    pub in_top_layer: bool,
}

impl ElementData {
    pub fn new(local_name: &str) -> Self {
        Self {
            local_name: local_name.to_ascii_lowercase().into_boxed_str(),
            attrs: Vec::new(),
            id: None,
            classes: SmallVec::new(),
            slot: None,
            shadow_root: NodeId::NONE,
            in_top_layer: false,
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|a| &*a.name == name)
            .map(|a| &*a.value)
    }

    /// Set an attribute, refreshing the id/class/slot caches
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "id" => self.id = Some(value.into()),
            "class" => {
                self.classes = value.split_ascii_whitespace().map(Into::into).collect();
            }
            "slot" => self.slot = Some(value.into()),
            _ => {}
        }

        if let Some(attr) = self.attrs.iter_mut().find(|a| *a.name == *name) {
            attr.value = value.into();
            return;
        }
        self.attrs.push(Attribute { name: name.into_boxed_str(), value: value.into() });
    }

    /// Remove an attribute, returning whether it existed
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| !a.name.eq_ignore_ascii_case(name));
        match name {
            "id" => self.id = None,
            "class" => self.classes.clear(),
            "slot" => self.slot = None,
            _ => {}
        }
        before != self.attrs.len()
    }

    /// Check for a class name
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| &**c == class)
    }

    /// Whether this is a `<slot>` element
    pub fn is_slot(&self) -> bool {
        &*self.local_name == "slot"
    }
}

/// Text node data
#[derive(Debug)]
pub struct TextData {
    pub content: String,
}

/// Attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: Box<str>,
    pub value: Box<str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_caches() {
        let mut elem = ElementData::new("DIV");
        assert_eq!(&*elem.local_name, "div");

        elem.set_attr("class", "a  b");
        elem.set_attr("id", "main");
        assert!(elem.has_class("a"));
        assert!(elem.has_class("b"));
        assert_eq!(elem.id.as_deref(), Some("main"));

        elem.set_attr("class", "c");
        assert!(!elem.has_class("a"));
        assert_eq!(elem.attrs.len(), 2);

        assert!(elem.remove_attr("id"));
        assert!(elem.id.is_none());
        assert!(!elem.remove_attr("id"));
    }
}
