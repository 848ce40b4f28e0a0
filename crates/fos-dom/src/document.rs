//! Document - High-level document API

use crate::{DomResult, DomTree, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a document with `<html><head></head><body></body></html>`
    pub fn new(url: &str) -> DomResult<Self> {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");
        tree.append_child(tree.root(), html)?;
        tree.append_child(html, head)?;
        tree.append_child(html, body)?;
        tracing::debug!(url, "created document");

        Ok(Self {
            tree,
            url: url.to_string(),
            html_element: html,
            body_element: body,
        })
    }

    /// Create a document holding only the document node
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The root element (first element child of the document node)
    pub fn document_element(&self) -> Option<NodeId> {
        if self.html_element.is_valid() && self.tree.parent(self.html_element) == self.tree.root() {
            return Some(self.html_element);
        }
        self.tree.element_children(self.tree.root()).next()
    }

    /// The `<body>` element created with the document
    pub fn body(&self) -> Option<NodeId> {
        Some(self.body_element).filter(|id| id.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_structure() {
        let doc = Document::new("about:blank").unwrap();
        let html = doc.document_element().unwrap();
        assert_eq!(doc.tree.element(html).unwrap().local_name.as_ref(), "html");
        let body = doc.body().unwrap();
        assert_eq!(doc.tree.parent(body), html);
        assert_eq!(doc.url(), "about:blank");
    }

    #[test]
    fn test_empty_document() {
        let mut doc = Document::empty("about:blank");
        assert_eq!(doc.document_element(), None);
        let root = doc.tree.create_element("svg");
        doc.tree.append_child(NodeId::ROOT, root).unwrap();
        assert_eq!(doc.document_element(), Some(root));
    }
}
