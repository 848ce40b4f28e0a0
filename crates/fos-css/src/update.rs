//! Style Update
//!
//! Per-pass diff handed to the box tree: new styles for every element that
//! was re-resolved, with the change classification, plus text nodes whose
//! inherited style came through a `display: contents` parent.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::change::Change;
use crate::style::{PseudoId, Style};
use fos_dom::NodeId;

/// New style for one element
#[derive(Debug, Clone)]
pub struct ElementUpdate {
    pub style: Arc<Style>,
    pub change: Change,
    /// An animation requires the element to be recomposited
    pub recomposite: bool,
    pub pseudo_styles: SmallVec<[(PseudoId, Arc<Style>); 2]>,
}

/// Text node whose parent changed
#[derive(Debug, Clone, Default)]
pub struct TextUpdate {
    /// Style of a `display: contents` parent, which has no box of its own
    pub inherited_display_contents_style: Option<Arc<Style>>,
}

/// Everything one resolution pass produced, in tree order
#[derive(Debug, Default)]
pub struct Update {
    elements: Vec<(NodeId, ElementUpdate)>,
    element_index: FxHashMap<NodeId, usize>,
    texts: Vec<(NodeId, TextUpdate)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `element`; a later record for the same element replaces the
    /// style and merges the change.
    pub fn add_element(&mut self, element: NodeId, update: ElementUpdate) {
        match self.element_index.get(&element) {
            Some(&index) => {
                let existing = &mut self.elements[index].1;
                let change = existing.change | update.change;
                let recomposite = existing.recomposite || update.recomposite;
                *existing = ElementUpdate { change, recomposite, ..update };
            }
            None => {
                self.element_index.insert(element, self.elements.len());
                self.elements.push((element, update));
            }
        }
    }

    pub fn add_text(&mut self, text: NodeId, update: TextUpdate) {
        self.texts.push((text, update));
    }

    pub fn element(&self, element: NodeId) -> Option<&ElementUpdate> {
        self.element_index.get(&element).map(|&index| &self.elements[index].1)
    }

    pub fn elements(&self) -> impl Iterator<Item = (NodeId, &ElementUpdate)> + '_ {
        self.elements.iter().map(|(node, update)| (*node, update))
    }

    pub fn texts(&self) -> impl Iterator<Item = (NodeId, &TextUpdate)> + '_ {
        self.texts.iter().map(|(node, update)| (*node, update))
    }

    /// Fold a later pass's update into this one
    pub fn merge(&mut self, other: Update) {
        for (element, update) in other.elements {
            self.add_element(element, update);
        }
        self.texts.extend(other.texts);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.texts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(change: Change) -> ElementUpdate {
        ElementUpdate { style: Arc::new(Style::initial()), change, recomposite: false, pseudo_styles: SmallVec::new() }
    }

    #[test]
    fn test_repeat_element_merges_change() {
        let mut u = Update::new();
        u.add_element(NodeId::ROOT, update(Change::RENDERER));
        u.add_element(NodeId::ROOT, update(Change::NON_INHERITED));
        assert_eq!(u.len(), 1);
        assert_eq!(u.element(NodeId::ROOT).unwrap().change, Change::RENDERER | Change::NON_INHERITED);
    }
}
