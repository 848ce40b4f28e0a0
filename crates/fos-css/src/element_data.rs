//! Per-element style data
//!
//! Side table keyed by `NodeId` holding each element's published style,
//! its invalidation level and its inline style object.

use std::sync::Arc;

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::declarations::InlineStyle;
use crate::style::{PseudoId, Style};
use fos_dom::NodeId;

/// What triggered the need to recompute an element's style, in increasing severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Validity {
    #[default]
    Valid,
    AnimationInvalid,
    InlineStyleInvalid,
    ElementInvalid,
    SubtreeInvalid,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ElementStyleFlags: u8 {
        /// Some composed-tree descendant needs style recalc
        const CHILD_NEEDS_STYLE_RECALC = 1 << 0;
        /// Renderer must be rebuilt even if the style is unchanged
        const NEEDS_RENDERER_REBUILD = 1 << 1;
    }
}

/// Style state for one element
#[derive(Debug, Clone, Default)]
pub struct ElementStyleData {
    pub style: Option<Arc<Style>>,
    /// Style before animations were applied
    pub base_style: Option<Arc<Style>>,
    pub pseudo_styles: SmallVec<[(PseudoId, Arc<Style>); 2]>,
    pub validity: Validity,
    pub flags: ElementStyleFlags,
    pub inline_style: Option<InlineStyle>,
}

impl ElementStyleData {
    pub fn pseudo_style(&self, pseudo: PseudoId) -> Option<&Arc<Style>> {
        self.pseudo_styles.iter().find(|(id, _)| *id == pseudo).map(|(_, style)| style)
    }

    pub fn needs_style_recalc(&self) -> bool {
        self.validity != Validity::Valid || self.flags.contains(ElementStyleFlags::NEEDS_RENDERER_REBUILD)
    }

    pub fn child_needs_style_recalc(&self) -> bool {
        self.flags.contains(ElementStyleFlags::CHILD_NEEDS_STYLE_RECALC)
    }

    /// Drop computed styles but keep the inline style object
    pub fn clear_styles(&mut self) {
        self.style = None;
        self.base_style = None;
        self.pseudo_styles.clear();
    }
}

/// Element style table
#[derive(Debug, Default)]
pub struct ElementDataMap {
    map: FxHashMap<NodeId, ElementStyleData>,
}

impl ElementDataMap {
    pub fn get(&self, element: NodeId) -> Option<&ElementStyleData> {
        self.map.get(&element)
    }

    pub fn get_mut(&mut self, element: NodeId) -> Option<&mut ElementStyleData> {
        self.map.get_mut(&element)
    }

    /// Data for `element`, created on first use
    pub fn ensure(&mut self, element: NodeId) -> &mut ElementStyleData {
        self.map.entry(element).or_default()
    }

    pub fn style(&self, element: NodeId) -> Option<&Arc<Style>> {
        self.map.get(&element).and_then(|d| d.style.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ElementStyleData)> + '_ {
        self.map.iter().map(|(node, data)| (*node, data))
    }

    pub fn remove(&mut self, element: NodeId) -> Option<ElementStyleData> {
        self.map.remove(&element)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
