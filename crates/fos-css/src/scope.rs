//! Style Scope
//!
//! Long-lived per-document style state: the rule set, every element's
//! published style and invalidation level, inline style objects and the
//! match-result cache. Mutation entry points mark the affected element and
//! flag its composed-tree ancestors so the next pass can find it.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::config::ResolverConfig;
use crate::declarations::InlineStyle;
use crate::element_data::{ElementDataMap, ElementStyleFlags, Validity};
use crate::match_result_cache::MatchResultCache;
use crate::properties::PropertyId;
use crate::style::{PseudoId, Style};
use crate::stylist::Stylist;
use crate::values::CssValue;
use fos_dom::{DomTree, NodeId, Size};

/// Document style state that survives across updates
#[derive(Debug)]
pub struct StyleScope {
    pub(crate) stylist: Stylist,
    pub(crate) elements: ElementDataMap,
    pub(crate) match_result_cache: MatchResultCache,
    /// Stylist version the current styles were computed with
    pub(crate) last_stylist_version: Option<u64>,
    /// Content size of each query container at its last layout
    pub(crate) query_container_sizes: FxHashMap<NodeId, Size>,
    pub(crate) view_transition_active: bool,
    pub(crate) config: ResolverConfig,
}

impl StyleScope {
    pub fn new(stylist: Stylist, config: ResolverConfig) -> Self {
        Self {
            stylist,
            elements: ElementDataMap::default(),
            match_result_cache: MatchResultCache::new(),
            last_stylist_version: None,
            query_container_sizes: FxHashMap::default(),
            view_transition_active: false,
            config,
        }
    }

    pub fn stylist(&self) -> &Stylist {
        &self.stylist
    }

    /// Rule changes are picked up at the start of the next pass
    pub fn stylist_mut(&mut self) -> &mut Stylist {
        &mut self.stylist
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn elements(&self) -> &ElementDataMap {
        &self.elements
    }

    pub fn match_result_cache(&self) -> &MatchResultCache {
        &self.match_result_cache
    }

    pub fn computed_style(&self, element: NodeId) -> Option<&Arc<Style>> {
        self.elements.style(element)
    }

    pub fn pseudo_style(&self, element: NodeId, pseudo: PseudoId) -> Option<&Arc<Style>> {
        self.elements.get(element)?.pseudo_style(pseudo)
    }

    pub fn inline_style(&self, element: NodeId) -> Option<&InlineStyle> {
        self.elements.get(element)?.inline_style.as_ref()
    }

    /// Set one inline declaration, creating the inline style object if needed
    pub fn set_inline_property(
        &mut self,
        dom: &DomTree,
        element: NodeId,
        property: impl Into<PropertyId>,
        value: CssValue,
        important: bool,
    ) {
        let data = self.elements.ensure(element);
        data.inline_style.get_or_insert_with(InlineStyle::new).set(property.into(), value, important);
        self.invalidate(dom, element, Validity::InlineStyleInvalid);
    }

    pub fn remove_inline_property(&mut self, dom: &DomTree, element: NodeId, property: impl Into<PropertyId>) -> bool {
        let property = property.into();
        let removed = self
            .elements
            .get_mut(element)
            .and_then(|data| data.inline_style.as_mut())
            .is_some_and(|inline| inline.remove(&property));
        if removed {
            self.invalidate(dom, element, Validity::InlineStyleInvalid);
        }
        removed
    }

    /// Install a new inline style object (a new identity for the cache)
    pub fn replace_inline_style(&mut self, dom: &DomTree, element: NodeId, inline: Option<InlineStyle>) {
        self.elements.ensure(element).inline_style = inline;
        self.invalidate(dom, element, Validity::InlineStyleInvalid);
    }

    /// Raise `element`'s invalidation level and flag its ancestors
    pub fn invalidate(&mut self, dom: &DomTree, element: NodeId, validity: Validity) {
        let data = self.elements.ensure(element);
        data.validity = data.validity.max(validity);
        self.mark_ancestors(dom, element);
    }

    /// Rebuild `element`'s box subtree without recomputing styles
    pub fn invalidate_renderer(&mut self, dom: &DomTree, element: NodeId) {
        self.elements.ensure(element).flags.insert(ElementStyleFlags::NEEDS_RENDERER_REBUILD);
        self.mark_ancestors(dom, element);
    }

    /// Flag `element` and its ancestors so a pass descends into its children
    pub fn mark_for_descendant_resolution(&mut self, dom: &DomTree, element: NodeId) {
        self.elements.ensure(element).flags.insert(ElementStyleFlags::CHILD_NEEDS_STYLE_RECALC);
        self.mark_ancestors(dom, element);
    }

    fn mark_ancestors(&mut self, dom: &DomTree, element: NodeId) {
        let mut current = dom.composed_parent_element(element);
        while let Some(ancestor) = current {
            self.elements.ensure(ancestor).flags.insert(ElementStyleFlags::CHILD_NEEDS_STYLE_RECALC);
            current = dom.composed_parent_element(ancestor);
        }
    }

    /// Drop all style state for `root` and its composed-tree descendants
    pub fn forget_subtree(&mut self, dom: &DomTree, root: NodeId) {
        let subtree = std::iter::once(root).chain(dom.composed_tree_descendants(root).map(|(node, _)| node));
        for node in subtree {
            if self.elements.remove(node).is_some() {
                self.match_result_cache.remove(node);
                self.query_container_sizes.remove(&node);
            }
        }
    }

    pub fn set_view_transition_active(&mut self, dom: &DomTree, active: bool) {
        if self.view_transition_active == active {
            return;
        }
        self.view_transition_active = active;
        if let Some(root) = dom.element_children(dom.root()).next() {
            self.invalidate(dom, root, Validity::ElementInvalid);
        }
    }

    /// Viewport-relative lengths recompute for the whole tree
    pub fn set_viewport(&mut self, dom: &DomTree, viewport: Size) {
        if self.config.viewport == viewport {
            return;
        }
        self.config.viewport = viewport;
        if let Some(root) = dom.element_children(dom.root()).next() {
            self.invalidate(dom, root, Validity::SubtreeInvalid);
        }
    }

    /// Whether the next pass has anything to do
    pub fn needs_style_recalc(&self, dom: &DomTree) -> bool {
        if self.last_stylist_version != Some(self.stylist.version()) {
            return true;
        }
        let Some(root) = dom.element_children(dom.root()).next() else {
            return false;
        };
        self.elements
            .get(root)
            .is_none_or(|data| data.style.is_none() || data.needs_style_recalc() || data.child_needs_style_recalc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::LonghandId;

    fn tree() -> (DomTree, NodeId, NodeId) {
        let mut dom = DomTree::new();
        let html = dom.create_element("html");
        let div = dom.create_element("div");
        dom.append_child(dom.root(), html).unwrap();
        dom.append_child(html, div).unwrap();
        (dom, html, div)
    }

    #[test]
    fn test_invalidate_flags_ancestors() {
        let (dom, html, div) = tree();
        let mut scope = StyleScope::new(Stylist::new(), ResolverConfig::default());
        scope.invalidate(&dom, div, Validity::ElementInvalid);
        scope.invalidate(&dom, div, Validity::AnimationInvalid);
        assert_eq!(scope.elements().get(div).unwrap().validity, Validity::ElementInvalid);
        assert!(scope.elements().get(html).unwrap().child_needs_style_recalc());
        assert!(scope.needs_style_recalc(&dom));
    }

    #[test]
    fn test_inline_edits_keep_object_identity() {
        let (dom, _, div) = tree();
        let mut scope = StyleScope::new(Stylist::new(), ResolverConfig::default());
        scope.set_inline_property(&dom, div, LonghandId::Width, CssValue::px(1.0), false);
        let id = scope.inline_style(div).unwrap().id();
        scope.set_inline_property(&dom, div, LonghandId::Width, CssValue::px(2.0), false);
        assert_eq!(scope.inline_style(div).unwrap().id(), id);
        assert!(scope.remove_inline_property(&dom, div, LonghandId::Width));
        assert!(!scope.remove_inline_property(&dom, div, LonghandId::Height));

        scope.replace_inline_style(&dom, div, Some(InlineStyle::new()));
        assert_ne!(scope.inline_style(div).unwrap().id(), id);
        assert_eq!(scope.elements().get(div).unwrap().validity, Validity::InlineStyleInvalid);
    }
}
