//! Page - A document with its style and layout state
//!
//! DOM and style mutations go through the page so the affected elements are
//! invalidated. `update` then runs resolution passes interleaved with layout
//! until anchor positioning and deferred container-query work settle.

use std::sync::Arc;

use fos_css::{
    AnimationController, CssValue, DeclarationBlock, InlineStyle, LayoutQueries, NoAnimations, PropertyId, PseudoId,
    ResolutionSession, ResolverStats, Rule, Selector, Style, StyleScope, Stylist, TreeResolver, Update, Validity,
};
use fos_dom::{Document, DomTree, NodeId, Rect, Size};
use fos_layout::LayoutTree;

use crate::{Config, EngineError};

/// Result of one `Page::update`
#[derive(Debug)]
pub struct UpdateReport {
    /// Resolution passes run
    pub passes: usize,
    /// False when `max_interleaved_passes` cut the update short
    pub converged: bool,
    /// Styles of every pass, later passes overriding earlier ones
    pub update: Update,
    /// Anchor stages, position-try selections and counters of the update
    pub session: ResolutionSession,
}

impl UpdateReport {
    pub fn stats(&self) -> &ResolverStats {
        self.session.stats()
    }
}

/// A document with its style and layout state
pub struct Page {
    document: Document,
    scope: StyleScope,
    layout: LayoutTree,
    animations: Box<dyn AnimationController>,
    config: Config,
}

impl Page {
    pub fn new(document: Document, stylist: Stylist, config: Config) -> Self {
        let scope = StyleScope::new(stylist, config.resolver_config());
        Self {
            document,
            scope,
            layout: LayoutTree::new(),
            animations: Box::new(NoAnimations),
            config,
        }
    }

    pub fn url(&self) -> &str {
        self.document.url()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tree(&self) -> &DomTree {
        &self.document.tree
    }

    pub fn scope(&self) -> &StyleScope {
        &self.scope
    }

    pub fn layout(&self) -> &LayoutTree {
        &self.layout
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document_element(&self) -> Option<NodeId> {
        self.document.document_element()
    }

    pub fn body(&self) -> Option<NodeId> {
        self.document.body()
    }

    // ---- DOM mutation ----

    /// New detached element
    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        self.document.tree.create_element(local_name)
    }

    /// New detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.document.tree.create_text(content)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), EngineError> {
        let previous_last = self.document.tree.element_children(parent).last();
        self.document.tree.append_child(parent, child)?;

        let dom = &self.document.tree;
        // A moved subtree restyles from scratch under its new parent.
        self.scope.forget_subtree(dom, child);
        self.layout.forget_subtree(dom, child);
        self.scope.mark_for_descendant_resolution(dom, parent);
        // `:last-child` moved.
        if let Some(sibling) = previous_last.filter(|&s| s != child) {
            self.scope.invalidate(dom, sibling, Validity::SubtreeInvalid);
        }
        Ok(())
    }

    pub fn remove_child(&mut self, child: NodeId) -> Result<(), EngineError> {
        let dom = &self.document.tree;
        let siblings = [dom.previous_element_sibling(child), dom.next_element_sibling(child)];
        self.document.tree.remove_child(child)?;

        let dom = &self.document.tree;
        self.scope.forget_subtree(dom, child);
        self.layout.forget_subtree(dom, child);
        for sibling in siblings.into_iter().flatten() {
            self.scope.invalidate(dom, sibling, Validity::SubtreeInvalid);
        }
        Ok(())
    }

    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<(), EngineError> {
        self.document.tree.set_attribute(element, name, value)?;
        // Descendant selectors can depend on it.
        self.scope.invalidate(&self.document.tree, element, Validity::SubtreeInvalid);
        Ok(())
    }

    pub fn set_text_content(&mut self, text: NodeId, content: &str) -> Result<(), EngineError> {
        self.document.tree.set_text_content(text, content)?;
        self.layout.set_needs_layout();
        Ok(())
    }

    pub fn attach_shadow(&mut self, host: NodeId) -> Result<NodeId, EngineError> {
        let shadow_root = self.document.tree.attach_shadow(host)?;
        self.scope.invalidate(&self.document.tree, host, Validity::SubtreeInvalid);
        Ok(shadow_root)
    }

    pub fn set_in_top_layer(&mut self, element: NodeId, in_top_layer: bool) -> Result<(), EngineError> {
        self.document.tree.set_in_top_layer(element, in_top_layer)?;
        self.scope.invalidate(&self.document.tree, element, Validity::ElementInvalid);
        Ok(())
    }

    // ---- Style mutation ----

    pub fn set_inline_property(
        &mut self,
        element: NodeId,
        property: impl Into<PropertyId>,
        value: CssValue,
        important: bool,
    ) {
        self.scope.set_inline_property(&self.document.tree, element, property, value, important);
    }

    pub fn remove_inline_property(&mut self, element: NodeId, property: impl Into<PropertyId>) -> bool {
        self.scope.remove_inline_property(&self.document.tree, element, property)
    }

    pub fn replace_inline_style(&mut self, element: NodeId, inline: Option<InlineStyle>) {
        self.scope.replace_inline_style(&self.document.tree, element, inline);
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.scope.stylist_mut().add_rule(rule);
    }

    /// Parse `selector` and add an author rule
    pub fn add_author_rule(&mut self, selector: &str, block: DeclarationBlock) -> Result<(), EngineError> {
        let selector = Selector::parse(selector)?;
        self.add_rule(Rule::author(selector, block));
        Ok(())
    }

    /// Register an `@position-try` rule
    pub fn add_position_try_rule(&mut self, name: &str, block: DeclarationBlock) {
        self.scope.stylist_mut().add_position_try_rule(name, block);
    }

    pub fn stylist_mut(&mut self) -> &mut Stylist {
        self.scope.stylist_mut()
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.config.viewport = viewport;
        self.scope.set_viewport(&self.document.tree, viewport);
    }

    pub fn set_view_transition_active(&mut self, active: bool) {
        self.scope.set_view_transition_active(&self.document.tree, active);
    }

    pub fn set_animation_controller(&mut self, animations: Box<dyn AnimationController>) {
        self.animations = animations;
    }

    /// Re-run animations for `element` on the next update
    pub fn invalidate_animations(&mut self, element: NodeId) {
        self.scope.invalidate(&self.document.tree, element, Validity::AnimationInvalid);
    }

    // ---- Queries ----

    pub fn computed_style(&self, element: NodeId) -> Option<&Arc<Style>> {
        self.scope.computed_style(element)
    }

    pub fn pseudo_style(&self, element: NodeId, pseudo: PseudoId) -> Option<&Arc<Style>> {
        self.scope.pseudo_style(element, pseudo)
    }

    pub fn border_box(&self, element: NodeId) -> Option<Rect> {
        self.layout.border_box(element)
    }

    pub fn needs_update(&self) -> bool {
        self.scope.needs_style_recalc(&self.document.tree) || self.layout.is_dirty()
    }

    /// Bring styles and layout up to date
    pub fn update(&mut self) -> UpdateReport {
        let span = tracing::debug_span!("update", url = self.document.url());
        let _enter = span.enter();

        let mut session = ResolutionSession::new();
        let mut update = Update::new();
        let mut passes = 0;
        let converged = loop {
            if passes == self.config.max_interleaved_passes {
                tracing::warn!(passes, "interleaved layout did not settle");
                break false;
            }
            passes += 1;

            let pass = TreeResolver::new(
                &self.document.tree,
                &mut self.scope,
                &mut session,
                &self.layout,
                self.animations.as_mut(),
            )
            .resolve();
            self.layout.apply(&pass);
            self.layout.layout(&self.document.tree, self.config.viewport);
            update.merge(pass);

            if !session.after_interleaved_layout(&self.document.tree, &mut self.scope, &self.layout) {
                break true;
            }
        };

        let stats = session.stats();
        tracing::debug!(
            passes,
            converged,
            resolved = stats.elements_resolved,
            fast_path = stats.fast_path_inherits,
            cache_hits = stats.cache_partial_hits + stats.cache_full_hits,
            "update finished"
        );
        UpdateReport { passes, converged, update, session }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_css::{Color, LonghandId};

    fn page() -> Page {
        let document = Document::new("about:blank").unwrap();
        Page::new(document, Stylist::with_default_user_agent_sheet(), Config::default())
    }

    #[test]
    fn test_fresh_page_needs_update() {
        let mut page = page();
        assert!(page.needs_update());
        let report = page.update();
        assert!(report.converged);
        assert_eq!(report.passes, 1);
        assert!(!page.needs_update());
    }

    #[test]
    fn test_bad_selector_is_an_error() {
        let mut page = page();
        let err = page.add_author_rule("div >", DeclarationBlock::new()).unwrap_err();
        assert!(matches!(err, EngineError::Selector(_)));
    }

    #[test]
    fn test_appended_element_is_styled() {
        let mut page = page();
        page.update();
        let body = page.body().unwrap();
        let div = page.create_element("div");
        page.append_child(body, div).unwrap();
        page.set_inline_property(div, LonghandId::Color, CssValue::ident("red"), false);

        let report = page.update();
        assert!(report.update.element(div).is_some());
        assert_eq!(page.computed_style(div).unwrap().color(), Color::RED);
        assert!(page.border_box(div).is_some());
    }

    #[test]
    fn test_removed_element_is_forgotten() {
        let mut page = page();
        let body = page.body().unwrap();
        page.update();
        page.remove_child(body).unwrap();
        page.update();
        assert!(page.computed_style(body).is_none());
        assert!(page.border_box(body).is_none());
    }

    #[test]
    fn test_dom_errors_are_reported() {
        let mut page = page();
        let text = page.create_text("x");
        let err = page.set_attribute(text, "class", "a").unwrap_err();
        assert!(matches!(err, EngineError::Dom(_)));
    }
}
