//! Tree Resolver
//!
//! Walks the composed tree in pre-order and decides per element whether it
//! needs a full cascade, a fast-path inherit of the parent's changed values,
//! an animation-only update, a renderer rebuild with its existing style, or
//! nothing at all. Resolved styles are published to the `StyleScope` and
//! collected into an `Update`.
//!
//! Subtrees whose styles depend on layout (size query containers, elements
//! still looking for their anchors) are deferred: the pending change and
//! descendant level are saved in the session, and the next pass resumes
//! from exactly that point once an interleaved layout has run.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::adjuster::{AdjustContext, adjust};
use crate::anchor::{AnchorKey, AnchorStage, ElementAnchorEvaluator, PositionOptions};
use crate::animation::{AnimationController, AnimationImpact};
use crate::builder::{Builder, BuilderContext, PropertySelection};
use crate::change::{
    Change, DescendantsToResolve, compute_change, compute_descendants_to_resolve, root_change_affects_relative_units,
    style_query_properties_changed,
};
use crate::declarations::DeclarationBlock;
use crate::element_data::{ElementStyleData, ElementStyleFlags, Validity};
use crate::layout_queries::LayoutQueries;
use crate::match_result::MatchResult;
use crate::match_result_cache::{CacheLookup, ChangedProperties};
use crate::properties::LonghandId;
use crate::scope::StyleScope;
use crate::session::{DeferredWork, ResolutionSession};
use crate::style::{Display, PositionTryFallback, PositionTryOrder, PseudoId, Style, TryTactic};
use crate::stylist::MatchingContext;
use crate::update::{ElementUpdate, TextUpdate, Update};
use crate::values::CssValue;
use fos_dom::{DomTree, LogicalAxis, NodeId, PhysicalAxis};

type PseudoStyles = SmallVec<[(PseudoId, Arc<Style>); 2]>;

/// How an element's style is recomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionType {
    /// Keep the style, rebuild the box
    RebuildUsingExisting,
    /// Copy the fast-path inheritable values down from the parent
    FastPathInherit,
    /// Re-run animations over the stored base style
    AnimationOnly,
    /// Full cascade, reusing the match-result cache if it still applies
    FullWithMatchResultCache,
    Full,
}

/// Pick how to resolve an element from its own state and what its parent
/// requires of its descendants. `None` means the style can be kept.
pub fn determine_resolution_type(
    data: Option<&ElementStyleData>,
    parent_descendants: DescendantsToResolve,
    parent_change: Change,
) -> Option<ResolutionType> {
    let Some(data) = data else {
        return Some(ResolutionType::Full);
    };
    let Some(existing) = data.style.as_ref() else {
        return Some(ResolutionType::Full);
    };
    if parent_descendants == DescendantsToResolve::All {
        return Some(ResolutionType::Full);
    }
    match data.validity {
        Validity::SubtreeInvalid | Validity::ElementInvalid => return Some(ResolutionType::Full),
        Validity::InlineStyleInvalid => {
            return Some(if parent_descendants == DescendantsToResolve::None {
                ResolutionType::FullWithMatchResultCache
            } else {
                ResolutionType::Full
            });
        }
        Validity::AnimationInvalid => {
            return Some(if parent_descendants == DescendantsToResolve::None && data.base_style.is_some() {
                ResolutionType::AnimationOnly
            } else {
                ResolutionType::Full
            });
        }
        Validity::Valid => {}
    }
    if parent_descendants == DescendantsToResolve::RebuildAllUsingExisting
        || data.flags.contains(ElementStyleFlags::NEEDS_RENDERER_REBUILD)
    {
        return Some(ResolutionType::RebuildUsingExisting);
    }
    match parent_descendants {
        DescendantsToResolve::Children => {
            let fast_path = !parent_change.contains(Change::INHERITED)
                && !existing.disallows_fast_path_inheritance()
                && !existing.has_explicitly_inherited_properties();
            Some(if fast_path { ResolutionType::FastPathInherit } else { ResolutionType::Full })
        }
        DescendantsToResolve::ChildrenWithExplicitInherit => {
            existing.has_explicitly_inherited_properties().then_some(ResolutionType::Full)
        }
        _ => None,
    }
}

/// Element whose `::first-line` / `::first-letter` rules apply to the
/// first block-level box below it
#[derive(Debug, Clone)]
struct FirstLineOrigin {
    element: NodeId,
    pseudos: SmallVec<[PseudoId; 2]>,
}

/// Open ancestor during the walk
#[derive(Debug)]
struct Frame {
    depth: usize,
    style: Arc<Style>,
    change: Change,
    descendants: DescendantsToResolve,
    /// Handed to the first block-level child, if any
    first_line_origin: Option<FirstLineOrigin>,
    /// Set once a block-level child or non-blank text has been seen
    first_line_letter_resolved: bool,
}

/// Output of building one element's style
struct BuiltStyle {
    style: Style,
    base_style: Option<Style>,
    recomposite: bool,
}

/// One resolution pass over the document
pub struct TreeResolver<'a> {
    dom: &'a DomTree,
    scope: &'a mut StyleScope,
    session: &'a mut ResolutionSession,
    layout: &'a dyn LayoutQueries,
    animations: &'a mut dyn AnimationController,
    initial: Arc<Style>,
    document_element: Option<NodeId>,
    root_font_size: f32,
    frames: Vec<Frame>,
    update: Update,
}

impl<'a> TreeResolver<'a> {
    pub fn new(
        dom: &'a DomTree,
        scope: &'a mut StyleScope,
        session: &'a mut ResolutionSession,
        layout: &'a dyn LayoutQueries,
        animations: &'a mut dyn AnimationController,
    ) -> Self {
        let initial = Arc::new(Style::initial());
        let root_font_size = initial.font_size();
        Self {
            dom,
            scope,
            session,
            layout,
            animations,
            initial,
            document_element: None,
            root_font_size,
            frames: Vec::new(),
            update: Update::new(),
        }
    }

    /// Resolve every element that needs it
    pub fn resolve(mut self) -> Update {
        self.session.stats.passes += 1;
        self.document_element = self.dom.element_children(self.dom.root()).next();
        let Some(document_element) = self.document_element else {
            tracing::debug!("no document element, nothing to resolve");
            return self.update;
        };

        let version = self.scope.stylist.version();
        if self.scope.last_stylist_version != Some(version) {
            tracing::debug!(version, "rule set changed, resolving whole document");
            self.scope.match_result_cache.clear();
            self.scope.invalidate(self.dom, document_element, Validity::SubtreeInvalid);
            self.scope.last_stylist_version = Some(version);
        }
        if let Some(root_style) = self.scope.elements.style(document_element) {
            self.root_font_size = root_style.font_size();
        }

        let dom = self.dom;
        let mut walker = dom.composed_tree_descendants(dom.root());
        while let Some((node, depth)) = walker.next() {
            while self.frames.last().is_some_and(|frame| frame.depth >= depth) {
                self.frames.pop();
            }
            let descend = match dom.get(node) {
                Some(n) if n.is_element() => self.visit_element(node, depth),
                Some(n) if n.is_text() => {
                    self.visit_text(node, depth);
                    false
                }
                _ => false,
            };
            if !descend {
                walker.skip_children();
            }
        }

        tracing::debug!(
            elements = self.update.len(),
            deferred = self.session.deferred.len(),
            "style resolution pass"
        );
        self.update
    }

    fn visit_text(&mut self, text: NodeId, depth: usize) {
        let has_content = self.dom.get(text).and_then(|n| n.as_text()).is_some_and(|t| !t.trim().is_empty());
        let Some(parent) = self.frames.last_mut().filter(|f| f.depth + 1 == depth) else { return };
        if has_content {
            // The first line starts in this text, not in a later block.
            parent.first_line_letter_resolved = true;
        }
        if parent.change.is_empty() {
            return;
        }
        let inherited_display_contents_style =
            (parent.style.display() == Display::Contents).then(|| Arc::clone(&parent.style));
        self.update.add_text(text, TextUpdate { inherited_display_contents_style });
    }

    /// Returns true if the walk should enter the element's children
    fn visit_element(&mut self, element: NodeId, depth: usize) -> bool {
        let (parent_style, parent_descendants, parent_change) = match self.frames.last() {
            Some(frame) => (Arc::clone(&frame.style), frame.descendants, frame.change),
            None => (Arc::clone(&self.initial), DescendantsToResolve::None, Change::empty()),
        };

        if depth > self.scope.config.max_tree_depth {
            self.resolve_too_deep(element, &parent_style);
            return false;
        }

        let data = self.scope.elements.get(element);
        let resolution = determine_resolution_type(data, parent_descendants, parent_change);
        let child_needs = data.is_some_and(ElementStyleData::child_needs_style_recalc);
        let old_validity = data.map_or(Validity::Valid, |d| d.validity);
        if let Some(data) = self.scope.elements.get_mut(element) {
            data.flags.remove(ElementStyleFlags::CHILD_NEEDS_STYLE_RECALC);
        }
        let resumed = self.session.take_deferred(element);
        let first_line = self
            .frames
            .last()
            .filter(|f| !f.first_line_letter_resolved)
            .and_then(|f| f.first_line_origin.clone());

        let Some(resolution) = resolution else {
            let Some(style) = self.scope.elements.style(element).cloned() else { return false };
            self.note_block_child(&style);
            if (!child_needs && resumed.is_none()) || style.display() == Display::None {
                return false;
            }
            let work = resumed.unwrap_or_default();
            self.push_frame(element, depth, style, work.change, work.descendants, first_line);
            return true;
        };

        let existing = self.scope.elements.get(element).and_then(|d| d.style.clone());
        let old_pseudos: PseudoStyles =
            self.scope.elements.get(element).map(|d| d.pseudo_styles.clone()).unwrap_or_default();

        let (style, base_style, pseudo_styles, recomposite) = match resolution {
            ResolutionType::RebuildUsingExisting => match existing.clone() {
                Some(style) => (style, None, old_pseudos.clone(), false),
                None => return false,
            },
            ResolutionType::FastPathInherit => match existing.as_deref() {
                Some(current) => {
                    self.session.stats.fast_path_inherits += 1;
                    let mut style = current.clone();
                    style.fast_path_inherit_from(&parent_style);
                    self.scope.match_result_cache.update_for_fast_path_inherit(element, &parent_style);
                    let style = Arc::new(style);
                    let pseudos = fast_path_inherit_pseudos(&old_pseudos, &style);
                    (style, None, pseudos, false)
                }
                None => return false,
            },
            ResolutionType::AnimationOnly => {
                let base = self.scope.elements.get(element).and_then(|d| d.base_style.clone());
                match base {
                    Some(base) => {
                        let animated = self.animations.animate(element, None, existing.as_deref(), &base);
                        match animated {
                            Some(animated) => {
                                let recomposite = animated.impact.contains(AnimationImpact::REQUIRES_RECOMPOSITE);
                                (Arc::new(animated.style), Some(base), old_pseudos.clone(), recomposite)
                            }
                            None => (base, None, old_pseudos.clone(), false),
                        }
                    }
                    None => return false,
                }
            }
            ResolutionType::Full | ResolutionType::FullWithMatchResultCache => {
                let built = self.build_element_style(element, &parent_style, resolution, existing.as_ref());
                let style = Arc::new(built.style);
                let pseudos = self.resolve_pseudo_styles(element, &style, first_line.as_ref());
                (style, built.base_style.map(Arc::new), pseudos, built.recomposite)
            }
        };
        let style = match resolution {
            ResolutionType::RebuildUsingExisting => style,
            _ => self.with_position_visibility(element, style, existing.as_deref()),
        };
        self.session.stats.elements_resolved += 1;

        let mut change = match resolution {
            ResolutionType::RebuildUsingExisting => Change::RENDERER,
            _ => compute_change(existing.as_deref(), &style) | pseudo_change(&old_pseudos, &pseudo_styles),
        };
        let query_changed = style_query_properties_changed(
            existing.as_deref(),
            &style,
            self.scope.stylist.style_query_properties(),
        );
        let mut descendants = match resolution {
            ResolutionType::RebuildUsingExisting => DescendantsToResolve::RebuildAllUsingExisting,
            _ => compute_descendants_to_resolve(change, old_validity, query_changed),
        };
        if matches!(parent_descendants, DescendantsToResolve::All | DescendantsToResolve::RebuildAllUsingExisting) {
            descendants = descendants.max(parent_descendants);
        }
        if let Some(work) = resumed {
            change |= work.change;
            descendants = descendants.max(work.descendants);
        }
        if Some(element) == self.document_element
            && resolution != ResolutionType::RebuildUsingExisting
            && root_change_affects_relative_units(existing.as_deref(), &style)
        {
            // `rem` lengths anywhere in the document may have changed.
            tracing::debug!(%element, font_size = style.font_size(), "root font changed, resolving whole document");
            self.scope.match_result_cache.clear();
            descendants = DescendantsToResolve::All;
        }

        let data = self.scope.elements.ensure(element);
        data.style = Some(Arc::clone(&style));
        data.base_style = base_style;
        data.pseudo_styles = pseudo_styles.clone();
        data.validity = Validity::Valid;
        data.flags.remove(ElementStyleFlags::NEEDS_RENDERER_REBUILD);
        if Some(element) == self.document_element {
            self.root_font_size = style.font_size();
        }
        self.update.add_element(element, ElementUpdate { style: Arc::clone(&style), change, recomposite, pseudo_styles });
        self.note_block_child(&style);

        if style.display() == Display::None {
            self.clear_descendant_styles(element);
            return false;
        }
        if descendants != DescendantsToResolve::None && self.must_defer_descendants(element, &style) {
            tracing::trace!(%element, ?descendants, "deferring descendants until layout");
            self.session.defer(element, DeferredWork { change, descendants });
            return false;
        }
        self.push_frame(element, depth, style, change, descendants, first_line);
        true
    }

    /// Apply the `position-visibility` verdict of the latest layout. Until
    /// there is one, a positioned box keeps what its previous style had.
    fn with_position_visibility(&self, element: NodeId, style: Arc<Style>, existing: Option<&Style>) -> Arc<Style> {
        let hidden = style.is_out_of_flow_positioned()
            && self
                .session
                .is_force_hidden(element)
                .unwrap_or_else(|| existing.is_some_and(Style::is_force_hidden));
        if hidden == style.is_force_hidden() {
            return style;
        }
        let mut style = Arc::unwrap_or_clone(style);
        style.set_force_hidden(hidden);
        Arc::new(style)
    }

    /// A block-level box takes the first line from its later siblings,
    /// whether or not it was restyled in this pass
    fn note_block_child(&mut self, style: &Style) {
        if !style.display().is_block_level() {
            return;
        }
        if let Some(parent) = self.frames.last_mut() {
            parent.first_line_letter_resolved = true;
        }
    }

    /// `inherited` is the origin the parent offered this element as its
    /// first block-level child
    fn push_frame(
        &mut self,
        element: NodeId,
        depth: usize,
        style: Arc<Style>,
        change: Change,
        descendants: DescendantsToResolve,
        inherited: Option<FirstLineOrigin>,
    ) {
        let first_line_origin = if style.display().is_block_level() {
            let ctx = MatchingContext { dom: self.dom, styles: &self.scope.elements, layout: self.layout };
            let pseudos: SmallVec<[PseudoId; 2]> = self
                .scope
                .stylist
                .matched_pseudo_elements(&ctx, element)
                .into_iter()
                .filter(|p| matches!(p, PseudoId::FirstLine | PseudoId::FirstLetter))
                .collect();
            if pseudos.is_empty() { inherited } else { Some(FirstLineOrigin { element, pseudos }) }
        } else {
            None
        };
        self.frames.push(Frame {
            depth,
            style,
            change,
            descendants,
            first_line_origin,
            first_line_letter_resolved: false,
        });
    }

    fn must_defer_descendants(&self, element: NodeId, style: &Style) -> bool {
        let finding_anchors = self
            .session
            .anchor_states
            .get(&AnchorKey::element(element))
            .is_some_and(|s| s.stage == AnchorStage::FindAnchors);
        let unsized_container = style.is_query_container()
            && self.scope.stylist.has_container_queries()
            && !self.session.containers_laid_out.contains(&element);
        finding_anchors || unsized_container
    }

    fn resolve_too_deep(&mut self, element: NodeId, parent_style: &Style) {
        let mut style = Style::inherit_from(parent_style);
        style.box_data_mut().display = Display::None;
        let existing = self.scope.elements.style(element).cloned();
        if existing.as_deref() == Some(&style) {
            return;
        }
        tracing::warn!(%element, max_depth = self.scope.config.max_tree_depth, "tree too deep, not rendering subtree");
        let change = compute_change(existing.as_deref(), &style);
        let style = Arc::new(style);
        let data = self.scope.elements.ensure(element);
        data.clear_styles();
        data.style = Some(Arc::clone(&style));
        data.validity = Validity::Valid;
        self.clear_descendant_styles(element);
        self.update
            .add_element(element, ElementUpdate { style, change, recomposite: false, pseudo_styles: SmallVec::new() });
    }

    fn clear_descendant_styles(&mut self, element: NodeId) {
        for (node, _) in self.dom.composed_tree_descendants(element) {
            if let Some(data) = self.scope.elements.get_mut(node) {
                data.clear_styles();
                data.validity = Validity::Valid;
                data.flags = ElementStyleFlags::empty();
            }
            self.scope.match_result_cache.remove(node);
            self.session.deferred.remove(&node);
        }
    }

    fn matching_context(&self) -> MatchingContext<'_> {
        MatchingContext { dom: self.dom, styles: &self.scope.elements, layout: self.layout }
    }

    /// Run the cascade for `element` (or one of its pseudo-elements)
    fn cascade(
        &mut self,
        element: NodeId,
        pseudo: Option<PseudoId>,
        parent: &Style,
        match_result: &MatchResult,
        tactics: &[TryTactic],
        base: Option<Style>,
        selection: PropertySelection,
    ) -> Style {
        let key = AnchorKey { element, pseudo };
        let previous_stage = self.session.anchor_states.get(&key).map(|s| s.stage);
        let mut evaluator = ElementAnchorEvaluator {
            key,
            states: &mut self.session.anchor_states,
            map: &self.session.anchor_map,
            dom: self.dom,
            layout: self.layout,
        };
        let ctx = BuilderContext::new(parent)
            .with_root_font_size(self.root_font_size)
            .with_viewport(self.scope.config.viewport)
            .with_tactics(tactics)
            .with_anchors(&mut evaluator);
        let mut builder = match base {
            Some(style) => Builder::from_style(style, ctx),
            None => Builder::new(ctx, pseudo),
        };
        builder.apply(match_result, selection);
        let style = builder.finish();
        self.update_anchor_stage(key, previous_stage, &style);
        style
    }

    fn update_anchor_stage(&mut self, key: AnchorKey, previous: Option<AnchorStage>, style: &Style) {
        let has_box = key.pseudo.is_some() || self.layout.has_box(key.element);
        let Some(state) = self.session.anchor_states.get_mut(&key) else { return };
        let mut current = state.stage;
        if current == AnchorStage::ResolveAnchorFunctions {
            state.attempted_with_box = has_box;
            if style.uses_anchor_functions() && !style.flags().contains(crate::style::StyleFlags::HAS_UNRESOLVED_ANCHORS)
            {
                state.stage = AnchorStage::Resolved;
                current = AnchorStage::Resolved;
            }
        }
        let rewound = std::mem::take(&mut state.rewound);
        match previous {
            Some(from) => {
                if rewound && from != AnchorStage::FindAnchors {
                    self.session.record_transition(key, from, AnchorStage::FindAnchors);
                    self.session.record_transition(key, AnchorStage::FindAnchors, current);
                } else {
                    self.session.record_transition(key, from, current);
                }
            }
            None => self.session.record_transition(key, AnchorStage::FindAnchors, current),
        }
    }

    fn build_element_style(
        &mut self,
        element: NodeId,
        parent_style: &Arc<Style>,
        resolution: ResolutionType,
        existing: Option<&Arc<Style>>,
    ) -> BuiltStyle {
        let inline = self.scope.elements.get(element).and_then(|d| d.inline_style.clone());
        let fallback = self.session.position_options.get(&element).and_then(PositionOptions::current).cloned();
        let cacheable = self.scope.config.enable_match_result_cache
            && fallback.is_none()
            && !existing.is_some_and(|s| s.uses_anchor_functions());

        if resolution == ResolutionType::FullWithMatchResultCache && cacheable {
            let (hit, outcome) = self.scope.match_result_cache.lookup(element, inline.as_ref(), parent_style);
            if outcome != CacheLookup::Hit {
                self.session.stats.cache_misses += 1;
            }
            if let Some(hit) = hit {
                let unadjusted = match hit.changed {
                    ChangedProperties::Only(properties) => {
                        self.session.stats.cache_partial_hits += 1;
                        tracing::trace!(%element, changed = properties.len(), "match result cache partial hit");
                        self.cascade(
                            element,
                            None,
                            parent_style,
                            &hit.match_result,
                            &[],
                            Some((*hit.unadjusted_style).clone()),
                            PropertySelection::only(properties),
                        )
                    }
                    ChangedProperties::All => {
                        self.session.stats.cache_full_hits += 1;
                        self.cascade(element, None, parent_style, &hit.match_result, &[], None, PropertySelection::all())
                    }
                };
                self.scope.match_result_cache.set(
                    element,
                    inline.as_ref(),
                    Arc::new(unadjusted.clone()),
                    Arc::new(hit.match_result.clone()),
                    Arc::clone(parent_style),
                );
                return self.finish_element_style(element, unadjusted, &hit.match_result, &[], parent_style, existing);
            }
        }

        let mut match_result = {
            let ctx = self.matching_context();
            self.scope.stylist.match_element(&ctx, element, None, inline.as_ref())
        };
        let tactics: SmallVec<[TryTactic; 3]> = fallback.as_ref().map(|f| f.tactics.clone()).unwrap_or_default();
        if let Some(fallback) = &fallback {
            match_result = self.with_fallback(match_result, fallback);
        }
        let unadjusted =
            self.cascade(element, None, parent_style, &match_result, &tactics, None, PropertySelection::all());
        if cacheable {
            self.scope.match_result_cache.set(
                element,
                inline.as_ref(),
                Arc::new(unadjusted.clone()),
                Arc::new(match_result.clone()),
                Arc::clone(parent_style),
            );
        }
        if unadjusted.is_out_of_flow_positioned() && unadjusted.has_position_try_fallbacks() {
            self.prepare_position_options(element, parent_style, &unadjusted);
        }
        self.finish_element_style(element, unadjusted, &match_result, &tactics, parent_style, existing)
    }

    /// Adjust, then run animations with the previous (or starting) style
    fn finish_element_style(
        &mut self,
        element: NodeId,
        mut style: Style,
        match_result: &MatchResult,
        tactics: &[TryTactic],
        parent_style: &Arc<Style>,
        existing: Option<&Arc<Style>>,
    ) -> BuiltStyle {
        let is_document_element = Some(element) == self.document_element;
        let adjust_ctx = AdjustContext {
            parent: (!is_document_element).then_some(&**parent_style),
            is_document_element,
        };
        adjust(&mut style, adjust_ctx);

        let starting_style;
        let old = match existing {
            Some(existing) => Some(&**existing),
            None => {
                starting_style = self.starting_style(element, parent_style);
                starting_style.as_ref()
            }
        };
        let Some(animated) = self.animations.animate(element, None, old, &style) else {
            return BuiltStyle { style, base_style: None, recomposite: false };
        };
        let recomposite = animated.impact.contains(AnimationImpact::REQUIRES_RECOMPOSITE);
        let selection = PropertySelection::after_animation(animated.animated_properties);
        let mut animated_style =
            self.cascade(element, None, parent_style, match_result, tactics, Some(animated.style), selection);
        adjust(&mut animated_style, adjust_ctx);
        BuiltStyle { style: animated_style, base_style: Some(style), recomposite }
    }

    /// Before-change style from `@starting-style` rules
    fn starting_style(&mut self, element: NodeId, parent_style: &Style) -> Option<Style> {
        let result = {
            let ctx = self.matching_context();
            self.scope.stylist.match_starting_style(&ctx, element)?
        };
        let ctx = BuilderContext::new(parent_style)
            .with_root_font_size(self.root_font_size)
            .with_viewport(self.scope.config.viewport);
        let mut builder = Builder::new(ctx, None);
        builder.apply(&result, PropertySelection::normal());
        Some(builder.finish())
    }

    fn with_fallback(&self, base: MatchResult, fallback: &PositionTryFallback) -> MatchResult {
        let mut result = base;
        if let Some(name) = &fallback.rule_name {
            match self.scope.stylist.position_try_rule(name) {
                Some(block) => result = result.with_position_try(Arc::clone(block)),
                None => tracing::trace!(rule = %name, "unknown @position-try rule"),
            }
        }
        if let Some(area) = fallback.position_area {
            let block = DeclarationBlock::new().with(LonghandId::PositionArea, CssValue::PositionArea(area));
            result = result.with_position_try(Arc::new(block));
        }
        result
    }

    /// Create the fallback cursor once the box exists, sorted by the space
    /// each candidate would get when `position-try-order` asks for it
    fn prepare_position_options(&mut self, element: NodeId, parent_style: &Style, style: &Style) {
        if self.session.position_options.contains_key(&element) {
            return;
        }
        let anchors_ready = self
            .session
            .anchor_states
            .get(&AnchorKey::element(element))
            .is_none_or(|s| s.stage >= AnchorStage::Resolved);
        if !self.layout.has_box(element) || !anchors_ready {
            self.session.awaiting_options.insert(element);
            return;
        }
        self.session.awaiting_options.remove(&element);

        let fallbacks = style.rare().position_try_fallbacks.clone();
        let mut options = PositionOptions::new(fallbacks.clone());
        let axis = match style.rare().position_try_order {
            PositionTryOrder::Normal => None,
            PositionTryOrder::MostWidth => Some(PhysicalAxis::Horizontal),
            PositionTryOrder::MostHeight => Some(PhysicalAxis::Vertical),
            PositionTryOrder::MostBlockSize => Some(style.writing_mode().physical_axis(LogicalAxis::Block)),
            PositionTryOrder::MostInlineSize => Some(style.writing_mode().physical_axis(LogicalAxis::Inline)),
        };
        if let Some(axis) = axis {
            let inline = self.scope.elements.get(element).and_then(|d| d.inline_style.clone());
            let base = {
                let ctx = self.matching_context();
                self.scope.stylist.match_element(&ctx, element, None, inline.as_ref())
            };
            let mut sizes = Vec::with_capacity(fallbacks.len());
            for fallback in &fallbacks {
                let result = self.with_fallback(base.clone(), fallback);
                let candidate =
                    self.cascade(element, None, parent_style, &result, &fallback.tactics, None, PropertySelection::all());
                let available = self.layout.inset_modified_containing_block(element, &candidate);
                sizes.push(available.map_or(0.0, |rect| rect.extent(axis)));
            }
            options.sort_by_available_size(&sizes);
        }
        tracing::debug!(%element, count = options.options().len(), "position-try options");
        self.session.position_options.insert(element, options);
    }

    fn resolve_pseudo_styles(
        &mut self,
        element: NodeId,
        style: &Arc<Style>,
        first_line: Option<&FirstLineOrigin>,
    ) -> PseudoStyles {
        let matched = {
            let ctx = self.matching_context();
            self.scope.stylist.matched_pseudo_elements(&ctx, element)
        };
        let is_document_element = Some(element) == self.document_element;
        let in_top_layer = self.dom.element(element).is_some_and(|e| e.in_top_layer);
        let block_level = style.display().is_block_level();

        let mut pseudos = PseudoStyles::new();
        for pseudo in PseudoId::ALL {
            let wanted = match pseudo {
                PseudoId::Before | PseudoId::After => matched.contains(&pseudo),
                PseudoId::FirstLine | PseudoId::FirstLetter => block_level && matched.contains(&pseudo),
                PseudoId::Marker => style.display() == Display::ListItem,
                PseudoId::Backdrop => in_top_layer,
                PseudoId::ViewTransition => is_document_element && self.scope.view_transition_active,
            };
            if !wanted {
                continue;
            }
            if let Some(resolved) = self.resolve_pseudo(element, element, pseudo, style) {
                pseudos.push((pseudo, resolved));
            }
        }

        // First block-level child: the ancestor's ::first-line / ::first-letter.
        if let Some(origin) = first_line.filter(|_| block_level) {
            for &pseudo in &origin.pseudos {
                if pseudos.iter().any(|(p, _)| *p == pseudo) {
                    continue;
                }
                if let Some(resolved) = self.resolve_pseudo(element, origin.element, pseudo, style) {
                    pseudos.push((pseudo, resolved));
                }
            }
        }
        pseudos
    }

    /// Style `pseudo` of `element` using the pseudo rules of `rules_from`
    fn resolve_pseudo(
        &mut self,
        element: NodeId,
        rules_from: NodeId,
        pseudo: PseudoId,
        style: &Arc<Style>,
    ) -> Option<Arc<Style>> {
        let result = {
            let ctx = self.matching_context();
            self.scope.stylist.match_element(&ctx, rules_from, Some(pseudo), None)
        };
        let parent =
            if pseudo.inherits_from_originating_element() { Arc::clone(style) } else { Arc::clone(&self.initial) };
        let pseudo_style = self.cascade(element, Some(pseudo), &parent, &result, &[], None, PropertySelection::all());
        if matches!(pseudo, PseudoId::Before | PseudoId::After) && !pseudo_style.rare().content.generates_box() {
            return None;
        }
        Some(Arc::new(pseudo_style))
    }
}

fn fast_path_inherit_pseudos(old: &[(PseudoId, Arc<Style>)], style: &Style) -> PseudoStyles {
    old.iter()
        .map(|(pseudo, pseudo_style)| {
            if !pseudo.inherits_from_originating_element() || pseudo_style.disallows_fast_path_inheritance() {
                return (*pseudo, Arc::clone(pseudo_style));
            }
            let mut updated = (**pseudo_style).clone();
            updated.fast_path_inherit_from(style);
            (*pseudo, Arc::new(updated))
        })
        .collect()
}

/// Fold pseudo-element differences into the originating element's change
fn pseudo_change(old: &[(PseudoId, Arc<Style>)], new: &[(PseudoId, Arc<Style>)]) -> Change {
    fn find(list: &[(PseudoId, Arc<Style>)], pseudo: PseudoId) -> Option<&Arc<Style>> {
        list.iter().find(|(p, _)| *p == pseudo).map(|(_, s)| s)
    }
    let mut change = Change::empty();
    for pseudo in PseudoId::ALL {
        match (find(old, pseudo), find(new, pseudo)) {
            (None, None) => {}
            (Some(_), None) | (None, Some(_)) => change |= Change::RENDERER,
            (Some(a), Some(b)) => {
                let diff = compute_change(Some(a), b);
                if diff.contains(Change::RENDERER) {
                    change |= Change::RENDERER;
                } else if !diff.is_empty() {
                    change |= Change::NON_INHERITED;
                }
            }
        }
    }
    change
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_with_style(style: Style) -> ElementStyleData {
        ElementStyleData { style: Some(Arc::new(style)), ..Default::default() }
    }

    #[test]
    fn test_unstyled_elements_resolve_fully() {
        assert_eq!(
            determine_resolution_type(None, DescendantsToResolve::None, Change::empty()),
            Some(ResolutionType::Full)
        );
        let data = ElementStyleData::default();
        assert_eq!(
            determine_resolution_type(Some(&data), DescendantsToResolve::None, Change::empty()),
            Some(ResolutionType::Full)
        );
    }

    #[test]
    fn test_own_validity_first() {
        let mut data = data_with_style(Style::initial());
        assert_eq!(determine_resolution_type(Some(&data), DescendantsToResolve::None, Change::empty()), None);

        data.validity = Validity::InlineStyleInvalid;
        assert_eq!(
            determine_resolution_type(Some(&data), DescendantsToResolve::None, Change::empty()),
            Some(ResolutionType::FullWithMatchResultCache)
        );
        assert_eq!(
            determine_resolution_type(Some(&data), DescendantsToResolve::Children, Change::INHERITED),
            Some(ResolutionType::Full)
        );

        data.validity = Validity::AnimationInvalid;
        assert_eq!(
            determine_resolution_type(Some(&data), DescendantsToResolve::None, Change::empty()),
            Some(ResolutionType::Full)
        );
        data.base_style = Some(Arc::new(Style::initial()));
        assert_eq!(
            determine_resolution_type(Some(&data), DescendantsToResolve::None, Change::empty()),
            Some(ResolutionType::AnimationOnly)
        );
    }

    #[test]
    fn test_parent_requirements() {
        let plain = data_with_style(Style::initial());
        assert_eq!(
            determine_resolution_type(Some(&plain), DescendantsToResolve::Children, Change::FAST_PATH_INHERITED),
            Some(ResolutionType::FastPathInherit)
        );
        assert_eq!(
            determine_resolution_type(Some(&plain), DescendantsToResolve::Children, Change::INHERITED),
            Some(ResolutionType::Full)
        );
        assert_eq!(
            determine_resolution_type(Some(&plain), DescendantsToResolve::ChildrenWithExplicitInherit, Change::NON_INHERITED),
            None
        );
        assert_eq!(
            determine_resolution_type(Some(&plain), DescendantsToResolve::RebuildAllUsingExisting, Change::RENDERER),
            Some(ResolutionType::RebuildUsingExisting)
        );

        let mut inheriting = Style::initial();
        inheriting.set_flag(crate::style::StyleFlags::HAS_EXPLICITLY_INHERITED_PROPERTIES);
        let inheriting = data_with_style(inheriting);
        assert_eq!(
            determine_resolution_type(Some(&inheriting), DescendantsToResolve::ChildrenWithExplicitInherit, Change::NON_INHERITED),
            Some(ResolutionType::Full)
        );
        assert_eq!(
            determine_resolution_type(Some(&inheriting), DescendantsToResolve::Children, Change::FAST_PATH_INHERITED),
            Some(ResolutionType::Full)
        );
    }

    #[test]
    fn test_pseudo_change() {
        let style = Arc::new(Style::initial());
        let mut changed = Style::initial();
        changed.box_data_mut().width = crate::style::Dimension::Px(3.0);
        let before = [(PseudoId::Before, Arc::clone(&style))];
        assert_eq!(pseudo_change(&before, &before), Change::empty());
        assert_eq!(pseudo_change(&[], &before), Change::RENDERER);
        assert_eq!(pseudo_change(&before, &[(PseudoId::Before, Arc::new(changed))]), Change::NON_INHERITED);
    }
}
