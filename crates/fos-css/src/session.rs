//! Resolution Session
//!
//! State for one document update, which may span several interleaved
//! "resolve, lay out, resolve again" passes: anchor stages, position-try
//! cursors, descendant work deferred until layout has run, and statistics.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::anchor::{AnchorKey, AnchorMap, AnchorPositionedState, AnchorStage, PositionOptions};
use crate::change::{Change, DescendantsToResolve};
use crate::element_data::Validity;
use crate::layout_queries::LayoutQueries;
use crate::scope::StyleScope;
use crate::style::{PositionVisibility, Visibility};
use fos_dom::{DomTree, NodeId};

/// Descendant resolution saved while waiting for layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeferredWork {
    pub change: Change,
    pub descendants: DescendantsToResolve,
}

impl DeferredWork {
    fn merge(&mut self, other: DeferredWork) {
        self.change |= other.change;
        self.descendants = self.descendants.max(other.descendants);
    }
}

/// Counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub passes: usize,
    pub elements_resolved: usize,
    pub fast_path_inherits: usize,
    pub cache_partial_hits: usize,
    pub cache_full_hits: usize,
    pub cache_misses: usize,
}

/// One anchor stage change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTransition {
    pub key: AnchorKey,
    pub from: AnchorStage,
    pub to: AnchorStage,
}

/// Cross-pass state for one document update
#[derive(Debug, Default)]
pub struct ResolutionSession {
    pub(crate) anchor_states: FxHashMap<AnchorKey, AnchorPositionedState>,
    pub(crate) anchor_map: AnchorMap,
    pub(crate) position_options: FxHashMap<NodeId, PositionOptions>,
    /// Positioned elements with fallbacks that had no box when resolved
    pub(crate) awaiting_options: FxHashSet<NodeId>,
    pub(crate) deferred: FxHashMap<NodeId, DeferredWork>,
    pub(crate) containers_laid_out: FxHashSet<NodeId>,
    /// `position-visibility` verdicts from the latest layout
    pub(crate) force_hidden: FxHashMap<NodeId, bool>,
    pub(crate) stats: ResolverStats,
    transitions: Vec<StageTransition>,
}

impl ResolutionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor_state(&self, key: AnchorKey) -> Option<&AnchorPositionedState> {
        self.anchor_states.get(&key)
    }

    pub fn position_options(&self, element: NodeId) -> Option<&PositionOptions> {
        self.position_options.get(&element)
    }

    pub fn anchor_map(&self) -> &AnchorMap {
        &self.anchor_map
    }

    pub fn stats(&self) -> &ResolverStats {
        &self.stats
    }

    /// Every anchor stage change so far, in order
    pub fn transitions(&self) -> &[StageTransition] {
        &self.transitions
    }

    /// Whether the latest layout hid `element` through `position-visibility`
    pub fn is_force_hidden(&self, element: NodeId) -> Option<bool> {
        self.force_hidden.get(&element).copied()
    }

    pub fn has_deferred_work(&self) -> bool {
        !self.deferred.is_empty()
    }

    pub(crate) fn defer(&mut self, element: NodeId, work: DeferredWork) {
        self.deferred.entry(element).or_default().merge(work);
    }

    pub(crate) fn take_deferred(&mut self, element: NodeId) -> Option<DeferredWork> {
        self.deferred.remove(&element)
    }

    pub(crate) fn record_transition(&mut self, key: AnchorKey, from: AnchorStage, to: AnchorStage) {
        if from == to {
            return;
        }
        tracing::trace!(element = %key.element, pseudo = ?key.pseudo, ?from, ?to, "anchor stage");
        self.transitions.push(StageTransition { key, from, to });
    }

    fn set_stage(&mut self, key: AnchorKey, stage: AnchorStage) {
        let Some(state) = self.anchor_states.get_mut(&key) else { return };
        let from = state.stage;
        state.stage = stage;
        self.record_transition(key, from, stage);
    }

    /// Advance layout-gated state after an interleaved layout. Returns true
    /// when another resolution pass is needed.
    pub fn after_interleaved_layout(&mut self, dom: &DomTree, scope: &mut StyleScope, layout: &dyn LayoutQueries) -> bool {
        let mut needs_pass = false;

        let map = AnchorMap::build(dom, &scope.elements, layout);
        let map_changed = map != self.anchor_map;
        self.anchor_map = map;

        let mut keys: Vec<AnchorKey> = self.anchor_states.keys().copied().collect();
        keys.sort_unstable();
        for key in keys {
            let Some(state) = self.anchor_states.get(&key) else { continue };
            let (stage, attempted_with_box) = (state.stage, state.attempted_with_box);
            let restyle = match stage {
                AnchorStage::FindAnchors => {
                    self.set_stage(key, AnchorStage::ResolveAnchorFunctions);
                    true
                }
                AnchorStage::ResolveAnchorFunctions => {
                    map_changed || (!attempted_with_box && layout.has_box(key.element))
                }
                AnchorStage::Resolved => {
                    if layout.has_box(key.element) {
                        self.set_stage(key, AnchorStage::Positioned);
                    }
                    false
                }
                AnchorStage::Positioned => false,
            };
            if restyle {
                scope.invalidate(dom, key.element, Validity::ElementInvalid);
                needs_pass = true;
            }
        }

        needs_pass |= self.advance_position_options(dom, scope, layout);
        needs_pass |= self.update_position_visibility(dom, scope, layout);

        if scope.stylist.has_container_queries() {
            self.track_query_containers(scope, layout);
        }
        let mut resumable: Vec<NodeId> = self.deferred.keys().copied().collect();
        resumable.sort_unstable();
        for element in resumable {
            self.containers_laid_out.insert(element);
            scope.mark_for_descendant_resolution(dom, element);
            needs_pass = true;
        }

        tracing::debug!(needs_pass, map_changed, deferred = self.deferred.len(), "after interleaved layout");
        needs_pass
    }

    fn advance_position_options(&mut self, dom: &DomTree, scope: &mut StyleScope, layout: &dyn LayoutQueries) -> bool {
        let mut needs_pass = false;
        let ready = |states: &FxHashMap<AnchorKey, AnchorPositionedState>, element: NodeId, stage: AnchorStage| {
            states.get(&AnchorKey::element(element)).is_none_or(|s| s.stage >= stage)
        };

        let mut awaiting: Vec<NodeId> = self
            .awaiting_options
            .iter()
            .copied()
            .filter(|e| layout.has_box(*e) && ready(&self.anchor_states, *e, AnchorStage::Resolved))
            .collect();
        awaiting.sort_unstable();
        for element in awaiting {
            scope.invalidate(dom, element, Validity::ElementInvalid);
            needs_pass = true;
        }

        let mut elements: Vec<NodeId> = self.position_options.keys().copied().collect();
        elements.sort_unstable();
        for element in elements {
            if !layout.has_box(element) || !ready(&self.anchor_states, element, AnchorStage::Positioned) {
                continue;
            }
            let Some(options) = self.position_options.get_mut(&element) else { continue };
            if options.is_chosen() {
                continue;
            }
            if layout.overflows_inset_modified_containing_block(element) {
                if options.advance() {
                    tracing::debug!(%element, index = ?options.index(), "position-try fallback");
                    scope.invalidate(dom, element, Validity::ElementInvalid);
                    needs_pass = true;
                }
            } else {
                options.mark_chosen();
            }
        }
        needs_pass
    }

    /// Hide or reveal positioned boxes per `position-visibility`, once their
    /// anchors and fallbacks have settled
    fn update_position_visibility(&mut self, dom: &DomTree, scope: &mut StyleScope, layout: &dyn LayoutQueries) -> bool {
        let mut changed: Vec<(NodeId, bool)> = Vec::new();
        for (element, data) in scope.elements.iter() {
            let Some(style) = data.style.as_deref() else { continue };
            if !style.is_out_of_flow_positioned() || !layout.has_box(element) {
                continue;
            }
            let anchor_settled = self
                .anchor_states
                .get(&AnchorKey::element(element))
                .is_none_or(|s| s.stage == AnchorStage::Positioned);
            let options_settled = self.position_options.get(&element).is_none_or(PositionOptions::is_chosen)
                && !self.awaiting_options.contains(&element);
            if !anchor_settled || !options_settled {
                continue;
            }

            let visibility = style.rare().position_visibility;
            let anchor_hidden = visibility.contains(PositionVisibility::ANCHORS_VISIBLE)
                && style
                    .rare()
                    .position_anchor
                    .as_ref()
                    .and_then(|name| self.anchor_map.lookup(dom, name, element))
                    .and_then(|anchor| scope.elements.style(anchor))
                    .is_some_and(|anchor| anchor.used_visibility() != Visibility::Visible);
            let overflow_hidden = visibility.contains(PositionVisibility::NO_OVERFLOW)
                && layout.overflows_inset_modified_containing_block(element);
            let hide = anchor_hidden || overflow_hidden;

            self.force_hidden.insert(element, hide);
            if hide != style.is_force_hidden() {
                changed.push((element, hide));
            }
        }
        changed.sort_unstable();
        for &(element, hide) in &changed {
            tracing::debug!(%element, hide, "position-visibility");
            scope.invalidate(dom, element, Validity::ElementInvalid);
        }
        !changed.is_empty()
    }

    fn track_query_containers(&mut self, scope: &mut StyleScope, layout: &dyn LayoutQueries) {
        let mut containers: Vec<NodeId> = scope
            .elements
            .iter()
            .filter(|(_, data)| data.style.as_ref().is_some_and(|s| s.is_query_container()))
            .map(|(node, _)| node)
            .collect();
        containers.sort_unstable();
        for container in containers {
            let Some(size) = layout.content_size(container) else { continue };
            let previous = scope.query_container_sizes.insert(container, size);
            self.containers_laid_out.insert(container);
            if previous.is_some_and(|p| p != size) {
                tracing::trace!(%container, ?size, "query container resized");
                self.defer(container, DeferredWork { change: Change::empty(), descendants: DescendantsToResolve::All });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deferred_work_merges() {
        let mut session = ResolutionSession::new();
        let element = NodeId::ROOT;
        session.defer(element, DeferredWork { change: Change::INHERITED, descendants: DescendantsToResolve::Children });
        session.defer(element, DeferredWork { change: Change::CONTAINER, descendants: DescendantsToResolve::ChildrenWithExplicitInherit });
        let work = session.take_deferred(element).unwrap();
        assert_eq!(work.change, Change::INHERITED | Change::CONTAINER);
        assert_eq!(work.descendants, DescendantsToResolve::Children);
        assert!(!session.has_deferred_work());
    }

    #[test]
    fn test_transitions_skip_no_ops() {
        let mut session = ResolutionSession::new();
        let key = AnchorKey::element(NodeId::ROOT);
        session.anchor_states.insert(key, AnchorPositionedState::default());
        session.set_stage(key, AnchorStage::ResolveAnchorFunctions);
        session.set_stage(key, AnchorStage::ResolveAnchorFunctions);
        assert_eq!(session.transitions().len(), 1);
        assert_eq!(session.anchor_state(key).unwrap().stage, AnchorStage::ResolveAnchorFunctions);
    }
}
