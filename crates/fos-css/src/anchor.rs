//! Anchor Positioning
//!
//! Resolution stages for anchor-positioned elements, the anchor-name map
//! built from the latest layout, `anchor()` / `anchor-size()` evaluation and
//! the position-try fallback cursor.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::element_data::ElementDataMap;
use crate::layout_queries::LayoutQueries;
use crate::properties::LonghandId;
use crate::style::{PositionTryFallback, PseudoId};
use crate::values::{AnchorSide, Atom};
use fos_dom::{BoxSide, DomTree, NodeId, PhysicalAxis, Rect};

/// How far an anchor-positioned element has progressed in one update
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AnchorStage {
    /// Collecting referenced anchor names; anchor functions use fallbacks
    #[default]
    FindAnchors,
    /// Anchor map is current; waiting for both boxes to exist
    ResolveAnchorFunctions,
    /// Every anchor reference resolved against real geometry
    Resolved,
    /// An interleaved layout has placed the box with the resolved style
    Positioned,
}

/// Element or pseudo-element being anchor positioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorKey {
    pub element: NodeId,
    pub pseudo: Option<PseudoId>,
}

impl AnchorKey {
    pub fn element(element: NodeId) -> Self {
        Self { element, pseudo: None }
    }
}

/// Stage tracker for one anchor-positioned box
#[derive(Debug, Clone, Default)]
pub struct AnchorPositionedState {
    pub stage: AnchorStage,
    /// Every anchor name this box has referenced
    pub names: SmallVec<[Atom; 2]>,
    /// Set when a new name was discovered after `FindAnchors`
    pub rewound: bool,
    /// The last attempt to resolve anchor functions could query the
    /// positioned box's own geometry
    pub attempted_with_box: bool,
}

impl AnchorPositionedState {
    /// Record a referenced name. Returns true if it was not known before.
    pub fn note_name(&mut self, name: &Atom) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.push(Atom::clone(name));
        if self.stage > AnchorStage::FindAnchors {
            self.stage = AnchorStage::FindAnchors;
            self.rewound = true;
        }
        true
    }
}

/// A query from the cascade for anchor geometry
#[derive(Debug, Clone, Copy)]
pub enum AnchorQuery<'a> {
    /// `anchor()` in the inset property `property`
    Edge { name: &'a Atom, side: AnchorSide, property: LonghandId },
    /// `anchor-size()` measured along `axis`
    Size { name: &'a Atom, axis: PhysicalAxis },
}

impl AnchorQuery<'_> {
    pub fn name(&self) -> &Atom {
        match self {
            Self::Edge { name, .. } | Self::Size { name, .. } => name,
        }
    }
}

/// Answers anchor queries for the box currently being styled
pub trait AnchorEvaluator {
    /// Resolved pixel value, or `None` if the reference cannot be resolved yet
    fn evaluate(&mut self, query: AnchorQuery<'_>) -> Option<f32>;
}

/// Anchor name to candidate elements, in tree order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorMap {
    candidates: FxHashMap<Atom, SmallVec<[NodeId; 2]>>,
}

impl AnchorMap {
    /// Collect every element with a box that declares `anchor-name`
    pub fn build(dom: &DomTree, styles: &ElementDataMap, layout: &dyn LayoutQueries) -> Self {
        let mut candidates: FxHashMap<Atom, SmallVec<[NodeId; 2]>> = FxHashMap::default();
        for (node, _) in dom.composed_tree_descendants(dom.root()) {
            let Some(style) = styles.style(node) else { continue };
            if style.rare().anchor_names.is_empty() || !layout.has_box(node) {
                continue;
            }
            for name in &style.rare().anchor_names {
                candidates.entry(Atom::clone(name)).or_default().push(node);
            }
        }
        Self { candidates }
    }

    /// Anchor for `name` as seen from `positioned`: the last candidate in
    /// tree order that is neither `positioned` nor inside it
    pub fn lookup(&self, dom: &DomTree, name: &str, positioned: NodeId) -> Option<NodeId> {
        self.candidates
            .get(name)?
            .iter()
            .rev()
            .copied()
            .find(|candidate| !dom.is_inclusive_ancestor(positioned, *candidate))
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Evaluator bound to one box and the session's anchor state
pub struct ElementAnchorEvaluator<'a> {
    pub key: AnchorKey,
    pub states: &'a mut FxHashMap<AnchorKey, AnchorPositionedState>,
    pub map: &'a AnchorMap,
    pub dom: &'a DomTree,
    pub layout: &'a dyn LayoutQueries,
}

impl AnchorEvaluator for ElementAnchorEvaluator<'_> {
    fn evaluate(&mut self, query: AnchorQuery<'_>) -> Option<f32> {
        let state = self.states.entry(self.key).or_default();
        state.note_name(query.name());
        if state.stage == AnchorStage::FindAnchors {
            return None;
        }
        // Layout only creates boxes for elements.
        if self.key.pseudo.is_some() {
            return None;
        }
        let anchor = self.map.lookup(self.dom, query.name(), self.key.element)?;
        let anchor_box = self.layout.border_box(anchor)?;
        match query {
            AnchorQuery::Edge { side, property, .. } => {
                let containing_block = self.layout.containing_block(self.key.element)?;
                edge_distance(side, property, &anchor_box, &containing_block)
            }
            AnchorQuery::Size { axis, .. } => Some(anchor_box.extent(axis)),
        }
    }
}

fn inset_side(property: LonghandId) -> Option<BoxSide> {
    match property {
        LonghandId::Top => Some(BoxSide::Top),
        LonghandId::Right => Some(BoxSide::Right),
        LonghandId::Bottom => Some(BoxSide::Bottom),
        LonghandId::Left => Some(BoxSide::Left),
        _ => None,
    }
}

/// Inset value placing the `property` edge at the anchor's `side`
pub fn edge_distance(side: AnchorSide, property: LonghandId, anchor: &Rect, containing_block: &Rect) -> Option<f32> {
    let inset = inset_side(property)?;
    let axis = inset.axis();
    let start = anchor.start(axis);
    let extent = anchor.extent(axis);
    let coordinate = match (side, axis) {
        (AnchorSide::Top, PhysicalAxis::Vertical) | (AnchorSide::Left, PhysicalAxis::Horizontal) => start,
        (AnchorSide::Bottom, PhysicalAxis::Vertical) | (AnchorSide::Right, PhysicalAxis::Horizontal) => start + extent,
        (AnchorSide::Start, _) => start,
        (AnchorSide::End, _) => start + extent,
        (AnchorSide::Center, _) => start + extent / 2.0,
        (AnchorSide::Percent(p), _) => start + extent * p,
        // Side on the wrong axis for this property
        _ => return None,
    };
    Some(if inset.is_start() {
        coordinate - containing_block.start(axis)
    } else {
        containing_block.end(axis) - coordinate
    })
}

/// Position-try fallback cursor for one element.
///
/// The original style is tried first; each overflow advances to the next
/// fallback, and when all of them overflowed the original is used again.
#[derive(Debug, Clone)]
pub struct PositionOptions {
    options: Vec<PositionTryFallback>,
    index: Option<usize>,
    chosen: bool,
    attempts: usize,
}

impl PositionOptions {
    pub fn new(options: Vec<PositionTryFallback>) -> Self {
        Self { options, index: None, chosen: false, attempts: 1 }
    }

    /// Stable sort, largest available size first
    pub fn sort_by_available_size(&mut self, sizes: &[f32]) {
        let mut keyed: Vec<(f32, PositionTryFallback)> =
            sizes.iter().copied().zip(std::mem::take(&mut self.options)).collect();
        keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
        self.options = keyed.into_iter().map(|(_, option)| option).collect();
    }

    pub fn options(&self) -> &[PositionTryFallback] {
        &self.options
    }

    /// Fallback currently applied, `None` for the original style
    pub fn current(&self) -> Option<&PositionTryFallback> {
        self.index.and_then(|i| self.options.get(i))
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_chosen(&self) -> bool {
        self.chosen
    }

    /// Distinct styles tried so far, including the original
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn mark_chosen(&mut self) {
        self.chosen = true;
    }

    /// Move past an overflowing style. Returns true when the element must be
    /// restyled with the new selection.
    pub fn advance(&mut self) -> bool {
        if self.chosen {
            return false;
        }
        let next = self.index.map_or(0, |i| i + 1);
        if next < self.options.len() {
            self.index = Some(next);
            self.attempts += 1;
        } else {
            self.index = None;
            self.chosen = true;
        }
        true
    }
}
