//! Layout Tree
//!
//! Boxes are rebuilt from the composed tree and the latest styles on every
//! layout. In-flow boxes are laid out first in block flow; out-of-flow boxes
//! follow in tree order, so their anchors and containing blocks are already
//! placed when they are positioned.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::box_model::{BoxDimensions, EdgeSizes};
use crate::positioned::{ContainingBlock, GridTracks, PositionedLayoutConstraints};
use fos_css::{Atom, Display, LayoutQueries, Position, PseudoId, Style, Update};
use fos_dom::{DomTree, NodeId, PhysicalAxis, Rect, Size};

/// Average glyph advance as a fraction of the font size
const CHAR_WIDTH_FACTOR: f32 = 0.5;

/// What kind of box this is
#[derive(Debug, Clone, PartialEq)]
pub enum BoxKind {
    /// Initial containing block
    Viewport,
    Block,
    /// Inline-level box; stacked like a block but shrink-wrapped
    Inline,
    Grid(GridTracks),
    /// Run of text laid out on a single line
    Text { chars: usize },
}

/// A box in the layout tree
#[derive(Debug)]
pub struct LayoutBox {
    /// Element (or text node) that generated the box
    pub node: Option<NodeId>,
    /// Set for `::before` / `::after` content
    pub pseudo: Option<PseudoId>,
    pub kind: BoxKind,
    pub style: Arc<Style>,
    pub dimensions: BoxDimensions,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Where an out-of-flow box would have started in flow
    pub static_position: (f32, f32),
    /// Containing block of an out-of-flow box
    pub containing_block: Option<ContainingBlock>,
    pub inset_modified_containing_block: Option<Rect>,
    pub overflows: bool,
    laid_out: bool,
}

impl LayoutBox {
    fn new(node: Option<NodeId>, kind: BoxKind, style: Arc<Style>, parent: Option<usize>) -> Self {
        Self {
            node,
            pseudo: None,
            kind,
            style,
            dimensions: BoxDimensions::default(),
            parent,
            children: Vec::new(),
            static_position: (0.0, 0.0),
            containing_block: None,
            inset_modified_containing_block: None,
            overflows: false,
            laid_out: false,
        }
    }

    pub fn is_out_of_flow(&self) -> bool {
        self.style.is_out_of_flow_positioned() && self.kind != BoxKind::Viewport
    }

    pub fn border_box(&self) -> Rect {
        self.dimensions.border_box()
    }
}

/// Open box during the build walk
struct BuildFrame {
    depth: usize,
    index: usize,
    after: Option<Arc<Style>>,
}

/// Layout tree
#[derive(Debug, Default)]
pub struct LayoutTree {
    boxes: Vec<LayoutBox>,
    node_boxes: FxHashMap<NodeId, usize>,
    styles: FxHashMap<NodeId, Arc<Style>>,
    pseudo_styles: FxHashMap<NodeId, SmallVec<[(PseudoId, Arc<Style>); 2]>>,
    text_styles: FxHashMap<NodeId, Arc<Style>>,
    /// Boxes declaring each anchor name, in tree order
    anchors: FxHashMap<Atom, SmallVec<[usize; 2]>>,
    viewport: Size,
    dirty: bool,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self { dirty: true, ..Self::default() }
    }

    /// Take the styles of one resolution pass
    pub fn apply(&mut self, update: &Update) {
        let mut rebuilt = 0usize;
        for (element, element_update) in update.elements() {
            if element_update.change.contains(fos_css::Change::RENDERER) {
                rebuilt += 1;
            }
            if element_update.style.display() == Display::None {
                self.styles.remove(&element);
                self.pseudo_styles.remove(&element);
                continue;
            }
            self.styles.insert(element, Arc::clone(&element_update.style));
            if element_update.pseudo_styles.is_empty() {
                self.pseudo_styles.remove(&element);
            } else {
                self.pseudo_styles.insert(element, element_update.pseudo_styles.clone());
            }
        }
        for (text, text_update) in update.texts() {
            match &text_update.inherited_display_contents_style {
                Some(style) => self.text_styles.insert(text, Arc::clone(style)),
                None => self.text_styles.remove(&text),
            };
        }
        if !update.is_empty() {
            self.dirty = true;
        }
        tracing::trace!(elements = update.len(), rebuilt, "applied style update");
    }

    /// Drop everything known about `root` and its composed descendants
    pub fn forget_subtree(&mut self, dom: &DomTree, root: NodeId) {
        let subtree = std::iter::once(root).chain(dom.composed_tree_descendants(root).map(|(node, _)| node));
        for node in subtree {
            self.styles.remove(&node);
            self.pseudo_styles.remove(&node);
            self.text_styles.remove(&node);
        }
        self.dirty = true;
    }

    pub fn boxes(&self) -> &[LayoutBox] {
        &self.boxes
    }

    pub fn box_for(&self, element: NodeId) -> Option<&LayoutBox> {
        self.node_boxes.get(&element).map(|&index| &self.boxes[index])
    }

    /// Force the next `layout` call to rebuild, e.g. after a text edit
    pub fn set_needs_layout(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the boxes and lay them out in a viewport of `viewport`
    pub fn layout(&mut self, dom: &DomTree, viewport: Size) {
        if !self.dirty && self.viewport == viewport {
            tracing::trace!("layout is clean");
            return;
        }
        self.viewport = viewport;
        self.build(dom);

        let mut out_of_flow = Vec::new();
        let root_children = self.boxes[0].children.clone();
        let mut cursor = 0.0;
        for child in root_children {
            cursor += self.layout_flow_child(child, 0.0, cursor, viewport.width, Some(viewport.height), &mut out_of_flow);
        }
        self.boxes[0].laid_out = true;

        // Positioning a box may reveal further out-of-flow descendants.
        let mut next = 0;
        while next < out_of_flow.len() {
            let index = out_of_flow[next];
            self.layout_out_of_flow(index, &mut out_of_flow);
            next += 1;
        }
        self.dirty = false;
        tracing::debug!(boxes = self.boxes.len(), out_of_flow = out_of_flow.len(), "layout");
    }

    fn build(&mut self, dom: &DomTree) {
        self.boxes.clear();
        self.node_boxes.clear();
        self.anchors.clear();
        let mut viewport = LayoutBox::new(None, BoxKind::Viewport, Arc::new(Style::initial()), None);
        viewport.dimensions.content = Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height);
        self.boxes.push(viewport);

        let mut stack = vec![BuildFrame { depth: 0, index: 0, after: None }];
        let mut walker = dom.composed_tree_descendants(dom.root());
        while let Some((node, depth)) = walker.next() {
            while stack.last().is_some_and(|frame| frame.depth >= depth) {
                self.close_frame(&mut stack);
            }
            let parent = stack.last().map_or(0, |frame| frame.index);

            let Some(dom_node) = dom.get(node) else { continue };
            if let Some(text) = dom_node.as_text() {
                let style = match self.text_styles.get(&node) {
                    Some(style) => Arc::clone(style),
                    None => Arc::clone(&self.boxes[parent].style),
                };
                self.push_box(Some(node), BoxKind::Text { chars: text.chars().count() }, style, parent);
                continue;
            }
            let style = match self.styles.get(&node) {
                Some(style) if dom_node.is_element() && style.display() != Display::None => Arc::clone(style),
                _ => {
                    walker.skip_children();
                    continue;
                }
            };
            if style.display() == Display::Contents {
                stack.push(BuildFrame { depth, index: parent, after: None });
                continue;
            }

            let kind = match style.display() {
                Display::Grid => BoxKind::Grid(GridTracks::from_style(&style)),
                Display::Inline | Display::InlineBlock => BoxKind::Inline,
                _ => BoxKind::Block,
            };
            let index = self.push_box(Some(node), kind, Arc::clone(&style), parent);
            self.node_boxes.insert(node, index);
            for name in &style.rare().anchor_names {
                self.anchors.entry(Atom::clone(name)).or_default().push(index);
            }

            let pseudo = |which: PseudoId| {
                self.pseudo_styles
                    .get(&node)
                    .and_then(|list| list.iter().find(|(p, _)| *p == which))
                    .map(|(_, s)| Arc::clone(s))
            };
            let before = pseudo(PseudoId::Before);
            let after = pseudo(PseudoId::After);
            if let Some(before) = before {
                self.push_generated(index, PseudoId::Before, before);
            }
            stack.push(BuildFrame { depth, index, after });
        }
        while stack.len() > 1 {
            self.close_frame(&mut stack);
        }
    }

    fn close_frame(&mut self, stack: &mut Vec<BuildFrame>) {
        if let Some(BuildFrame { index, after: Some(after), .. }) = stack.pop() {
            self.push_generated(index, PseudoId::After, after);
        }
    }

    fn push_box(&mut self, node: Option<NodeId>, kind: BoxKind, style: Arc<Style>, parent: usize) -> usize {
        let index = self.boxes.len();
        self.boxes.push(LayoutBox::new(node, kind, style, Some(parent)));
        self.boxes[parent].children.push(index);
        index
    }

    fn push_generated(&mut self, parent: usize, pseudo: PseudoId, style: Arc<Style>) {
        let chars = match &style.rare().content {
            fos_css::Content::Text(text) => text.chars().count(),
            _ => return,
        };
        let node = self.boxes[parent].node;
        let index = self.push_box(node, BoxKind::Text { chars }, style, parent);
        self.boxes[index].pseudo = Some(pseudo);
    }

    /// Lay out an in-flow child at (`x`, `y`) in a containing block of
    /// `containing_width`. Returns the height of its margin box.
    fn layout_flow_child(
        &mut self,
        index: usize,
        x: f32,
        y: f32,
        containing_width: f32,
        containing_height: Option<f32>,
        out_of_flow: &mut Vec<usize>,
    ) -> f32 {
        if self.boxes[index].is_out_of_flow() {
            self.boxes[index].static_position = (x, y);
            out_of_flow.push(index);
            return 0.0;
        }
        if let BoxKind::Text { chars } = self.boxes[index].kind {
            let style = &self.boxes[index].style;
            let width = (chars as f32 * style.font_size() * CHAR_WIDTH_FACTOR).min(containing_width);
            let height = style.used_line_height();
            let dims = &mut self.boxes[index].dimensions;
            *dims = BoxDimensions::default();
            dims.content = Rect::new(x, y, width, height);
            self.boxes[index].laid_out = true;
            return height;
        }

        let style = Arc::clone(&self.boxes[index].style);
        let mut dims = BoxDimensions::from_style(&style, containing_width);
        dims.margin = EdgeSizes::resolve(&style.surround().margin, containing_width);
        let frame_width = dims.frame(PhysicalAxis::Horizontal);

        let box_data = style.box_data();
        let specified_width = box_data.width.resolve(Some(containing_width));
        let available = (containing_width - dims.margin.sum(PhysicalAxis::Horizontal) - frame_width).max(0.0);
        let mut width = match specified_width {
            Some(width) => width,
            None if self.boxes[index].kind == BoxKind::Inline => (self.intrinsic_width(index) - frame_width).min(available),
            None => available,
        };
        if let Some(max) = box_data.max_width.resolve(Some(containing_width)) {
            width = width.min(max);
        }
        width = width.max(box_data.min_width.resolve(Some(containing_width)).unwrap_or(0.0)).max(0.0);

        // Auto horizontal margins center a box with a definite width.
        let surround = style.surround();
        if specified_width.is_some() {
            let free = containing_width - width - frame_width;
            match (surround.margin.left.is_auto(), surround.margin.right.is_auto()) {
                (true, true) => {
                    dims.margin.left = (free / 2.0).max(0.0);
                    dims.margin.right = dims.margin.left;
                }
                (true, false) => dims.margin.left = (free - dims.margin.right).max(0.0),
                _ => {}
            }
        }

        let content_x = x + dims.margin.left + dims.border.left + dims.padding.left;
        let content_y = y + dims.margin.top + dims.border.top + dims.padding.top;
        let specified_height = box_data.height.resolve(containing_height);
        let content_height = self.layout_children(index, content_x, content_y, width, specified_height, out_of_flow);
        let mut height = match specified_height {
            Some(height) => height,
            // Size containment: an auto block size ignores the contents
            None if style.rare().container_type == fos_css::ContainerType::Size => 0.0,
            None => content_height,
        };
        if let Some(max) = box_data.max_height.resolve(containing_height) {
            height = height.min(max);
        }
        height = height.max(box_data.min_height.resolve(containing_height).unwrap_or(0.0));

        dims.content = Rect::new(content_x, content_y, width, height);
        let margin_height = dims.margin_box().height;
        let layout_box = &mut self.boxes[index];
        layout_box.dimensions = dims;
        layout_box.laid_out = true;
        margin_height
    }

    /// Stack the in-flow children; returns the content height they use
    fn layout_children(
        &mut self,
        index: usize,
        content_x: f32,
        content_y: f32,
        width: f32,
        height: Option<f32>,
        out_of_flow: &mut Vec<usize>,
    ) -> f32 {
        let children = self.boxes[index].children.clone();
        let mut cursor = content_y;
        for child in children {
            cursor += self.layout_flow_child(child, content_x, cursor, width, height, out_of_flow);
        }
        cursor - content_y
    }

    /// Max-content border-box width
    fn intrinsic_width(&self, index: usize) -> f32 {
        let layout_box = &self.boxes[index];
        let style = &layout_box.style;
        if let BoxKind::Text { chars } = layout_box.kind {
            return chars as f32 * style.font_size() * CHAR_WIDTH_FACTOR;
        }
        let frame = BoxDimensions::from_style(style, 0.0).frame(PhysicalAxis::Horizontal);
        if let Some(width) = style.box_data().width.resolve(None) {
            return width + frame;
        }
        let content = layout_box
            .children
            .iter()
            .filter(|&&child| !self.boxes[child].is_out_of_flow())
            .map(|&child| {
                let margins = EdgeSizes::resolve(&self.boxes[child].style.surround().margin, 0.0);
                self.intrinsic_width(child) + margins.sum(PhysicalAxis::Horizontal)
            })
            .fold(0.0, f32::max);
        content + frame
    }

    fn containing_block_for(&self, index: usize) -> ContainingBlock {
        let fixed = self.boxes[index].style.position() == Position::Fixed;
        let mut current = self.boxes[index].parent;
        while let Some(ancestor) = current {
            let candidate = &self.boxes[ancestor];
            if candidate.kind == BoxKind::Viewport {
                break;
            }
            if !fixed && candidate.style.position().is_positioned() {
                let grid = match &candidate.kind {
                    BoxKind::Grid(tracks) => Some(tracks.clone()),
                    _ => None,
                };
                return ContainingBlock::from_style(candidate.dimensions.padding_box(), &candidate.style, grid);
            }
            current = candidate.parent;
        }
        ContainingBlock::new(Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height))
    }

    fn is_box_inside(&self, index: usize, ancestor: usize) -> bool {
        let mut current = Some(index);
        while let Some(i) = current {
            if i == ancestor {
                return true;
            }
            current = self.boxes[i].parent;
        }
        false
    }

    /// Border box of the last laid-out box named `name` that is not inside
    /// the box at `positioned`
    fn anchor_box(&self, name: &str, positioned: usize) -> Option<Rect> {
        self.anchors
            .get(name)?
            .iter()
            .rev()
            .copied()
            .find(|&candidate| self.boxes[candidate].laid_out && !self.is_box_inside(candidate, positioned))
            .map(|candidate| self.boxes[candidate].border_box())
    }

    fn default_anchor(&self, style: &Style, positioned: usize) -> Option<Rect> {
        let name = style.rare().position_anchor.as_ref()?;
        self.anchor_box(name, positioned)
    }

    fn constraints(
        &self,
        index: usize,
        style: &Style,
        containing_block: &ContainingBlock,
    ) -> (PositionedLayoutConstraints, PositionedLayoutConstraints) {
        let anchor = self.default_anchor(style, index);
        let dims = BoxDimensions::from_style(style, containing_block.rect.width);
        let (static_x, static_y) = self.boxes[index].static_position;
        let horizontal = PositionedLayoutConstraints::new(
            style,
            containing_block,
            anchor,
            static_x,
            dims.frame(PhysicalAxis::Horizontal),
            PhysicalAxis::Horizontal,
        );
        let vertical = PositionedLayoutConstraints::new(
            style,
            containing_block,
            anchor,
            static_y,
            dims.frame(PhysicalAxis::Vertical),
            PhysicalAxis::Vertical,
        );
        (horizontal, vertical)
    }

    fn layout_out_of_flow(&mut self, index: usize, out_of_flow: &mut Vec<usize>) {
        let style = Arc::clone(&self.boxes[index].style);
        let containing_block = self.containing_block_for(index);
        let (horizontal, vertical) = self.constraints(index, &style, &containing_block);

        let mut dims = BoxDimensions::from_style(&style, containing_block.rect.width);
        let width = horizontal.resolve_size(self.intrinsic_width(index));
        let content_width = (width - dims.frame(PhysicalAxis::Horizontal)).max(0.0);

        // Lay the contents out at the origin, then move them into place.
        let first_pending = out_of_flow.len();
        let content_height = self.layout_children(index, 0.0, 0.0, content_width, None, out_of_flow);
        let height = vertical.resolve_size(content_height + dims.frame(PhysicalAxis::Vertical));

        let x = horizontal.resolve_position(width);
        let y = vertical.resolve_position(height);
        dims.margin = EdgeSizes { top: y.margin_start, right: x.margin_end, bottom: y.margin_end, left: x.margin_start };
        dims.content = Rect::new(
            x.start + dims.border.left + dims.padding.left,
            y.start + dims.border.top + dims.padding.top,
            content_width,
            (height - dims.frame(PhysicalAxis::Vertical)).max(0.0),
        );
        let (dx, dy) = (dims.content.x, dims.content.y);
        let children = self.boxes[index].children.clone();
        for child in children {
            self.translate_subtree(child, dx, dy);
        }
        for &pending in &out_of_flow[first_pending..] {
            let (sx, sy) = self.boxes[pending].static_position;
            self.boxes[pending].static_position = (sx + dx, sy + dy);
        }

        let overflows = horizontal.overflows(&x) || vertical.overflows(&y);
        let imcb = imcb_rect(&horizontal, &vertical);
        if overflows {
            tracing::trace!(node = ?self.boxes[index].node, ?imcb, "positioned box overflows");
        }
        let layout_box = &mut self.boxes[index];
        layout_box.dimensions = dims;
        layout_box.containing_block = Some(containing_block);
        layout_box.inset_modified_containing_block = Some(imcb);
        layout_box.overflows = overflows;
        layout_box.laid_out = true;
    }

    fn translate_subtree(&mut self, index: usize, dx: f32, dy: f32) {
        if self.boxes[index].is_out_of_flow() {
            return;
        }
        self.boxes[index].dimensions.translate(dx, dy);
        let children = self.boxes[index].children.clone();
        for child in children {
            self.translate_subtree(child, dx, dy);
        }
    }
}

fn imcb_rect(horizontal: &PositionedLayoutConstraints, vertical: &PositionedLayoutConstraints) -> Rect {
    let (left, right) = horizontal.inset_modified_containing_range();
    let (top, bottom) = vertical.inset_modified_containing_range();
    Rect::new(left, top, right - left, bottom - top)
}

impl LayoutQueries for LayoutTree {
    fn has_box(&self, element: NodeId) -> bool {
        self.node_boxes.contains_key(&element)
    }

    fn border_box(&self, element: NodeId) -> Option<Rect> {
        self.box_for(element).filter(|b| b.laid_out).map(LayoutBox::border_box)
    }

    fn containing_block(&self, element: NodeId) -> Option<Rect> {
        let layout_box = self.box_for(element)?;
        if let Some(containing_block) = &layout_box.containing_block {
            return Some(containing_block.rect);
        }
        let parent = &self.boxes[layout_box.parent?];
        Some(parent.dimensions.content)
    }

    fn content_size(&self, element: NodeId) -> Option<Size> {
        self.box_for(element).filter(|b| b.laid_out).map(|b| b.dimensions.content.size())
    }

    fn overflows_inset_modified_containing_block(&self, element: NodeId) -> bool {
        self.box_for(element).is_some_and(|b| b.overflows)
    }

    fn inset_modified_containing_block(&self, element: NodeId, style: &Style) -> Option<Rect> {
        let index = *self.node_boxes.get(&element)?;
        let containing_block = self.boxes[index].containing_block.as_ref()?;
        let (horizontal, vertical) = self.constraints(index, style, containing_block);
        Some(imcb_rect(&horizontal, &vertical))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_css::{Change, Dimension, ElementUpdate};

    fn styled(edit: impl FnOnce(&mut Style)) -> Arc<Style> {
        let mut style = Style::initial();
        style.box_data_mut().display = Display::Block;
        edit(&mut style);
        Arc::new(style)
    }

    fn update(entries: &[(NodeId, Arc<Style>)]) -> Update {
        let mut update = Update::new();
        for (node, style) in entries {
            update.add_element(
                *node,
                ElementUpdate { style: Arc::clone(style), change: Change::RENDERER, recomposite: false, pseudo_styles: SmallVec::new() },
            );
        }
        update
    }

    #[test]
    fn test_block_flow_stacks_children() {
        let mut dom = DomTree::new();
        let root = dom.create_element("div");
        let a = dom.create_element("div");
        let b = dom.create_element("div");
        dom.append_child(dom.root(), root).unwrap();
        dom.append_child(root, a).unwrap();
        dom.append_child(root, b).unwrap();

        let mut tree = LayoutTree::new();
        tree.apply(&update(&[
            (root, styled(|s| s.surround_mut().padding = fos_css::Edges::all(Dimension::Px(10.0)))),
            (a, styled(|s| s.box_data_mut().height = Dimension::Px(20.0))),
            (b, styled(|s| {
                s.box_data_mut().height = Dimension::Px(30.0);
                s.box_data_mut().width = Dimension::Px(100.0);
            })),
        ]));
        tree.layout(&dom, Size::new(400.0, 300.0));

        assert_eq!(tree.border_box(root), Some(Rect::new(0.0, 0.0, 400.0, 70.0)));
        assert_eq!(tree.border_box(a), Some(Rect::new(10.0, 10.0, 380.0, 20.0)));
        assert_eq!(tree.border_box(b), Some(Rect::new(10.0, 30.0, 100.0, 30.0)));
        assert!(!tree.is_dirty());
    }

    #[test]
    fn test_display_none_and_size_containment() {
        let mut dom = DomTree::new();
        let root = dom.create_element("div");
        let hidden = dom.create_element("div");
        let inner = dom.create_element("div");
        dom.append_child(dom.root(), root).unwrap();
        dom.append_child(root, hidden).unwrap();
        dom.append_child(hidden, inner).unwrap();

        let mut tree = LayoutTree::new();
        tree.apply(&update(&[
            (root, styled(|s| s.rare_mut().container_type = fos_css::ContainerType::Size)),
            (hidden, styled(|s| s.box_data_mut().display = Display::None)),
        ]));
        tree.layout(&dom, Size::new(400.0, 300.0));

        assert!(!tree.has_box(hidden));
        assert!(!tree.has_box(inner));
        assert_eq!(tree.content_size(root), Some(Size::new(400.0, 0.0)));
    }

    #[test]
    fn test_absolute_box_uses_positioned_ancestor() {
        let mut dom = DomTree::new();
        let root = dom.create_element("div");
        let abs = dom.create_element("div");
        dom.append_child(dom.root(), root).unwrap();
        dom.append_child(root, abs).unwrap();

        let mut tree = LayoutTree::new();
        tree.apply(&update(&[
            (root, styled(|s| {
                s.box_data_mut().position = Position::Relative;
                s.box_data_mut().height = Dimension::Px(100.0);
                s.box_data_mut().width = Dimension::Px(200.0);
            })),
            (abs, styled(|s| {
                s.box_data_mut().position = Position::Absolute;
                s.surround_mut().inset.right = Dimension::Px(10.0);
                s.surround_mut().inset.bottom = Dimension::Px(10.0);
                s.box_data_mut().width = Dimension::Px(50.0);
                s.box_data_mut().height = Dimension::Px(20.0);
            })),
        ]));
        tree.layout(&dom, Size::new(400.0, 300.0));

        assert_eq!(tree.border_box(abs), Some(Rect::new(140.0, 70.0, 50.0, 20.0)));
        assert_eq!(tree.containing_block(abs), Some(Rect::new(0.0, 0.0, 200.0, 100.0)));
        assert!(!tree.overflows_inset_modified_containing_block(abs));
    }
}
