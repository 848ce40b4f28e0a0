//! Positioned Layout Constraints
//!
//! Per-axis geometry of an absolutely positioned box: the containing range
//! (optionally narrowed to a grid area or a `position-area` cell), the
//! inset-modified containing block, the used size, and the final position
//! after auto margins and self-alignment.
//!
//! Everything here works in physical coordinates. The containing block's
//! writing mode and direction only decide which physical edge a logical
//! `start` / `end` alignment refers to.

use fos_css::{
    AreaSpan, Dimension, Direction, GridLine, ItemPosition, OverflowPosition, SelfAlignment, Style, WritingMode,
};
use fos_dom::{LogicalAxis, PhysicalAxis, Rect};

/// Explicit grid tracks of a grid container, in pixels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridTracks {
    pub columns: Vec<f32>,
    pub rows: Vec<f32>,
}

impl GridTracks {
    pub fn from_style(style: &Style) -> Self {
        Self { columns: style.rare().grid_template_columns.clone(), rows: style.rare().grid_template_rows.clone() }
    }

    fn tracks(&self, axis: PhysicalAxis) -> &[f32] {
        match axis {
            PhysicalAxis::Horizontal => &self.columns,
            PhysicalAxis::Vertical => &self.rows,
        }
    }

    /// Offset of a grid line from the container's padding edge. Negative
    /// lines count from the end; out-of-range lines clamp to the explicit grid.
    fn line_offset(&self, axis: PhysicalAxis, line: GridLine) -> Option<f32> {
        let tracks = self.tracks(axis);
        let lines = tracks.len() as i32 + 1;
        let index = match line {
            GridLine::Auto => return None,
            GridLine::Line(n) if n > 0 => n - 1,
            GridLine::Line(n) if n < 0 => lines + n,
            GridLine::Line(_) => return None,
        };
        let index = index.clamp(0, lines - 1) as usize;
        Some(tracks[..index].iter().sum())
    }
}

/// Containing block of a positioned box, as found by layout
#[derive(Debug, Clone, PartialEq)]
pub struct ContainingBlock {
    /// Padding box of the containing block
    pub rect: Rect,
    pub writing_mode: WritingMode,
    pub direction: Direction,
    /// Present when the containing block is a grid container
    pub grid: Option<GridTracks>,
}

impl ContainingBlock {
    pub fn new(rect: Rect) -> Self {
        Self { rect, writing_mode: WritingMode::default(), direction: Direction::default(), grid: None }
    }

    pub fn from_style(rect: Rect, style: &Style, grid: Option<GridTracks>) -> Self {
        Self { rect, writing_mode: style.writing_mode(), direction: style.inherited().direction, grid }
    }

    /// Logical axis of the containing block that runs along `axis`
    fn logical_axis(&self, axis: PhysicalAxis) -> LogicalAxis {
        if self.writing_mode.physical_axis(LogicalAxis::Inline) == axis { LogicalAxis::Inline } else { LogicalAxis::Block }
    }

    /// Whether the logical start of `axis` is its physical end
    fn is_flipped(&self, axis: PhysicalAxis) -> bool {
        match self.logical_axis(axis) {
            LogicalAxis::Block => self.writing_mode.is_block_flipped(),
            LogicalAxis::Inline => axis == PhysicalAxis::Horizontal && self.direction == Direction::Rtl,
        }
    }
}

/// Alignment after mapping logical keywords onto physical edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhysicalAlignment {
    Start,
    End,
    Center,
    AnchorCenter,
    Stretch,
}

/// Used size and position along one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisPlacement {
    /// Border-box start
    pub start: f32,
    /// Border-box size
    pub size: f32,
    pub margin_start: f32,
    pub margin_end: f32,
}

impl AxisPlacement {
    pub fn margin_box_start(&self) -> f32 {
        self.start - self.margin_start
    }

    pub fn margin_box_end(&self) -> f32 {
        self.start + self.size + self.margin_end
    }
}

/// Constraints for one positioned box along one physical axis
#[derive(Debug, Clone)]
pub struct PositionedLayoutConstraints {
    axis: PhysicalAxis,
    original_range: (f32, f32),
    containing_range: (f32, f32),
    inset_start: Option<f32>,
    inset_end: Option<f32>,
    margin_start: Option<f32>,
    margin_end: Option<f32>,
    size: Option<f32>,
    min_size: f32,
    max_size: Option<f32>,
    /// Padding plus border
    frame: f32,
    alignment: PhysicalAlignment,
    overflow: OverflowPosition,
    anchor_range: Option<(f32, f32)>,
    static_position: f32,
}

impl PositionedLayoutConstraints {
    /// `default_anchor` is the border box of the box's default anchor, if it
    /// has one. `static_position` is where the box would have started in flow.
    pub fn new(
        style: &Style,
        containing_block: &ContainingBlock,
        default_anchor: Option<Rect>,
        static_position: f32,
        frame: f32,
        axis: PhysicalAxis,
    ) -> Self {
        let rect = containing_block.rect;
        let original_range = (rect.start(axis), rect.end(axis));
        let mut containing_range = original_range;

        if let Some(grid) = &containing_block.grid {
            let placement = match axis {
                PhysicalAxis::Horizontal => style.rare().grid_column,
                PhysicalAxis::Vertical => style.rare().grid_row,
            };
            if let Some(offset) = grid.line_offset(axis, placement.start) {
                containing_range.0 = rect.start(axis) + offset;
            }
            if let Some(offset) = grid.line_offset(axis, placement.end) {
                containing_range.1 = rect.start(axis) + offset;
            }
        }

        let flipped = containing_block.is_flipped(axis);
        let self_alignment = match containing_block.logical_axis(axis) {
            LogicalAxis::Inline => style.rare().justify_self,
            LogicalAxis::Block => style.rare().align_self,
        };
        // The default anchor only takes part when something refers to it.
        let needs_anchor =
            style.rare().position_area.is_some() || self_alignment.position == ItemPosition::AnchorCenter;
        let anchor_range = default_anchor.filter(|_| needs_anchor).map(|a| (a.start(axis), a.end(axis)));
        let area = style.rare().position_area.zip(anchor_range).map(|(area, anchor)| {
            let span = match axis {
                PhysicalAxis::Horizontal => area.horizontal,
                PhysicalAxis::Vertical => area.vertical,
            };
            (span, anchor)
        });
        if let Some((span, anchor)) = area {
            containing_range = area_range(span, containing_range, anchor);
        }

        let containing_size = containing_range.1 - containing_range.0;
        let (inset_start, inset_end) = style.surround().inset.along(axis);
        // With a default anchor there is no static position: auto insets are zero.
        let resolve_inset = |inset: Dimension| match anchor_range {
            Some(_) => Some(inset.resolve(Some(containing_size)).unwrap_or(0.0)),
            None => inset.resolve(Some(containing_size)),
        };
        // Percentage margins resolve against the containing block's width.
        let (margin_start, margin_end) = style.surround().margin.along(axis);
        let margin_basis = Some(rect.width);

        let box_data = style.box_data();
        let (size, min_size, max_size) = match axis {
            PhysicalAxis::Horizontal => (box_data.width, box_data.min_width, box_data.max_width),
            PhysicalAxis::Vertical => (box_data.height, box_data.min_height, box_data.max_height),
        };

        let alignment = physical_alignment(self_alignment, flipped, area.map(|(span, _)| span));

        Self {
            axis,
            original_range,
            containing_range,
            inset_start: resolve_inset(inset_start),
            inset_end: resolve_inset(inset_end),
            margin_start: margin_start.resolve(margin_basis),
            margin_end: margin_end.resolve(margin_basis),
            size: size.resolve(Some(containing_size)).map(|s| s + frame),
            min_size: min_size.resolve(Some(containing_size)).map_or(0.0, |s| s + frame),
            max_size: max_size.resolve(Some(containing_size)).map(|s| s + frame),
            frame,
            alignment,
            overflow: self_alignment.overflow,
            anchor_range,
            static_position,
        }
    }

    pub fn axis(&self) -> PhysicalAxis {
        self.axis
    }

    /// Containing range after grid and position-area narrowing
    pub fn containing_range(&self) -> (f32, f32) {
        self.containing_range
    }

    /// Range left after applying the insets (`auto` counts as zero)
    pub fn inset_modified_containing_range(&self) -> (f32, f32) {
        let start = self.containing_range.0 + self.inset_start.unwrap_or(0.0);
        let end = self.containing_range.1 - self.inset_end.unwrap_or(0.0);
        (start, end.max(start))
    }

    fn available_size(&self) -> f32 {
        let (start, end) = self.inset_modified_containing_range();
        (end - start - self.margin_start.unwrap_or(0.0) - self.margin_end.unwrap_or(0.0)).max(0.0)
    }

    /// Whether an auto size fills the inset-modified containing block
    fn stretches(&self) -> bool {
        let both_insets = self.inset_start.is_some() && self.inset_end.is_some();
        let auto_margins = self.margin_start.is_none() || self.margin_end.is_none();
        both_insets && !auto_margins && self.alignment == PhysicalAlignment::Stretch
    }

    /// Border-box size, given the box's max-content border-box size
    pub fn resolve_size(&self, intrinsic: f32) -> f32 {
        let size = match self.size {
            Some(size) => size,
            None if self.stretches() => self.available_size(),
            None => intrinsic.min(self.available_size()).max(self.frame),
        };
        let size = self.max_size.map_or(size, |max| size.min(max));
        size.max(self.min_size).max(self.frame)
    }

    /// Place a box of border-box `size`
    pub fn resolve_position(&self, size: f32) -> AxisPlacement {
        let (imcb_start, imcb_end) = self.inset_modified_containing_range();
        let mut margin_start = self.margin_start.unwrap_or(0.0);
        let mut margin_end = self.margin_end.unwrap_or(0.0);

        let start = match (self.inset_start, self.inset_end) {
            (Some(_), Some(_)) => {
                let free = imcb_end - imcb_start - size - margin_start - margin_end;
                match (self.margin_start, self.margin_end) {
                    (None, None) => {
                        if free >= 0.0 {
                            margin_start = free / 2.0;
                            margin_end = free / 2.0;
                        } else {
                            margin_end += free;
                        }
                        imcb_start + margin_start
                    }
                    (None, Some(_)) => {
                        margin_start = free;
                        imcb_start + margin_start
                    }
                    (Some(_), None) => {
                        margin_end = free;
                        imcb_start + margin_start
                    }
                    (Some(_), Some(_)) => {
                        let shift = self.resolve_alignment_shift(free, size, imcb_start + margin_start);
                        self.keep_in_containing_block(imcb_start + margin_start + shift, size, margin_start, margin_end)
                    }
                }
            }
            (Some(_), None) => imcb_start + margin_start,
            (None, Some(_)) => imcb_end - margin_end - size,
            (None, None) => self.static_position + margin_start,
        };
        AxisPlacement { start, size, margin_start, margin_end }
    }

    /// Offset from the start of the inset-modified containing block
    fn resolve_alignment_shift(&self, free: f32, size: f32, start: f32) -> f32 {
        if free < 0.0 && self.overflow == OverflowPosition::Safe {
            return 0.0;
        }
        match self.alignment {
            PhysicalAlignment::Start | PhysicalAlignment::Stretch => 0.0,
            PhysicalAlignment::End => free,
            PhysicalAlignment::Center => free / 2.0,
            PhysicalAlignment::AnchorCenter => match self.anchor_range {
                Some((anchor_start, anchor_end)) => (anchor_start + anchor_end) / 2.0 - size / 2.0 - start,
                None => free / 2.0,
            },
        }
    }

    /// Pull a box that alignment pushed outside the original containing
    /// block back inside it, unless the alignment is `unsafe`
    fn keep_in_containing_block(&self, start: f32, size: f32, margin_start: f32, margin_end: f32) -> f32 {
        if self.overflow == OverflowPosition::Unsafe {
            return start;
        }
        let (cb_start, cb_end) = self.original_range;
        let mut start = start;
        if start + size + margin_end > cb_end {
            start = cb_end - size - margin_end;
        }
        if start - margin_start < cb_start {
            start = cb_start + margin_start;
        }
        start
    }

    /// Whether the margin box escapes the inset-modified containing block
    pub fn overflows(&self, placement: &AxisPlacement) -> bool {
        const EPSILON: f32 = 0.01;
        let (start, end) = self.inset_modified_containing_range();
        placement.margin_box_start() < start - EPSILON || placement.margin_box_end() > end + EPSILON
    }
}

/// Range covered by `span` of the three tracks the anchor cuts the
/// containing range into
fn area_range(span: AreaSpan, containing: (f32, f32), anchor: (f32, f32)) -> (f32, f32) {
    let anchor_start = anchor.0.clamp(containing.0, containing.1);
    let anchor_end = anchor.1.clamp(anchor_start, containing.1);
    let lines = [containing.0, anchor_start, anchor_end, containing.1];
    let start = lines[usize::from(span.start.min(3))];
    let end = lines[usize::from(span.end.min(3))];
    (start, end.max(start))
}

fn physical_alignment(alignment: SelfAlignment, flipped: bool, area: Option<AreaSpan>) -> PhysicalAlignment {
    let logical = |start: bool| match (start, flipped) {
        (true, false) | (false, true) => PhysicalAlignment::Start,
        (true, true) | (false, false) => PhysicalAlignment::End,
    };
    match alignment.position {
        ItemPosition::Start => logical(true),
        ItemPosition::End => logical(false),
        ItemPosition::Center => PhysicalAlignment::Center,
        ItemPosition::AnchorCenter => PhysicalAlignment::AnchorCenter,
        ItemPosition::Stretch => PhysicalAlignment::Stretch,
        // `normal` inside a position-area aligns toward the anchor.
        ItemPosition::Auto | ItemPosition::Normal => match area.map(|span| (span.start, span.end)) {
            None => PhysicalAlignment::Stretch,
            Some((0, 1)) | Some((0, 2)) => PhysicalAlignment::End,
            Some((1, 3)) | Some((2, 3)) => PhysicalAlignment::Start,
            Some(_) => PhysicalAlignment::Center,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_css::PositionArea;

    fn style(edit: impl FnOnce(&mut Style)) -> Style {
        let mut style = Style::initial();
        style.box_data_mut().position = fos_css::Position::Absolute;
        edit(&mut style);
        style
    }

    fn cb() -> ContainingBlock {
        ContainingBlock::new(Rect::new(0.0, 0.0, 200.0, 100.0))
    }

    #[test]
    fn test_top_inset_places_box() {
        let s = style(|s| {
            s.surround_mut().inset.top = Dimension::Px(10.0);
            s.box_data_mut().height = Dimension::Px(30.0);
        });
        let c = PositionedLayoutConstraints::new(&s, &cb(), None, 0.0, 0.0, PhysicalAxis::Vertical);
        assert_eq!(c.inset_modified_containing_range(), (10.0, 100.0));
        let size = c.resolve_size(0.0);
        let placement = c.resolve_position(size);
        assert_eq!((placement.start, placement.size), (10.0, 30.0));
        assert!(!c.overflows(&placement));
    }

    #[test]
    fn test_overflow_past_inset_modified_block() {
        let s = style(|s| {
            s.surround_mut().inset.top = Dimension::Px(70.0);
            s.box_data_mut().height = Dimension::Px(50.0);
        });
        let c = PositionedLayoutConstraints::new(&s, &cb(), None, 0.0, 0.0, PhysicalAxis::Vertical);
        let placement = c.resolve_position(c.resolve_size(0.0));
        assert_eq!(placement.start, 70.0);
        assert!(c.overflows(&placement));
    }

    #[test]
    fn test_stretch_and_auto_margins() {
        let s = style(|s| {
            s.surround_mut().inset.left = Dimension::Px(10.0);
            s.surround_mut().inset.right = Dimension::Px(10.0);
        });
        let c = PositionedLayoutConstraints::new(&s, &cb(), None, 0.0, 4.0, PhysicalAxis::Horizontal);
        assert_eq!(c.resolve_size(20.0), 180.0);

        let centered = style(|s| {
            s.surround_mut().inset.left = Dimension::Px(0.0);
            s.surround_mut().inset.right = Dimension::Px(0.0);
            s.surround_mut().margin.left = Dimension::Auto;
            s.surround_mut().margin.right = Dimension::Auto;
            s.box_data_mut().width = Dimension::Px(100.0);
        });
        let c = PositionedLayoutConstraints::new(&centered, &cb(), None, 0.0, 0.0, PhysicalAxis::Horizontal);
        let placement = c.resolve_position(c.resolve_size(0.0));
        assert_eq!((placement.start, placement.margin_start, placement.margin_end), (50.0, 50.0, 50.0));
    }

    #[test]
    fn test_alignment_is_kept_inside_unless_unsafe() {
        let aligned = |overflow| {
            style(|s| {
                s.surround_mut().inset.top = Dimension::Px(0.0);
                s.surround_mut().inset.bottom = Dimension::Px(0.0);
                s.box_data_mut().height = Dimension::Px(40.0);
                s.rare_mut().align_self = SelfAlignment::new(ItemPosition::AnchorCenter, overflow);
            })
        };
        let anchor = Some(Rect::new(0.0, 90.0, 10.0, 10.0));
        let c = PositionedLayoutConstraints::new(&aligned(OverflowPosition::Default), &cb(), anchor, 0.0, 0.0, PhysicalAxis::Vertical);
        assert_eq!(c.resolve_position(40.0).start, 60.0);
        let c = PositionedLayoutConstraints::new(&aligned(OverflowPosition::Unsafe), &cb(), anchor, 0.0, 0.0, PhysicalAxis::Vertical);
        assert_eq!(c.resolve_position(40.0).start, 75.0);
    }

    #[test]
    fn test_anchor_center_with_auto_insets() {
        let s = style(|s| {
            s.box_data_mut().height = Dimension::Px(20.0);
            s.rare_mut().align_self = SelfAlignment::new(ItemPosition::AnchorCenter, OverflowPosition::Default);
        });
        let anchor = Some(Rect::new(0.0, 40.0, 10.0, 10.0));
        let c = PositionedLayoutConstraints::new(&s, &cb(), anchor, 70.0, 0.0, PhysicalAxis::Vertical);
        assert_eq!(c.inset_modified_containing_range(), (0.0, 100.0));
        assert_eq!(c.resolve_position(c.resolve_size(0.0)).start, 35.0);

        // Without an anchor box the static position still applies.
        let c = PositionedLayoutConstraints::new(&s, &cb(), None, 70.0, 0.0, PhysicalAxis::Vertical);
        assert_eq!(c.resolve_position(20.0).start, 70.0);
    }

    #[test]
    fn test_unreferenced_anchor_keeps_static_position() {
        let s = style(|s| s.box_data_mut().height = Dimension::Px(20.0));
        let anchor = Some(Rect::new(0.0, 40.0, 10.0, 10.0));
        let c = PositionedLayoutConstraints::new(&s, &cb(), anchor, 70.0, 0.0, PhysicalAxis::Vertical);
        assert_eq!(c.resolve_position(20.0).start, 70.0);
    }

    #[test]
    fn test_rtl_end_alignment_is_physical_left() {
        let s = style(|s| {
            s.surround_mut().inset.left = Dimension::Px(0.0);
            s.surround_mut().inset.right = Dimension::Px(0.0);
            s.box_data_mut().width = Dimension::Px(50.0);
            s.rare_mut().justify_self = SelfAlignment::new(ItemPosition::End, OverflowPosition::Default);
        });
        let mut rtl = cb();
        rtl.direction = Direction::Rtl;
        let c = PositionedLayoutConstraints::new(&s, &rtl, None, 0.0, 0.0, PhysicalAxis::Horizontal);
        assert_eq!(c.resolve_position(50.0).start, 0.0);
        let c = PositionedLayoutConstraints::new(&s, &cb(), None, 0.0, 0.0, PhysicalAxis::Horizontal);
        assert_eq!(c.resolve_position(50.0).start, 150.0);
    }

    #[test]
    fn test_grid_area_narrows_range() {
        let s = style(|s| {
            s.rare_mut().grid_column = fos_css::GridPlacement { start: GridLine::Line(2), end: GridLine::Line(-1) };
        });
        let mut grid = cb();
        grid.grid = Some(GridTracks { columns: vec![50.0, 60.0, 90.0], rows: Vec::new() });
        let c = PositionedLayoutConstraints::new(&s, &grid, None, 0.0, 0.0, PhysicalAxis::Horizontal);
        assert_eq!(c.containing_range(), (50.0, 200.0));
    }

    #[test]
    fn test_position_area_cell() {
        let s = style(|s| {
            s.rare_mut().position_area = PositionArea::from_keywords(&["bottom"]);
            s.box_data_mut().height = Dimension::Px(10.0);
        });
        let anchor = Some(Rect::new(20.0, 30.0, 40.0, 20.0));
        let c = PositionedLayoutConstraints::new(&s, &cb(), anchor, 0.0, 0.0, PhysicalAxis::Vertical);
        assert_eq!(c.inset_modified_containing_range(), (50.0, 100.0));
        assert_eq!(c.resolve_position(10.0).start, 50.0);
    }
}
