//! CSS Box Model

use fos_css::{Dimension, Edges, Style};
use fos_dom::{BoxSide, PhysicalAxis, Rect};

/// Box dimensions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxDimensions {
    pub content: Rect,
    pub padding: EdgeSizes,
    pub border: EdgeSizes,
    pub margin: EdgeSizes,
}

/// Edge sizes (top, right, bottom, left)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeSizes {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeSizes {
    /// Resolve `auto` to zero and percentages against `basis`
    pub fn resolve(edges: &Edges<Dimension>, basis: f32) -> Self {
        let px = |d: Dimension| d.resolve(Some(basis)).unwrap_or(0.0);
        Self { top: px(edges.top), right: px(edges.right), bottom: px(edges.bottom), left: px(edges.left) }
    }

    pub fn from_px(edges: &Edges<f32>) -> Self {
        Self { top: edges.top, right: edges.right, bottom: edges.bottom, left: edges.left }
    }

    pub fn get(&self, side: BoxSide) -> f32 {
        match side {
            BoxSide::Top => self.top,
            BoxSide::Right => self.right,
            BoxSide::Bottom => self.bottom,
            BoxSide::Left => self.left,
        }
    }

    pub fn set(&mut self, side: BoxSide, value: f32) {
        match side {
            BoxSide::Top => self.top = value,
            BoxSide::Right => self.right = value,
            BoxSide::Bottom => self.bottom = value,
            BoxSide::Left => self.left = value,
        }
    }

    /// Sum of both edges along an axis
    pub fn sum(&self, axis: PhysicalAxis) -> f32 {
        match axis {
            PhysicalAxis::Horizontal => self.left + self.right,
            PhysicalAxis::Vertical => self.top + self.bottom,
        }
    }
}

impl BoxDimensions {
    /// Padding and border of `style`; margins are resolved by the caller
    pub fn from_style(style: &Style, containing_width: f32) -> Self {
        Self {
            content: Rect::default(),
            padding: EdgeSizes::resolve(&style.surround().padding, containing_width),
            border: EdgeSizes::from_px(&style.surround().border_width),
            margin: EdgeSizes::default(),
        }
    }

    /// Get the area covered by content + padding
    pub fn padding_box(&self) -> Rect {
        expand(self.content, &self.padding)
    }

    /// Get the area covered by content + padding + border
    pub fn border_box(&self) -> Rect {
        expand(self.padding_box(), &self.border)
    }

    /// Get the area covered by content + padding + border + margin
    pub fn margin_box(&self) -> Rect {
        expand(self.border_box(), &self.margin)
    }

    /// Padding plus border along an axis
    pub fn frame(&self, axis: PhysicalAxis) -> f32 {
        self.padding.sum(axis) + self.border.sum(axis)
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.content.x += dx;
        self.content.y += dy;
    }
}

fn expand(rect: Rect, edges: &EdgeSizes) -> Rect {
    Rect::new(
        rect.x - edges.left,
        rect.y - edges.top,
        rect.width + edges.left + edges.right,
        rect.height + edges.top + edges.bottom,
    )
}
