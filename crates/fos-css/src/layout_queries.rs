//! Layout Queries
//!
//! Geometry the style system needs back from layout: container sizes for
//! container queries, and box rectangles for anchor positioning. The layout
//! crate implements this; style never depends on it directly.

use crate::style::Style;
use fos_dom::{NodeId, Rect, Size};

/// Read-only view of the latest layout results
pub trait LayoutQueries {
    /// Whether `element` currently has a box
    fn has_box(&self, element: NodeId) -> bool;

    /// Border box in document coordinates
    fn border_box(&self, element: NodeId) -> Option<Rect>;

    /// Containing block rectangle used to position `element`
    fn containing_block(&self, element: NodeId) -> Option<Rect>;

    /// Content box size, used by size container queries
    fn content_size(&self, element: NodeId) -> Option<Size>;

    /// Whether the last layout left the margin box of an absolutely
    /// positioned `element` outside its inset-modified containing block
    fn overflows_inset_modified_containing_block(&self, element: NodeId) -> bool;

    /// Inset-modified containing block `element` would get if it had `style`
    fn inset_modified_containing_block(&self, element: NodeId, style: &Style) -> Option<Rect>;
}

/// Layout with no boxes; every query misses
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLayout;

impl LayoutQueries for NoLayout {
    fn has_box(&self, _element: NodeId) -> bool {
        false
    }

    fn border_box(&self, _element: NodeId) -> Option<Rect> {
        None
    }

    fn containing_block(&self, _element: NodeId) -> Option<Rect> {
        None
    }

    fn content_size(&self, _element: NodeId) -> Option<Size> {
        None
    }

    fn overflows_inset_modified_containing_block(&self, _element: NodeId) -> bool {
        false
    }

    fn inset_modified_containing_block(&self, _element: NodeId, _style: &Style) -> Option<Rect> {
        None
    }
}
