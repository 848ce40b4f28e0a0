//! fOS Layout Engine
//!
//! Box tree built from style updates, block flow, and absolute positioning
//! through per-axis positioned layout constraints. The tree answers the
//! geometry queries style resolution needs between interleaved passes.

mod box_model;
mod layout_tree;
mod positioned;

pub use box_model::{BoxDimensions, EdgeSizes};
pub use layout_tree::{BoxKind, LayoutBox, LayoutTree};
pub use positioned::{AxisPlacement, ContainingBlock, GridTracks, PositionedLayoutConstraints};
