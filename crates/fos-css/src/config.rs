//! Resolver Configuration

use fos_dom::Size;

/// Style resolution options
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Viewport size for `vw` / `vh`
    pub viewport: Size,

    /// Composed-tree depth beyond which elements are not rendered
    pub max_tree_depth: usize,

    /// Reuse match results across inline style edits
    pub enable_match_result_cache: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(800.0, 600.0),
            max_tree_depth: 512,
            enable_match_result_cache: true,
        }
    }
}
