//! Engine Configuration

use fos_css::ResolverConfig;
use fos_dom::Size;

/// Engine configuration options
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial viewport size
    pub viewport: Size,

    /// Composed-tree depth beyond which elements are not rendered
    pub max_tree_depth: usize,

    /// Maximum resolve/layout rounds in one update
    pub max_interleaved_passes: usize,

    /// Reuse match results across inline style edits
    pub enable_match_result_cache: bool,
}

impl Config {
    /// Options handed to the style resolver
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            viewport: self.viewport,
            max_tree_depth: self.max_tree_depth,
            enable_match_result_cache: self.enable_match_result_cache,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewport: Size::new(800.0, 600.0),
            max_tree_depth: 512,
            max_interleaved_passes: 16,
            enable_match_result_cache: true,
        }
    }
}
