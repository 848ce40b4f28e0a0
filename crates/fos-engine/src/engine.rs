//! Engine - Main entry point

use fos_css::Stylist;
use fos_dom::Document;

use crate::{Config, Page};

/// The fOS style and layout engine
pub struct Engine {
    config: Config,
}

impl Engine {
    /// Create a new engine with the given configuration
    pub fn new(config: Config) -> Self {
        tracing::info!("fOS Engine {} initialized", crate::VERSION);
        Self { config }
    }

    /// Create a page holding `<html><head></head><body></body></html>`
    /// styled by the default user-agent sheet
    pub fn create_page(&self, url: &str) -> Result<Page, EngineError> {
        let document = Document::new(url)?;
        Ok(self.page_for(document, Stylist::with_default_user_agent_sheet()))
    }

    /// Wrap an existing document
    pub fn page_for(&self, document: Document, stylist: Stylist) -> Page {
        tracing::debug!(url = document.url(), "creating page");
        Page::new(document, stylist, self.config.clone())
    }

    /// Get engine configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Engine error
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("DOM error: {0}")]
    Dom(#[from] fos_dom::DomError),

    #[error("Selector error: {0}")]
    Selector(#[from] fos_css::SelectorParseError),
}
