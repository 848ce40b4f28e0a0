//! fOS Engine
//!
//! Drives style resolution and layout for a document.
//!
//! # Example
//! ```rust,ignore
//! use fos_engine::{Engine, Config};
//!
//! let engine = Engine::new(Config::default());
//! let mut page = engine.create_page("about:blank")?;
//! page.add_author_rule("body", block)?;
//! let report = page.update();
//! ```

mod engine;
mod page;
mod config;

pub use engine::{Engine, EngineError};
pub use page::{Page, UpdateReport};
pub use config::Config;

// Re-export sub-crates for advanced usage
pub use fos_css as css;
pub use fos_dom as dom;
pub use fos_layout as layout;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
