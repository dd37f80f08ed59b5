//! Documentation page helpers: theme, navigation, table of contents,
//! anchors, copy buttons and page search.

pub mod copy;
pub mod document;
pub mod enhance;
pub mod nav;
pub mod scroll;
pub mod search;
pub mod theme;
pub mod toc;

pub use document::{Document, Edits, Element, HtmlParser};
pub use enhance::{current_path_for, enhance_dir, enhance_file, enhance_page, EnhanceOptions, EnhanceReport};
pub use search::{SearchIndex, SearchOutcome, SearchPanel};
pub use theme::{PreferenceStore, Theme};

use std::path::PathBuf;
use thiserror::Error;

/// Class of the region holding a page's own content
pub const CONTENT_CLASS: &str = "main-content";

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("failed to load the HTML grammar: {0}")]
    Language(String),

    #[error("failed to parse HTML")]
    Parse,

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid search index: {0}")]
    Index(#[from] serde_json::Error),
}
