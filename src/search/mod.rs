//! In-page search over the rendered document.
//!
//! - [`engine`] - enumerates searchable units and scans them for a query
//! - [`context`] - context window around the first match
//! - [`highlight`] - literal, case-insensitive match marking
//! - [`panel`] - the rendered result list
//! - [`session`] - debounced query lifecycle (Idle → Scheduled → Displaying)

pub mod context;
pub mod engine;
pub mod highlight;
pub mod panel;
pub mod session;

pub use context::context_window;
pub use engine::{SearchResult, SearchableUnit, scan, searchable_units};
pub use highlight::{Segment, highlight, segments_to_html};
pub use panel::{PanelEntry, ResultPanel};
pub use session::{PointerTarget, QueryState, SearchSession};

use crate::document::HEADER_OFFSET;
use crate::utils::AppConfig;
use std::time::Duration;

/// Tunables for scanning and the query lifecycle
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Quiet period after the last keystroke before scanning
    pub debounce: Duration,
    /// Queries shorter than this (in chars, after trimming) never scan
    pub min_query_chars: usize,
    /// Target context window length around a match
    pub context_chars: usize,
    /// Display cap on results
    pub max_results: usize,
    /// Navigation offset for the fixed header
    pub header_offset: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_chars: 2,
            context_chars: 100,
            max_results: 10,
            header_offset: HEADER_OFFSET,
        }
    }
}

impl From<&AppConfig> for SearchOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            min_query_chars: config.min_query_chars,
            context_chars: config.context_chars,
            max_results: config.max_results,
            header_offset: config.header_offset,
        }
    }
}
