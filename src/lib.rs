//! # docnav - In-page documentation navigator
//!
//! docnav loads a Markdown page and gives it the two navigation aids a
//! documentation site offers: a section outline and an as-you-type search
//! over the page text.
//!
//! ## Architecture
//!
//! - [`document`] - Markdown loading into a flat element list with layout offsets
//! - [`outline`] - Outline builder (levels 2 to 4) with id assignment
//! - [`search`] - Debounced search session, scanning, context windows, highlighting
//! - [`viewport`] - Smooth-scrolling viewport and the scroll-to-top control
//! - [`theme`] - Light/dark theme
//! - [`tui`] - Interactive terminal UI
//! - [`output`] - Text and JSON output for the non-interactive commands
//! - [`utils`] - Configuration, app data paths and case folding
//!
//! ## Quick Start
//!
//! ```
//! use docnav::document::load_markdown;
//! use docnav::outline::{OutlineContainer, build_outline};
//! use docnav::search::{SearchOptions, scan};
//!
//! let mut doc = load_markdown("## Setup\n\nConnect the drone via USB cable.\n");
//!
//! let mut sidebar = OutlineContainer::new();
//! let outline = build_outline(&mut doc, Some(&mut sidebar));
//! assert_eq!(outline.nodes()[0].id, "heading-0");
//!
//! let results = scan(&doc, "drone", &SearchOptions::default());
//! assert_eq!(results[0].context, "Connect the drone via USB cable.");
//! ```

pub mod document;
pub mod logging;
pub mod outline;
pub mod output;
pub mod search;
pub mod theme;
#[cfg(feature = "interactive")]
pub mod tui;
pub mod utils;
pub mod viewport;
