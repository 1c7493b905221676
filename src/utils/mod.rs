//! Utility functions and data structures.
//!
//! ## Modules
//!
//! - [`app_data`] - Application data directory, config and saved viewer state
//! - [`text`] - Case folding with offset mapping, char-based slicing
//!
//! ```no_run
//! use docnav::utils::text::FoldedText;
//!
//! let folded = FoldedText::new("Connect the Drone");
//! assert_eq!(folded.find("drone"), Some((12, 17)));
//! ```

pub mod app_data;
pub mod text;

pub use app_data::*;
