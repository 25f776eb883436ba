//! Cookie and consent banner suppression for Lumen scans.
//!
//! Banners are handled in layers so that a page which slips past one is
//! caught by the next: blocked consent-platform requests, a proactive DOM
//! watcher, reactive accept clicks (including inside consent iframes), a
//! shadow-DOM aware fallback and finally force-hiding.
//!
//! Vendor knowledge lives in the static tables of [`patterns`]; extending
//! coverage is a data change.
//!
//! # Example
//!
//! ```rust
//! use lumen_browser::RequestFilter;
//! use lumen_consent::SuppressionEngine;
//!
//! let engine = SuppressionEngine::default();
//! assert!(engine.block_list().should_block("https://cdn.cookielaw.org/otSDKStub.js"));
//! assert!(!engine.block_list().should_block("https://example.com/app.js"));
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

pub mod engine;
pub mod error;
pub mod frames;
pub mod network;
pub mod overlay;
pub mod patterns;
pub mod scripts;
pub mod tree;

pub use engine::{
    DismissReport, Dismissal, DismissalTier, ForceHideReport, SuppressionEngine, SuppressionTiming,
};
pub use error::{ConsentError, Result};
pub use network::BlockList;
pub use overlay::ForceHidePolicy;
pub use patterns::{compiled, CompiledPatterns, PatternTables, PATTERNS, PATTERN_TABLES_VERSION};
