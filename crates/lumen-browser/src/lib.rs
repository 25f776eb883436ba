//! Browser automation collaborator for Lumen scans.
//!
//! Provides the launcher/handle/page traits the scan pipeline is written
//! against, and their headless Chromium implementation.

pub mod actions;
pub mod engine;
pub mod error;
pub mod interception;
pub mod page;

pub use actions::{
    evaluate_as, extract_host, BrowserHandle, BrowserLauncher, ElementRect, ElementTarget,
    FrameInfo, FrameTarget, PageActions, RequestFilter, ScrollMetrics,
};
pub use engine::{ChromiumBrowser, ChromiumLauncher};
pub use error::{BrowserError, Result};
pub use page::ChromiumPage;
