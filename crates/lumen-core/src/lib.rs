//! Lumen Core - Foundation crate for the Lumen accessibility scanner.
//!
//! This crate provides the scan data model, error handling and configuration
//! management that every other Lumen crate depends on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Scan requests, results, violations and bounding boxes
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{AppConfig, ScanRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.browser.viewport_width, 1440);
//!
//! let request = ScanRequest::new(vec!["https://example.com".to_string()])?;
//! assert_eq!(request.urls().len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, AuditConfig, BrowserConfig, ScanningConfig, ServerConfig};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use types::{BoundingBox, Impact, ScanRequest, ScanResult, Violation, MAX_URLS_PER_REQUEST};
