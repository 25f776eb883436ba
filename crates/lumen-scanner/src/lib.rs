//! Lumen Scanner - per-URL accessibility scan pipeline.
//!
//! This crate drives a page from navigation to finished [`ScanResult`]:
//! consent suppression, lazy-content auto-scroll, full-page screenshot,
//! accessibility audit and violation geometry.
//!
//! # Example
//!
//! ```rust,ignore
//! use lumen_browser::ChromiumLauncher;
//! use lumen_core::{AppConfig, ScanRequest};
//! use lumen_scanner::{AxeAuditor, ScanOrchestrator};
//! use std::sync::Arc;
//!
//! let config = AppConfig::load_with_env()?;
//! let auditor = AxeAuditor::load(&config.audit).await?;
//! let orchestrator = ScanOrchestrator::new(
//!     Arc::new(ChromiumLauncher::new(config.browser.clone())),
//!     Arc::new(auditor),
//!     &config,
//! );
//!
//! let request = ScanRequest::new(vec!["https://example.com".to_string()])?;
//! let results = orchestrator.scan(&request).await?;
//! ```
//!
//! [`ScanResult`]: lumen_core::ScanResult

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod audit;
#[allow(missing_docs)]
pub mod error;
pub mod geometry;
#[allow(missing_docs)]
pub mod orchestrator;

// Re-export commonly used types
pub use audit::{AuditEngine, AuditNode, AuditViolation, AxeAuditor, TargetSelector};
pub use error::{Result, ScanError};
pub use geometry::resolve_boxes;
pub use orchestrator::{ScanOrchestrator, ScanTiming};
