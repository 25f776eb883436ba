//! Shared handler state.

use lumen_scanner::ScanOrchestrator;
use std::sync::Arc;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Scan pipeline; launches a fresh browser per request
    pub scanner: Arc<ScanOrchestrator>,
}

impl AppState {
    pub fn new(scanner: ScanOrchestrator) -> Self {
        Self {
            scanner: Arc::new(scanner),
        }
    }
}
