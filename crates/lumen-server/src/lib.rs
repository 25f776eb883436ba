//! Lumen Server - HTTP surface for accessibility scans.
//!
//! A thin `axum` shell over [`lumen_scanner::ScanOrchestrator`]; the binary
//! in `main.rs` wires configuration, the axe-core bundle and Chromium
//! together and serves [`router`].

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod error;
pub mod routes;
pub mod state;

pub use api::{ResponseShape, ScanBody, ScanResponse, UrlInput};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,lumen=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}
