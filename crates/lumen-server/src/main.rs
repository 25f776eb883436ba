use anyhow::Context;
use lumen_browser::ChromiumLauncher;
use lumen_core::AppConfig;
use lumen_scanner::{AxeAuditor, ScanOrchestrator};
use lumen_server::{init_tracing, router, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Lumen v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    let auditor = AxeAuditor::load(&config.audit)
        .await
        .context("failed to load the axe-core bundle")?;

    let launcher = ChromiumLauncher::new(config.browser.clone());
    let scanner = ScanOrchestrator::new(Arc::new(launcher), Arc::new(auditor), &config);
    let app = router(AppState::new(scanner));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Lumen listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Lumen stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
