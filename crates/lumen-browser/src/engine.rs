use crate::actions::{BrowserHandle, BrowserLauncher, PageActions};
use crate::error::{BrowserError, Result};
use crate::page::ChromiumPage;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures_util::stream::StreamExt;
use lumen_core::BrowserConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Launches headless Chromium with the settings every scan relies on:
/// fixed viewport, request interception, in-process iframes.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    config: BrowserConfig,
}

impl ChromiumLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    fn build_config(&self) -> Result<CdpBrowserConfig> {
        let mut builder = CdpBrowserConfig::builder()
            .enable_request_intercept()
            .window_size(self.config.viewport_width, self.config.viewport_height)
            .viewport(Viewport {
                width: self.config.viewport_width,
                height: self.config.viewport_height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            })
            .arg("--disable-dev-shm-usage")
            // Keep cross-origin consent iframes in-process so they are reachable as frames
            .arg("--disable-features=IsolateOrigins,site-per-process");

        if self.config.no_sandbox {
            builder = builder.no_sandbox().arg("--disable-setuid-sandbox");
        }
        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.config.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(BrowserError::LaunchError)
    }
}

#[async_trait::async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>> {
        let config = self.build_config()?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::LaunchError(e.to_string()))?;

        // Spawn browser handler
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler stopped");
                    break;
                }
            }
        });

        tracing::debug!("browser launched");
        Ok(Box::new(ChromiumBrowser {
            browser,
            handler_task,
            active_pages: Arc::new(AtomicUsize::new(0)),
        }))
    }
}

/// A running Chromium process.
pub struct ChromiumBrowser {
    browser: Browser,
    handler_task: JoinHandle<()>,
    active_pages: Arc<AtomicUsize>,
}

impl ChromiumBrowser {
    /// Number of pages opened and not yet closed.
    pub fn active_pages(&self) -> usize {
        self.active_pages.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl BrowserHandle for ChromiumBrowser {
    async fn new_page(&self) -> Result<Box<dyn PageActions>> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(Box::new(ChromiumPage::new(page, self.active_pages.clone())))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        let leaked = this.active_pages();
        if leaked > 0 {
            tracing::warn!(pages = leaked, "closing browser with pages still open");
        }

        let closed = this.browser.close().await;
        let _ = this.browser.wait().await;
        this.handler_task.abort();
        tracing::debug!("browser closed");

        closed.map(|_| ()).map_err(BrowserError::from)
    }
}

