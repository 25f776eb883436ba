//! Scan orchestrator.
//!
//! One browser process serves a whole request and every URL gets its own
//! page. Within a page the steps run strictly in order:
//!
//! 1. open the page and install consent suppression
//! 2. navigate (DOM parsed, bounded by the navigation timeout)
//! 3. let script-driven banners mount, then run the dismissal passes
//! 4. auto-scroll the document to trigger lazy content, back to the top
//! 5. settle, dismiss once more, force-hide
//! 6. screenshot and page height
//! 7. audit, then resolve violation geometry
//!
//! The page is closed whatever the outcome, and the browser is closed once
//! after every page has finished.

use crate::audit::AuditEngine;
use crate::error::{Result, ScanError};
use crate::geometry::resolve_boxes;
use futures::future::join_all;
use lumen_browser::{BrowserHandle, BrowserLauncher, PageActions};
use lumen_consent::SuppressionEngine;
use lumen_core::{AppConfig, ScanRequest, ScanResult, ScanningConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Page-level delays and auto-scroll limits.
#[derive(Debug, Clone)]
pub struct ScanTiming {
    pub navigation_timeout: Duration,
    pub mount_settle: Duration,
    pub scroll_step: f64,
    pub scroll_interval: Duration,
    pub scroll_cap: f64,
    pub post_scroll_settle: Duration,
}

impl ScanTiming {
    pub fn from_config(config: &AppConfig) -> Self {
        let scanning: &ScanningConfig = &config.scanning;
        Self {
            navigation_timeout: config.browser.navigation_timeout(),
            mount_settle: Duration::from_millis(scanning.mount_settle_ms),
            scroll_step: f64::from(scanning.scroll_step_px),
            scroll_interval: Duration::from_millis(scanning.scroll_interval_ms),
            scroll_cap: f64::from(scanning.scroll_cap_px),
            post_scroll_settle: Duration::from_millis(scanning.post_scroll_settle_ms),
        }
    }
}

/// Runs scan requests against a browser launcher and an audit engine.
pub struct ScanOrchestrator {
    launcher: Arc<dyn BrowserLauncher>,
    auditor: Arc<dyn AuditEngine>,
    suppression: SuppressionEngine,
    timing: ScanTiming,
    page_width: u32,
}

impl ScanOrchestrator {
    #[must_use]
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        auditor: Arc<dyn AuditEngine>,
        config: &AppConfig,
    ) -> Self {
        Self {
            launcher,
            auditor,
            suppression: SuppressionEngine::from_config(&config.scanning),
            timing: ScanTiming::from_config(config),
            page_width: config.browser.viewport_width,
        }
    }

    #[must_use]
    pub fn with_suppression(mut self, suppression: SuppressionEngine) -> Self {
        self.suppression = suppression;
        self
    }

    /// Launch a browser and check it can open a page.
    pub async fn self_test(&self) -> Result<()> {
        let browser = self.launcher.launch().await.map_err(ScanError::Launch)?;
        let opened = match browser.new_page().await {
            Ok(page) => page.close().await,
            Err(e) => Err(e),
        };
        let closed = browser.close().await;
        opened?;
        closed?;
        Ok(())
    }

    /// Scan every URL of `request` on one browser.
    ///
    /// Results are positional. Pages run concurrently and none is cancelled
    /// when a sibling fails, but the request fails as a whole with the first
    /// failing URL's error once all of them have finished.
    pub async fn scan(&self, request: &ScanRequest) -> Result<Vec<ScanResult>> {
        let browser = self.launcher.launch().await.map_err(ScanError::Launch)?;
        tracing::info!(urls = request.urls().len(), "browser launched for scan");

        let scans: Vec<_> = request
            .urls()
            .iter()
            .map(|url| self.scan_url(browser.as_ref(), url))
            .collect();
        let outcomes = join_all(scans).await;

        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "browser did not close cleanly");
        }

        outcomes.into_iter().collect()
    }

    async fn scan_url(&self, browser: &dyn BrowserHandle, url: &str) -> Result<ScanResult> {
        let span = tracing::info_span!("scan_url", %url);
        async {
            let page = browser
                .new_page()
                .await
                .map_err(|e| ScanError::from(e).for_url(url))?;

            let outcome = self.run_page(page.as_ref(), url).await;
            if let Err(e) = page.close().await {
                tracing::warn!(error = %e, "page did not close cleanly");
            }

            match outcome {
                Ok(result) => {
                    tracing::info!(
                        violations = result.violations.len(),
                        height = result.page_height,
                        "scan complete"
                    );
                    Ok(result)
                }
                Err(e) => {
                    tracing::error!(error = %e, "scan failed");
                    Err(e.for_url(url))
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_page(&self, page: &dyn PageActions, url: &str) -> Result<ScanResult> {
        self.suppression.install(page).await?;

        page.navigate(url, self.timing.navigation_timeout).await?;
        tokio::time::sleep(self.timing.mount_settle).await;

        let report = self.suppression.dismiss(page).await?;
        tracing::debug!(passes = report.passes, dismissed = report.dismissed(), "dismissal passes done");

        self.auto_scroll(page).await?;

        tokio::time::sleep(self.timing.post_scroll_settle).await;
        self.suppression.dismiss_once(page).await?;
        let hidden = self.suppression.force_hide(page).await?;
        tracing::debug!(hidden = hidden.hidden, unlocked = hidden.unlocked, "force-hide done");

        let screenshot = page.screenshot_full_page().await?;
        let page_height = page_height(page.scroll_metrics().await?.scroll_height);

        let findings = self.auditor.audit(page).await?;
        let violations = resolve_boxes(page, findings).await?;

        Ok(ScanResult {
            url: url.to_string(),
            violations,
            screenshot,
            page_width: self.page_width,
            page_height,
            scanned_at: chrono::Utc::now(),
        })
    }

    /// Scroll down in fixed steps until the bottom or the distance cap, then
    /// return to the top.
    async fn auto_scroll(&self, page: &dyn PageActions) -> Result<()> {
        let mut travelled = 0.0;

        while travelled < self.timing.scroll_cap {
            let metrics = page.scroll_metrics().await?;
            if metrics.y + metrics.viewport_height >= metrics.scroll_height {
                break;
            }
            travelled = (travelled + self.timing.scroll_step).min(self.timing.scroll_cap);
            page.scroll_to(travelled).await?;
            tokio::time::sleep(self.timing.scroll_interval).await;
        }

        tracing::debug!(travelled, "auto-scroll done");
        page.scroll_to(0.0).await?;
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn page_height(scroll_height: f64) -> u32 {
    if scroll_height.is_finite() {
        scroll_height.round().clamp(0.0, f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_defaults() {
        let timing = ScanTiming::from_config(&AppConfig::default());
        assert_eq!(timing.navigation_timeout, Duration::from_secs(45));
        assert_eq!(timing.mount_settle, Duration::from_millis(1500));
        assert!((timing.scroll_step - 400.0).abs() < f64::EPSILON);
        assert!((timing.scroll_cap - 30_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_page_height_rounding() {
        assert_eq!(page_height(2400.4), 2400);
        assert_eq!(page_height(-3.0), 0);
        assert_eq!(page_height(f64::NAN), 0);
    }
}
