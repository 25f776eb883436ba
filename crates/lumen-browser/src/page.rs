//! Chromium page implementation of [`PageActions`].

use crate::actions::{
    evaluate_as, ElementRect, ElementTarget, FrameInfo, FrameTarget, PageActions, RequestFilter,
    ScrollMetrics,
};
use crate::error::{BrowserError, Result};
use crate::interception::spawn_request_filter;
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, CaptureScreenshotFormat, FrameId, NavigateParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::{Page, ScreenshotParams};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// How often readiness and visibility are re-checked.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const READY_STATE_SCRIPT: &str =
    "({ state: document.readyState, href: String(location.href) })";

const SCROLL_METRICS_SCRIPT: &str = r"(() => ({
    y: window.scrollY || window.pageYOffset || 0,
    scrollHeight: Math.max(
        document.documentElement ? document.documentElement.scrollHeight : 0,
        document.body ? document.body.scrollHeight : 0
    ),
    viewportHeight: window.innerHeight || 0
}))()";

/// A single Chromium page.
pub struct ChromiumPage {
    page: Page,
    interceptor: Mutex<Option<JoinHandle<()>>>,
    blocked_requests: Arc<AtomicUsize>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumPage {
    pub(crate) fn new(page: Page, active_count: Arc<AtomicUsize>) -> Self {
        active_count.fetch_add(1, Ordering::Relaxed);
        Self {
            page,
            interceptor: Mutex::new(None),
            blocked_requests: Arc::new(AtomicUsize::new(0)),
            active_count,
        }
    }

    /// Requests aborted by the installed filter so far.
    pub fn blocked_requests(&self) -> usize {
        self.blocked_requests.load(Ordering::Relaxed)
    }

    async fn execution_context(
        &self,
        frame: &FrameTarget,
    ) -> Result<Option<chromiumoxide::cdp::js_protocol::runtime::ExecutionContextId>> {
        match frame {
            FrameTarget::Main => Ok(None),
            FrameTarget::Frame(id) => self
                .page
                .frame_execution_context(FrameId::new(id.clone()))
                .await?
                .map(Some)
                .ok_or_else(|| BrowserError::FrameDetached(id.clone())),
        }
    }

    async fn wait_for_dom(&self, url: &str) -> Result<()> {
        #[derive(serde::Deserialize)]
        struct ReadyState {
            state: String,
            href: String,
        }

        loop {
            // The context is torn down while the new document commits
            match evaluate_as::<ReadyState, _>(self, &FrameTarget::Main, READY_STATE_SCRIPT).await {
                Ok(ready) if ready.state != "loading" && ready.href != "about:blank" => {
                    tracing::debug!(%url, state = %ready.state, "document parsed");
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => tracing::trace!(%url, error = %e, "ready-state check failed"),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait::async_trait]
impl PageActions for ChromiumPage {
    async fn set_request_filter(&self, filter: Arc<dyn RequestFilter>) -> Result<()> {
        let handle =
            spawn_request_filter(self.page.clone(), filter, self.blocked_requests.clone()).await?;
        let previous = self
            .interceptor
            .lock()
            .map_err(|_| BrowserError::ChromiumError("interceptor lock poisoned".to_string()))?
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        Ok(())
    }

    async fn add_init_script(&self, source: &str) -> Result<()> {
        self.page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(source))
            .await?;
        Ok(())
    }

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let navigation = async {
            let response = self
                .page
                .execute(NavigateParams::new(url))
                .await
                .map_err(|e| BrowserError::NavigationError(e.to_string()))?;
            if let Some(error_text) = &response.result.error_text {
                return Err(BrowserError::NavigationError(format!("{url}: {error_text}")));
            }
            self.wait_for_dom(url).await
        };

        tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| {
                BrowserError::Timeout(format!(
                    "navigation to {url} after {}s",
                    timeout.as_secs()
                ))
            })?
    }

    async fn evaluate(&self, frame: &FrameTarget, script: &str) -> Result<serde_json::Value> {
        let mut builder = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true);
        if let Some(context_id) = self.execution_context(frame).await? {
            builder = builder.context_id(context_id);
        }
        let params = builder.build().map_err(BrowserError::EvaluationError)?;

        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn frames(&self) -> Result<Vec<FrameInfo>> {
        let main = self.page.mainframe().await?;
        let mut frames = Vec::new();
        for id in self.page.frames().await? {
            if main.as_ref() == Some(&id) {
                continue;
            }
            let url = self.page.frame_url(id.clone()).await?;
            let name = self.page.frame_name(id.clone()).await?;
            frames.push(FrameInfo {
                id: id.inner().clone(),
                url,
                name,
            });
        }
        Ok(frames)
    }

    async fn click_first_visible(
        &self,
        frame: &FrameTarget,
        selectors: &[&str],
        wait: Duration,
    ) -> Result<Option<String>> {
        let selectors = serde_json::to_string(selectors)
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?;
        let script = format!(
            r"(async () => {{
                const selectors = {selectors};
                const deadline = Date.now() + {wait_ms};
                const visible = (el) => {{
                    const style = window.getComputedStyle(el);
                    if (!style || style.display === 'none' || style.visibility === 'hidden') return false;
                    if (parseFloat(style.opacity || '1') === 0) return false;
                    const rect = el.getBoundingClientRect();
                    return rect.width > 0 && rect.height > 0;
                }};
                for (;;) {{
                    for (const selector of selectors) {{
                        let el = null;
                        try {{ el = document.querySelector(selector); }} catch (_) {{ continue; }}
                        if (el && visible(el)) {{
                            el.click();
                            return selector;
                        }}
                    }}
                    if (Date.now() >= deadline) return null;
                    await new Promise((r) => setTimeout(r, {poll_ms}));
                }}
            }})()",
            wait_ms = wait.as_millis(),
            poll_ms = POLL_INTERVAL.as_millis(),
        );
        evaluate_as(self, frame, &script).await
    }

    async fn scroll_metrics(&self) -> Result<ScrollMetrics> {
        evaluate_as(self, &FrameTarget::Main, SCROLL_METRICS_SCRIPT).await
    }

    async fn scroll_to(&self, y: f64) -> Result<()> {
        let y = if y.is_finite() { y.max(0.0) } else { 0.0 };
        self.evaluate(&FrameTarget::Main, &format!("window.scrollTo(0, {y}); true"))
            .await?;
        Ok(())
    }

    async fn element_rect(&self, target: &ElementTarget) -> Result<Option<ElementRect>> {
        let path = serde_json::to_string(&target.path)
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?;
        let script = format!(
            r"(() => {{
                let scope = document;
                let el = null;
                for (const selector of {path}) {{
                    try {{ el = scope.querySelector(selector); }} catch (_) {{ return null; }}
                    if (!el) return null;
                    scope = el.shadowRoot || el;
                }}
                if (!el) return null;
                const r = el.getBoundingClientRect();
                return {{ x: r.left, y: r.top, width: r.width, height: r.height }};
            }})()"
        );
        evaluate_as(self, &FrameTarget::Main, &script).await
    }

    async fn screenshot_full_page(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.page
            .screenshot(params)
            .await
            .map_err(|e| BrowserError::ScreenshotError(e.to_string()))
    }

    async fn close(&self) -> Result<()> {
        if let Ok(mut guard) = self.interceptor.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        tracing::debug!(blocked = self.blocked_requests(), "closing page");
        self.page.clone().close().await?;
        Ok(())
    }
}
