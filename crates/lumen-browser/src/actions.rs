use crate::error::{BrowserError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Starts browser processes.
#[async_trait::async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a browser process.
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>>;
}

/// A running browser process shared by the pages of one request.
#[async_trait::async_trait]
pub trait BrowserHandle: Send + Sync {
    /// Open a new blank page.
    async fn new_page(&self) -> Result<Box<dyn PageActions>>;

    /// Shut the browser down. Consumes the handle so it closes once.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Decides which outgoing requests a page may make.
pub trait RequestFilter: Send + Sync {
    /// Return `true` to abort the request.
    fn should_block(&self, url: &str) -> bool;
}

/// Which document a script runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameTarget {
    /// The top-level document
    Main,
    /// A sub-frame by id
    Frame(String),
}

/// A sub-frame of the page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameInfo {
    /// Browser-assigned frame id
    pub id: String,
    /// Current frame URL
    pub url: Option<String>,
    /// Frame `name` attribute
    pub name: Option<String>,
}

/// Vertical scroll state of the top-level document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    /// Current vertical offset
    pub y: f64,
    /// Total document height
    pub scroll_height: f64,
    /// Viewport height
    pub viewport_height: f64,
}

/// Viewport-relative element rectangle, as reported by the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Selector path to an element. Each step after the first is resolved
/// inside the shadow root of the previous match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementTarget {
    pub path: Vec<String>,
}

impl ElementTarget {
    pub fn selector(selector: impl Into<String>) -> Self {
        Self {
            path: vec![selector.into()],
        }
    }
}

/// Page-level automation used by the scan pipeline.
#[async_trait::async_trait]
pub trait PageActions: Send + Sync {
    /// Route every outgoing request through `filter` from now on.
    async fn set_request_filter(&self, filter: Arc<dyn RequestFilter>) -> Result<()>;

    /// Register a script that runs before any page script in every new document.
    async fn add_init_script(&self, source: &str) -> Result<()>;

    /// Navigate and wait until the DOM is parsed (not for subresources).
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Evaluate a script, awaiting promises, and return its JSON value.
    async fn evaluate(&self, frame: &FrameTarget, script: &str) -> Result<serde_json::Value>;

    /// List sub-frames (the main frame is excluded).
    async fn frames(&self) -> Result<Vec<FrameInfo>>;

    /// Click the first selector whose element becomes visible within `wait`.
    /// Returns the selector that was clicked.
    async fn click_first_visible(
        &self,
        frame: &FrameTarget,
        selectors: &[&str],
        wait: Duration,
    ) -> Result<Option<String>>;

    async fn scroll_metrics(&self) -> Result<ScrollMetrics>;

    async fn scroll_to(&self, y: f64) -> Result<()>;

    /// Locate an element and return its viewport-relative rectangle.
    async fn element_rect(&self, target: &ElementTarget) -> Result<Option<ElementRect>>;

    /// Capture the whole document as PNG.
    async fn screenshot_full_page(&self) -> Result<Vec<u8>>;

    async fn close(&self) -> Result<()>;
}

/// Evaluate a script and deserialize its result.
pub async fn evaluate_as<T, P>(page: &P, frame: &FrameTarget, script: &str) -> Result<T>
where
    T: DeserializeOwned,
    P: PageActions + ?Sized,
{
    let value = page.evaluate(frame, script).await?;
    serde_json::from_value(value)
        .map_err(|e| BrowserError::EvaluationError(format!("unexpected script result: {e}")))
}

/// Helper to extract the host from a URL
pub fn extract_host(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_ascii_lowercase())
}
