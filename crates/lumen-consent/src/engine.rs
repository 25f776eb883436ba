//! Layered consent-banner suppression.
//!
//! Layers, in the order a scan applies them:
//!
//! 1. Network blocking of consent-platform hosts ([`BlockList`])
//! 2. A proactive watcher registered before any page script runs
//! 3. Reactive dismissal: accept selectors, then accept-phrase labels,
//!    then the same two inside consent iframes
//! 4. A shadow-DOM aware fallback when nothing reactive matched
//! 5. Force-hiding of whatever banner UI is still visible
//!
//! Reactive dismissal plus fallback runs as a multi-pass loop so banners
//! that mount late are still caught.

use crate::error::Result;
use crate::frames::{consent_frames, FrameHint};
use crate::network::BlockList;
use crate::overlay::{select_for_hiding, ForceHidePolicy, OverlayScan};
use crate::patterns::{compiled, CompiledPatterns};
use crate::scripts;
use crate::tree::{find_accept, find_accept_phrase, HarvestedScope};
use lumen_browser::{FrameTarget, PageActions};
use lumen_core::ScanningConfig;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Delays used by the dismissal loop.
#[derive(Debug, Clone)]
pub struct SuppressionTiming {
    /// Wait before each pass; the loop runs one pass per entry
    pub pass_delays: Vec<Duration>,
    /// Wait after a successful click for the banner to animate out
    pub click_settle: Duration,
    /// Bounded wait for an accept selector to become visible
    pub visibility_wait: Duration,
}

impl SuppressionTiming {
    pub fn from_config(config: &ScanningConfig) -> Self {
        Self {
            pass_delays: config
                .pass_delays_ms
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
            click_settle: Duration::from_millis(config.click_settle_ms),
            visibility_wait: Duration::from_millis(config.visibility_timeout_ms),
        }
    }
}

impl Default for SuppressionTiming {
    fn default() -> Self {
        Self::from_config(&ScanningConfig::default())
    }
}

/// Which layer dismissed a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissalTier {
    AcceptSelector,
    AcceptText,
    ConsentFrame,
    ShadowDom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dismissal {
    pub tier: DismissalTier,
    /// Selector or label of the clicked control
    pub control: String,
    /// Frame id when the control lived in a consent iframe
    pub frame: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DismissReport {
    /// Passes that ran, including the successful one
    pub passes: usize,
    pub dismissal: Option<Dismissal>,
}

impl DismissReport {
    pub fn dismissed(&self) -> bool {
        self.dismissal.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForceHideReport {
    /// Elements the overlay scan reported
    pub examined: usize,
    /// Elements hidden by this call
    pub hidden: usize,
    /// Scroll containers whose lock was reset
    pub unlocked: usize,
}

/// Applies every suppression layer to a page.
#[derive(Debug, Clone)]
pub struct SuppressionEngine {
    patterns: &'static CompiledPatterns,
    timing: SuppressionTiming,
    policy: ForceHidePolicy,
    block_list: Arc<BlockList>,
}

impl SuppressionEngine {
    pub fn new(timing: SuppressionTiming) -> Self {
        let patterns = compiled();
        Self {
            patterns,
            timing,
            policy: ForceHidePolicy::default(),
            block_list: Arc::new(BlockList::from_tables(patterns.tables())),
        }
    }

    pub fn from_config(config: &ScanningConfig) -> Self {
        Self::new(SuppressionTiming::from_config(config))
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ForceHidePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn timing(&self) -> &SuppressionTiming {
        &self.timing
    }

    pub fn block_list(&self) -> Arc<BlockList> {
        self.block_list.clone()
    }

    pub fn proactive_script(&self) -> String {
        scripts::proactive(self.patterns.tables())
    }

    /// Install network blocking and the proactive watcher.
    ///
    /// Must run before the first navigation so both apply from the first
    /// request and the first document.
    pub async fn install(&self, page: &dyn PageActions) -> Result<()> {
        page.set_request_filter(self.block_list()).await?;
        page.add_init_script(&self.proactive_script()).await?;
        tracing::debug!(
            domains = self.block_list.len(),
            tables = self.patterns.tables().version,
            "consent suppression installed"
        );
        Ok(())
    }

    /// Run dismissal passes until one succeeds or the schedule is exhausted.
    pub async fn dismiss(&self, page: &dyn PageActions) -> Result<DismissReport> {
        let mut report = DismissReport::default();

        for (pass, delay) in self.timing.pass_delays.iter().enumerate() {
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }
            report.passes = pass + 1;

            if let Some(dismissal) = self.dismiss_once(page).await? {
                report.dismissal = Some(dismissal);
                break;
            }
            tracing::debug!(pass = pass + 1, "no consent control found");
        }

        Ok(report)
    }

    /// One reactive attempt followed, if nothing matched, by the shadow-DOM
    /// fallback. Settles after a successful click.
    pub async fn dismiss_once(&self, page: &dyn PageActions) -> Result<Option<Dismissal>> {
        let dismissal = match self.reactive(page).await? {
            Some(dismissal) => Some(dismissal),
            None => self.shadow_fallback(page).await?,
        };

        if let Some(dismissal) = &dismissal {
            tracing::info!(
                tier = ?dismissal.tier,
                control = %dismissal.control,
                frame = dismissal.frame.as_deref().unwrap_or("main"),
                "consent banner dismissed"
            );
            tokio::time::sleep(self.timing.click_settle).await;
        }

        Ok(dismissal)
    }

    /// Hide remaining banner containers and consent overlays, then reset
    /// scroll locks. Safe to call repeatedly.
    pub async fn force_hide(&self, page: &dyn PageActions) -> Result<ForceHideReport> {
        let scan: OverlayScan = self
            .run(page, &FrameTarget::Main, &scripts::overlays(self.patterns.tables()))
            .await?;
        let handles = select_for_hiding(&scan, &self.policy, self.patterns);

        let hidden: usize = if handles.is_empty() {
            0
        } else {
            self.run(page, &FrameTarget::Main, &scripts::hide(&handles))
                .await?
        };
        let unlocked = self.unlock_scroll(page).await?;

        let report = ForceHideReport {
            examined: scan.candidates.len(),
            hidden,
            unlocked,
        };
        if report.hidden > 0 {
            tracing::info!(hidden = report.hidden, "force-hid consent overlays");
        }
        Ok(report)
    }

    /// Reset `overflow: hidden` on the root and body.
    pub async fn unlock_scroll(&self, page: &dyn PageActions) -> Result<usize> {
        self.run(page, &FrameTarget::Main, &scripts::unlock_scroll())
            .await
    }

    async fn reactive(&self, page: &dyn PageActions) -> Result<Option<Dismissal>> {
        if let Some((tier, control)) = self.dismiss_in(page, &FrameTarget::Main).await? {
            return Ok(Some(Dismissal {
                tier,
                control,
                frame: None,
            }));
        }

        let hints: Vec<FrameHint> = self
            .run(
                page,
                &FrameTarget::Main,
                &scripts::frame_hints(self.patterns.tables()),
            )
            .await?;
        if hints.is_empty() {
            return Ok(None);
        }

        let frames = page.frames().await?;
        for frame in consent_frames(&hints, &frames) {
            let target = FrameTarget::Frame(frame.id.clone());
            match self.dismiss_in(page, &target).await {
                Ok(Some((_, control))) => {
                    return Ok(Some(Dismissal {
                        tier: DismissalTier::ConsentFrame,
                        control,
                        frame: Some(frame.id),
                    }))
                }
                Ok(None) => {}
                // Consent iframes navigate and detach freely
                Err(e) => tracing::warn!(frame = %frame.id, error = %e, "consent frame unreachable"),
            }
        }

        Ok(None)
    }

    /// Accept selectors, then accept-phrase labels, within one document.
    async fn dismiss_in(
        &self,
        page: &dyn PageActions,
        frame: &FrameTarget,
    ) -> Result<Option<(DismissalTier, String)>> {
        let selectors = self.patterns.tables().accept_selectors;
        if let Some(selector) = page
            .click_first_visible(frame, selectors, self.timing.visibility_wait)
            .await?
        {
            return Ok(Some((DismissalTier::AcceptSelector, selector)));
        }

        let scope: HarvestedScope = self.run(page, frame, &scripts::harvest(false)).await?;
        if let Some(candidate) = find_accept_phrase(&scope, self.patterns) {
            if self.click(page, frame, candidate.handle).await? {
                return Ok(Some((DismissalTier::AcceptText, candidate.text)));
            }
        }

        Ok(None)
    }

    async fn shadow_fallback(&self, page: &dyn PageActions) -> Result<Option<Dismissal>> {
        let root: HarvestedScope = self
            .run(page, &FrameTarget::Main, &scripts::harvest(true))
            .await?;
        let Some(found) = find_accept(&root, self.patterns) else {
            return Ok(None);
        };
        tracing::debug!(kind = ?found.kind, depth = found.depth, text = %found.text, "fallback accept control");

        if !self.click(page, &FrameTarget::Main, found.handle).await? {
            return Ok(None);
        }
        Ok(Some(Dismissal {
            tier: DismissalTier::ShadowDom,
            control: found.text,
            frame: None,
        }))
    }

    async fn click(&self, page: &dyn PageActions, frame: &FrameTarget, handle: u32) -> Result<bool> {
        self.run(page, frame, &scripts::click(handle)).await
    }

    async fn run<T: DeserializeOwned>(
        &self,
        page: &dyn PageActions,
        frame: &FrameTarget,
        script: &str,
    ) -> Result<T> {
        let value = page.evaluate(frame, script).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl Default for SuppressionEngine {
    fn default() -> Self {
        Self::new(SuppressionTiming::default())
    }
}
