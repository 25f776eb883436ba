//! Force-hide selection.
//!
//! The overlay script reports known banner containers plus every fixed or
//! sticky element; [`select_for_hiding`] decides which of them to hide.
//! Hidden elements are reported as hidden on the next scan and skipped, so
//! repeated force-hide passes converge.

use crate::patterns::CompiledPatterns;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlaySource {
    /// Matched one of the container selectors
    Container,
    /// Fixed or sticky element found by the positional scan
    Positioned,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayCandidate {
    pub handle: u32,
    pub source: OverlaySource,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    pub hidden: bool,
    pub position: String,
    pub z_index: Option<i64>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverlayScan {
    pub viewport: Viewport,
    #[serde(default)]
    pub candidates: Vec<OverlayCandidate>,
}

/// Thresholds for force-hiding.
#[derive(Debug, Clone, Copy)]
pub struct ForceHidePolicy {
    /// Containers must be wider than this (px)
    pub min_container_width: f64,
    /// Containers must be taller than this (px)
    pub min_container_height: f64,
    /// Unrecognized overlays need at least this stacking order
    pub min_z_index: i64,
    /// Unrecognized overlays must cover more than this share of the viewport width
    pub min_width_ratio: f64,
    /// Unrecognized overlays must cover more than this share of the viewport height
    pub min_height_ratio: f64,
}

impl Default for ForceHidePolicy {
    fn default() -> Self {
        Self {
            min_container_width: 100.0,
            min_container_height: 40.0,
            min_z_index: 1000,
            min_width_ratio: 0.5,
            min_height_ratio: 0.3,
        }
    }
}

impl ForceHidePolicy {
    fn hides_container(&self, c: &OverlayCandidate) -> bool {
        c.width > self.min_container_width
            && c.height > self.min_container_height
            && c.opacity > 0.0
    }

    fn hides_overlay(
        &self,
        c: &OverlayCandidate,
        viewport: Viewport,
        patterns: &CompiledPatterns,
    ) -> bool {
        matches!(c.position.as_str(), "fixed" | "sticky")
            && c.z_index.is_some_and(|z| z >= self.min_z_index)
            && c.width > viewport.width * self.min_width_ratio
            && c.height > viewport.height * self.min_height_ratio
            && patterns.mentions_consent(&c.text)
    }
}

/// Handles of the reported elements that should be hidden.
pub fn select_for_hiding(
    scan: &OverlayScan,
    policy: &ForceHidePolicy,
    patterns: &CompiledPatterns,
) -> Vec<u32> {
    scan.candidates
        .iter()
        .filter(|c| !c.hidden)
        .filter(|c| match c.source {
            OverlaySource::Container => policy.hides_container(c),
            OverlaySource::Positioned => policy.hides_overlay(c, scan.viewport, patterns),
        })
        .map(|c| c.handle)
        .collect()
}
