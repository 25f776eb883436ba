//! Accessibility-audit collaborator.
//!
//! The pipeline only needs "run the audit over the current document";
//! [`AxeAuditor`] does that with an axe-core bundle injected into the page.

use crate::error::{Result, ScanError};
use async_trait::async_trait;
use lumen_browser::{ElementTarget, FrameTarget, PageActions};
use lumen_core::{AuditConfig, Impact};
use serde::Deserialize;
use std::sync::Arc;

/// A rule violation as reported by the audit engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuditViolation {
    pub id: String,
    /// axe reports `null` for some incomplete checks
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub nodes: Vec<AuditNode>,
}

/// One element affected by a violation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuditNode {
    #[serde(default)]
    pub target: Vec<TargetSelector>,
}

/// An entry of an axe `target`: a plain selector, or a path through shadow roots.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TargetSelector {
    Selector(String),
    ShadowPath(Vec<String>),
}

impl AuditNode {
    /// Where to find this node in the top-level document.
    ///
    /// Only the first target entry is used. Later entries address documents
    /// inside iframes, which are not measured.
    pub fn element_target(&self) -> Option<ElementTarget> {
        let path = match self.target.first()? {
            TargetSelector::Selector(selector) => vec![selector.clone()],
            TargetSelector::ShadowPath(path) => path.clone(),
        };
        if path.is_empty() || path.iter().any(|s| s.trim().is_empty()) {
            return None;
        }
        Some(ElementTarget { path })
    }
}

#[async_trait]
pub trait AuditEngine: Send + Sync {
    /// Audit the page's current document.
    async fn audit(&self, page: &dyn PageActions) -> Result<Vec<AuditViolation>>;
}

const AXE_PRESENT: &str = "typeof window.axe !== 'undefined' && typeof window.axe.run === 'function'";

const AXE_RUN: &str = r"(async () => {
    const results = await window.axe.run(document, { resultTypes: ['violations'] });
    return results.violations.map((v) => ({
        id: v.id,
        impact: v.impact || null,
        description: v.description,
        help: v.help,
        nodes: v.nodes.map((n) => ({ target: n.target })),
    }));
})()";

/// Runs axe-core inside the page.
#[derive(Clone)]
pub struct AxeAuditor {
    source: Arc<str>,
}

impl std::fmt::Debug for AxeAuditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxeAuditor")
            .field("source_len", &self.source.len())
            .finish()
    }
}

impl AxeAuditor {
    /// Use an axe-core bundle already in memory.
    pub fn from_source(source: impl Into<Arc<str>>) -> Result<Self> {
        let source = source.into();
        if source.trim().is_empty() {
            return Err(ScanError::AuditSetup("axe-core bundle is empty".to_string()));
        }
        Ok(Self { source })
    }

    /// Read the bundle from `axe_script_path`, or download it from
    /// `axe_script_url` when no path is configured.
    pub async fn load(config: &AuditConfig) -> Result<Self> {
        if let Some(path) = &config.axe_script_path {
            let source = tokio::fs::read_to_string(path).await.map_err(|e| {
                ScanError::AuditSetup(format!("could not read {}: {e}", path.display()))
            })?;
            tracing::info!(path = %path.display(), bytes = source.len(), "loaded axe-core bundle");
            return Self::from_source(source);
        }

        let url = &config.axe_script_url;
        let source = reqwest::get(url)
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ScanError::AuditSetup(format!("could not download {url}: {e}")))?
            .text()
            .await
            .map_err(|e| ScanError::AuditSetup(format!("could not read {url}: {e}")))?;
        tracing::info!(%url, bytes = source.len(), "downloaded axe-core bundle");
        Self::from_source(source)
    }
}

#[async_trait]
impl AuditEngine for AxeAuditor {
    async fn audit(&self, page: &dyn PageActions) -> Result<Vec<AuditViolation>> {
        let audit_error = |e: lumen_browser::BrowserError| ScanError::Audit(e.to_string());

        let present = page
            .evaluate(&FrameTarget::Main, AXE_PRESENT)
            .await
            .map_err(audit_error)?;
        if present != serde_json::Value::Bool(true) {
            page.evaluate(&FrameTarget::Main, &self.source)
                .await
                .map_err(audit_error)?;
        }

        let value = page
            .evaluate(&FrameTarget::Main, AXE_RUN)
            .await
            .map_err(audit_error)?;
        let violations: Vec<AuditViolation> = serde_json::from_value(value)
            .map_err(|e| ScanError::Audit(format!("unexpected axe result: {e}")))?;

        tracing::debug!(violations = violations.len(), "audit complete");
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_axe_violation() {
        let json = serde_json::json!([{
            "id": "color-contrast",
            "impact": "serious",
            "description": "Ensures the contrast between foreground and background colors meets WCAG 2 AA",
            "help": "Elements must have sufficient color contrast",
            "nodes": [
                { "target": ["#hero > p"] },
                { "target": [["my-widget", "button.primary"]] },
                { "target": [] }
            ]
        }]);
        let parsed: Vec<AuditViolation> = serde_json::from_value(json).unwrap();
        let violation = &parsed[0];
        assert_eq!(violation.impact, Some(Impact::Serious));
        assert_eq!(violation.nodes.len(), 3);

        assert_eq!(
            violation.nodes[0].element_target(),
            Some(ElementTarget::selector("#hero > p"))
        );
        assert_eq!(
            violation.nodes[1].element_target().unwrap().path,
            vec!["my-widget".to_string(), "button.primary".to_string()]
        );
        assert!(violation.nodes[2].element_target().is_none());
    }

    #[test]
    fn test_null_impact() {
        let json = serde_json::json!([{ "id": "region", "impact": null, "nodes": [] }]);
        let parsed: Vec<AuditViolation> = serde_json::from_value(json).unwrap();
        assert!(parsed[0].impact.is_none());
        assert!(parsed[0].description.is_empty());
    }

    #[test]
    fn test_empty_bundle_rejected() {
        assert!(matches!(
            AxeAuditor::from_source("  "),
            Err(ScanError::AuditSetup(_))
        ));
    }

    #[tokio::test]
    async fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "window.axe = {{ run: async () => ({{ violations: [] }}) }};").unwrap();

        let config = AuditConfig {
            axe_script_path: Some(file.path().to_path_buf()),
            ..AuditConfig::default()
        };
        let auditor = AxeAuditor::load(&config).await.unwrap();
        assert!(auditor.source.contains("window.axe"));
    }

    #[tokio::test]
    async fn test_load_missing_path() {
        let config = AuditConfig {
            axe_script_path: Some("/nonexistent/axe.min.js".into()),
            ..AuditConfig::default()
        };
        let err = AxeAuditor::load(&config).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/axe.min.js"));
    }
}
