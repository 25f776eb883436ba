//! Violation geometry.
//!
//! Boxes enrich violations; they never filter them. A violation whose nodes
//! cannot be located is still reported, with an empty box list.

use crate::audit::AuditViolation;
use crate::error::Result;
use lumen_browser::PageActions;
use lumen_core::{BoundingBox, Impact, Violation};

/// Attach full-page bounding boxes to audit findings, preserving their order.
pub async fn resolve_boxes(
    page: &dyn PageActions,
    findings: Vec<AuditViolation>,
) -> Result<Vec<Violation>> {
    let scroll_y = page.scroll_metrics().await?.y;
    let mut violations = Vec::with_capacity(findings.len());

    for finding in findings {
        let mut boxes = Vec::new();
        for node in &finding.nodes {
            let Some(target) = node.element_target() else {
                continue;
            };
            let Some(rect) = page.element_rect(&target).await? else {
                tracing::trace!(rule = %finding.id, target = ?target.path, "node not found");
                continue;
            };
            if let Some(bbox) =
                BoundingBox::from_viewport_rect(rect.x, rect.y, rect.width, rect.height, scroll_y)
            {
                boxes.push(bbox);
            }
        }

        let impact = finding.impact.unwrap_or_else(|| {
            tracing::debug!(rule = %finding.id, "violation without impact, reporting as minor");
            Impact::Minor
        });

        violations.push(Violation {
            id: finding.id,
            impact,
            description: finding.description,
            help: finding.help,
            node_count: finding.nodes.len(),
            boxes,
        });
    }

    Ok(violations)
}
