//! Scan data model shared by the scanner and the HTTP surface.

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of URLs scanned per request; extra URLs are dropped.
pub const MAX_URLS_PER_REQUEST: usize = 2;

/// An ordered, validated list of URLs to scan.
///
/// Never empty and never longer than [`MAX_URLS_PER_REQUEST`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    urls: Vec<String>,
}

impl ScanRequest {
    /// Build a request, truncating to the per-request cap.
    ///
    /// Truncation happens before validation so results stay positionally
    /// matched to the first URLs the caller sent.
    ///
    /// # Errors
    /// Returns a validation error if no URL is given, if a kept entry is
    /// blank, or if a URL is not an absolute http(s) URL.
    pub fn new(mut urls: Vec<String>) -> Result<Self, CoreError> {
        if urls.len() > MAX_URLS_PER_REQUEST {
            tracing::debug!(
                requested = urls.len(),
                cap = MAX_URLS_PER_REQUEST,
                "truncating scan request"
            );
            urls.truncate(MAX_URLS_PER_REQUEST);
        }

        let urls: Vec<String> = urls.iter().map(|u| u.trim().to_string()).collect();

        if urls.iter().all(String::is_empty) {
            return Err(CoreError::Validation("URL is required".to_string()));
        }

        for (position, url) in urls.iter().enumerate() {
            if url.is_empty() {
                return Err(CoreError::Validation(format!(
                    "URL at position {position} is empty"
                )));
            }
            Self::validate_url(url)?;
        }

        Ok(Self { urls })
    }

    /// The URLs to scan, in request order.
    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    fn validate_url(raw: &str) -> Result<(), CoreError> {
        let parsed = url::Url::parse(raw)
            .map_err(|e| CoreError::Validation(format!("invalid URL '{raw}': {e}")))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(CoreError::Validation(format!(
                "unsupported URL scheme '{other}' in '{raw}'"
            ))),
        }
    }
}

/// Severity reported by the audit engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Minor
    Minor,
    /// Moderate
    Moderate,
    /// Serious
    Serious,
    /// Critical
    Critical,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Serious => "serious",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Integer pixel rectangle in full-page coordinates.
///
/// Width and height are always positive; use [`BoundingBox::new`] or
/// [`BoundingBox::from_viewport_rect`], which return `None` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: i64,
    /// Top edge, measured from the top of the document
    pub y: i64,
    /// Width in pixels (> 0)
    pub width: u32,
    /// Height in pixels (> 0)
    pub height: u32,
}

impl BoundingBox {
    /// Create a box, rejecting zero-sized rectangles.
    #[must_use]
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Convert a viewport-relative rectangle to full-page coordinates.
    ///
    /// `scroll_y` is the vertical scroll offset at measurement time. Sizes
    /// are rounded; anything that rounds to zero (or is not finite) is
    /// discarded.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_viewport_rect(x: f64, y: f64, width: f64, height: f64, scroll_y: f64) -> Option<Self> {
        if ![x, y, width, height, scroll_y].iter().all(|v| v.is_finite()) {
            return None;
        }
        let w = width.round();
        let h = height.round();
        if w < 1.0 || h < 1.0 || w > f64::from(u32::MAX) || h > f64::from(u32::MAX) {
            return None;
        }
        Self::new(
            x.round() as i64,
            (y + scroll_y).round() as i64,
            w as u32,
            h as u32,
        )
    }
}

/// One audit rule violation, annotated with element geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule identifier (e.g. `color-contrast`)
    pub id: String,
    /// Severity
    pub impact: Impact,
    /// Human-readable description of the rule
    pub description: String,
    /// Short remediation hint
    #[serde(default)]
    pub help: String,
    /// Number of affected elements
    #[serde(rename = "nodes")]
    pub node_count: usize,
    /// Boxes for the affected elements that could be located, in node order
    pub boxes: Vec<BoundingBox>,
}

/// The outcome of scanning one URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// The scanned URL as requested
    pub url: String,
    /// Violations found after banner suppression
    pub violations: Vec<Violation>,
    /// Full-page PNG screenshot, base64 in JSON
    #[serde(with = "base64_bytes")]
    pub screenshot: Vec<u8>,
    /// Page width (the fixed viewport width)
    pub page_width: u32,
    /// Measured document height
    pub page_height: u32,
    /// When the scan finished
    pub scanned_at: DateTime<Utc>,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_request_rejected() {
        let err = ScanRequest::new(vec![]).unwrap_err();
        assert!(err.is_client_error());

        let err = ScanRequest::new(vec!["   ".to_string()]).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_request_truncated_to_cap() {
        let request = ScanRequest::new(vec![
            "https://a.example".to_string(),
            "https://b.example".to_string(),
            "https://c.example".to_string(),
        ])
        .expect("valid request");
        assert_eq!(
            request.urls(),
            ["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_blank_entry_keeps_positions() {
        let err = ScanRequest::new(vec![
            "https://a.example".to_string(),
            " ".to_string(),
            "https://c.example".to_string(),
        ])
        .unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("position 1"));

        let err = ScanRequest::new(vec![String::new(), "  ".to_string()]).unwrap_err();
        assert!(err.to_string().contains("URL is required"));

        // A blank entry past the cap is dropped with the rest of the tail
        let request = ScanRequest::new(vec![
            " https://a.example ".to_string(),
            "https://b.example".to_string(),
            String::new(),
        ])
        .expect("valid request");
        assert_eq!(
            request.urls(),
            ["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_request_rejects_non_http_url() {
        assert!(ScanRequest::new(vec!["example.com".to_string()]).is_err());
        assert!(ScanRequest::new(vec!["file:///etc/passwd".to_string()]).is_err());
    }

    #[test]
    fn test_bounding_box_rejects_degenerate() {
        assert!(BoundingBox::new(0, 0, 0, 10).is_none());
        assert!(BoundingBox::new(0, 0, 10, 0).is_none());
        assert!(BoundingBox::new(-5, 3, 1, 1).is_some());
    }

    #[test]
    fn test_viewport_rect_conversion_adds_scroll() {
        let bbox = BoundingBox::from_viewport_rect(10.4, 20.6, 99.5, 30.2, 500.0).expect("box");
        assert_eq!(bbox, BoundingBox { x: 10, y: 521, width: 100, height: 30 });
    }

    #[test]
    fn test_viewport_rect_conversion_discards_hidden() {
        assert!(BoundingBox::from_viewport_rect(0.0, 0.0, 0.0, 0.0, 0.0).is_none());
        assert!(BoundingBox::from_viewport_rect(0.0, 0.0, 0.3, 40.0, 0.0).is_none());
        assert!(BoundingBox::from_viewport_rect(f64::NAN, 0.0, 10.0, 10.0, 0.0).is_none());
    }

    #[test]
    fn test_impact_serialization() {
        let json = serde_json::to_string(&Impact::Serious).expect("serialize");
        assert_eq!(json, "\"serious\"");
        let parsed: Impact = serde_json::from_str("\"critical\"").expect("parse");
        assert_eq!(parsed, Impact::Critical);
        assert!(Impact::Critical > Impact::Minor);
    }

    #[test]
    fn test_scan_result_json_shape() {
        let result = ScanResult {
            url: "https://example.com".to_string(),
            violations: vec![Violation {
                id: "image-alt".to_string(),
                impact: Impact::Critical,
                description: "Images must have alternate text".to_string(),
                help: String::new(),
                node_count: 1,
                boxes: vec![BoundingBox::new(1, 2, 3, 4).expect("box")],
            }],
            screenshot: vec![0x89, b'P', b'N', b'G'],
            page_width: 1440,
            page_height: 2000,
            scanned_at: Utc::now(),
        };

        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(value["pageWidth"], 1440);
        assert_eq!(value["pageHeight"], 2000);
        assert_eq!(value["screenshot"], "iVBORw==");
        assert_eq!(value["violations"][0]["nodes"], 1);
        assert_eq!(value["violations"][0]["boxes"][0]["width"], 3);

        let back: ScanResult = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back.screenshot, result.screenshot);
    }
}
