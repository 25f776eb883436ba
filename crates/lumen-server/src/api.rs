//! Request and response bodies of `POST /scan`.

use lumen_core::{CoreError, ScanRequest, ScanResult};
use serde::{Deserialize, Serialize};

/// `url` accepts a single URL or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UrlInput {
    One(String),
    Many(Vec<String>),
}

/// Body of `POST /scan`: `{"url": "..."}`, `{"url": [...]}` or `{"urls": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanBody {
    #[serde(default)]
    pub url: Option<UrlInput>,
    #[serde(default)]
    pub urls: Option<Vec<String>>,
}

/// Whether the caller sent one URL or a list; decides the response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Single,
    List,
}

impl ScanBody {
    /// Validate into a scan request. `url` wins over `urls` when both are sent.
    pub fn into_request(self) -> Result<(ScanRequest, ResponseShape), CoreError> {
        let (urls, shape) = match (self.url, self.urls) {
            (Some(UrlInput::One(url)), _) => (vec![url], ResponseShape::Single),
            (Some(UrlInput::Many(urls)), _) | (None, Some(urls)) => (urls, ResponseShape::List),
            (None, None) => (Vec::new(), ResponseShape::Single),
        };
        Ok((ScanRequest::new(urls)?, shape))
    }
}

/// List-form response. When exactly one URL was requested its result is
/// also flattened at the top level.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<ScanResult>,
    #[serde(flatten)]
    pub first: Option<ScanResult>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ScanResponse {
    Single(ScanResult),
    Batch(BatchResponse),
}

impl ScanResponse {
    pub fn new(shape: ResponseShape, mut results: Vec<ScanResult>) -> Self {
        match shape {
            ResponseShape::Single if results.len() == 1 => Self::Single(results.remove(0)),
            _ => {
                let first = (results.len() == 1).then(|| results[0].clone());
                Self::Batch(BatchResponse { results, first })
            }
        }
    }
}
