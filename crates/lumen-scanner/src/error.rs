use lumen_browser::BrowserError;
use lumen_consent::ConsentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("could not start browser: {0}")]
    Launch(#[source] BrowserError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Consent suppression failed: {0}")]
    Consent(#[from] ConsentError),

    #[error("Accessibility audit failed: {0}")]
    Audit(String),

    #[error("Audit engine unavailable: {0}")]
    AuditSetup(String),

    #[error("Scan of {url} failed: {source}")]
    Url {
        url: String,
        #[source]
        source: Box<ScanError>,
    },
}

impl ScanError {
    /// Scope this error to the URL whose scan produced it.
    #[must_use]
    pub fn for_url(self, url: &str) -> Self {
        match self {
            Self::Url { .. } => self,
            other => Self::Url {
                url: url.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// URL the failure is scoped to, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url { url, .. } => Some(url),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
