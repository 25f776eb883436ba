use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    LaunchError(String),

    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("script evaluation failed: {0}")]
    EvaluationError(String),

    #[error("frame detached: {0}")]
    FrameDetached(String),

    #[error("screenshot failed: {0}")]
    ScreenshotError(String),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::ChromiumError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrowserError::NavigationError("net::ERR_NAME_NOT_RESOLVED".to_string());
        assert_eq!(
            err.to_string(),
            "navigation failed: net::ERR_NAME_NOT_RESOLVED"
        );
    }

    #[test]
    fn test_timeout_error() {
        let err = BrowserError::Timeout("navigation to https://example.com after 45s".to_string());
        assert!(err.to_string().contains("45s"));
    }
}
