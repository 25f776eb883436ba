use lumen_browser::BrowserError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsentError>;

#[derive(Debug, Error)]
pub enum ConsentError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("unexpected page payload: {0}")]
    Payload(String),
}

impl From<serde_json::Error> for ConsentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}
