//! Google Sheets adapter error types.

use std::path::PathBuf;

use cardtrail_domain::error::TrackerError;

/// Errors authenticating against or writing to Google Sheets.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("invalid sheets base URL {0}")]
    BaseUrl(String),

    #[error("{context} returned status {status}: {body}")]
    Status {
        context: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to read service account key {}", path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid service account key")]
    KeyFormat(#[from] serde_json::Error),

    #[error("failed to sign token assertion")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl From<SheetsError> for TrackerError {
    fn from(err: SheetsError) -> Self {
        Self::Storage(Box::new(err))
    }
}
