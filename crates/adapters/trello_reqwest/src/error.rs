//! Trello adapter error types.

use cardtrail_domain::error::TrackerError;

/// Errors talking to the Trello REST API.
#[derive(Debug, thiserror::Error)]
pub enum TrelloError {
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("GET {path} returned status {status}")]
    Status { status: u16, path: String },
}

impl TrelloError {
    /// Wrap a failed request, dropping the URL and its credential parameters.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

impl From<TrelloError> for TrackerError {
    fn from(err: TrelloError) -> Self {
        Self::Remote(Box::new(err))
    }
}
