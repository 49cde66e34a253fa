//! Cache adapter error type. Never leaves the adapter: failures are logged
//! and recovered.

/// Errors reading or writing the cache document.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
