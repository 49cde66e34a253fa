//! # cardtrail-adapter-cache-json
//!
//! [`CacheStore`] implementation over a single JSON document on disk.
//!
//! ## Document format
//! One JSON object mapping cache keys to entries:
//!
//! ```json
//! {
//!   "boards": { "timestamp": 1735689600000, "data": [ … ] },
//!   "board-5f1a-cards": { "timestamp": 1735689600000, "data": [ … ] }
//! }
//! ```
//!
//! Entries are decoded one at a time on lookup: an entry that does not fit
//! the `{timestamp, data}` shape is a miss for its own key only, and a `put`
//! carries every other entry over as it found it.
//!
//! ## Concurrency
//! Every `put` re-reads the document, upserts its own key, and writes the
//! result through a temporary file and a rename, all under one async mutex.
//! Concurrent puts from the same process therefore never drop each other's
//! entries, and a crash mid-write leaves the previous document intact.
//!
//! ## Dependency rule
//! Depends on `cardtrail-app` (for the port trait) and `cardtrail-domain`.

mod error;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use tokio::sync::Mutex;

use cardtrail_app::ports::CacheStore;
use cardtrail_domain::cache::{CacheEntry, CacheKey, default_freshness};
use cardtrail_domain::time::now;

pub use error::CacheError;

type Document = BTreeMap<CacheKey, serde_json::Value>;

/// Default location of the cache document.
pub const DEFAULT_PATH: &str = "cache/cache.json";

/// File-backed cache with a freshness window.
pub struct JsonFileCache {
    path: PathBuf,
    freshness: TimeDelta,
    write_lock: Mutex<()>,
}

impl JsonFileCache {
    /// Cache stored at `path` with the default 24-hour freshness window.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            freshness: default_freshness(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_freshness(mut self, freshness: TimeDelta) -> Self {
        self.freshness = freshness;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document. Missing or unreadable documents are empty.
    async fn load(&self) -> Document {
        match self.try_load().await {
            Ok(Some(document)) => document,
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no cache file, starting empty");
                Document::new()
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    path = %self.path.display(),
                    "failed to load cache file, starting empty"
                );
                Document::new()
            }
        }
    }

    async fn try_load(&self) -> Result<Option<Document>, CacheError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn save(&self, document: &Document) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_vec_pretty(document)?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, content).await?;
        if let Err(err) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err.into());
        }
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CacheStore for JsonFileCache {
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let mut document = self.load().await;
        let raw = document.remove(key)?;
        let entry: CacheEntry = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, %key, "ignoring malformed cache entry");
                return None;
            }
        };
        if entry.is_fresh(now(), self.freshness) {
            Some(entry)
        } else {
            tracing::debug!(%key, fetched_at = %entry.fetched_at, "cache entry is stale");
            None
        }
    }

    async fn put(&self, key: &CacheKey, payload: serde_json::Value) {
        let _guard = self.write_lock.lock().await;
        let entry = match serde_json::to_value(CacheEntry::new(now(), payload)) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, %key, "failed to encode cache entry, update lost");
                return;
            }
        };
        let mut document = self.load().await;
        document.insert(key.clone(), entry);
        match self.save(&document).await {
            Ok(()) => tracing::debug!(%key, "cache saved"),
            Err(err) => tracing::warn!(
                error = %err,
                %key,
                path = %self.path.display(),
                "failed to save cache file, update lost"
            ),
        }
    }
}
