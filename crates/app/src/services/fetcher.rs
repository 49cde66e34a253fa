//! Cached fetcher: cache-first reads of remote listings.

use serde::de::DeserializeOwned;

use cardtrail_domain::cache::CacheKey;
use cardtrail_domain::error::{MalformedPayloadError, TrackerError};

use crate::ports::{ApiRequest, CacheStore, TrackerApi};

/// Reads remote listings through the cache.
///
/// A fresh cache entry short-circuits the remote call; otherwise the
/// response is fetched, stored, and returned. Remote failures are not
/// cached and propagate unchanged.
pub struct CachedFetcher<A, C> {
    api: A,
    cache: C,
}

impl<A: TrackerApi + Sync, C: CacheStore + Sync> CachedFetcher<A, C> {
    /// Create a fetcher over the given API client and cache.
    pub fn new(api: A, cache: C) -> Self {
        Self { api, cache }
    }

    /// Return the raw JSON for `request`, consulting the cache under `key` first.
    ///
    /// # Errors
    ///
    /// Returns whatever the [`TrackerApi`] raises on a cache miss.
    #[tracing::instrument(skip(self, key, request), fields(key = %key))]
    pub async fn fetch(
        &self,
        key: &CacheKey,
        request: &ApiRequest,
    ) -> Result<serde_json::Value, TrackerError> {
        if let Some(entry) = self.cache.get(key).await {
            tracing::debug!("using cached data");
            return Ok(entry.payload);
        }

        tracing::debug!(path = %request.path, "cache miss, fetching");
        let payload = self.api.get(request).await?;
        self.cache.put(key, payload.clone()).await;
        Ok(payload)
    }

    /// Like [`fetch`](Self::fetch), then decode the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Malformed`] if the payload does not decode,
    /// or whatever the [`TrackerApi`] raises on a cache miss.
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
        request: &ApiRequest,
        what: &'static str,
    ) -> Result<T, TrackerError> {
        let payload = self.fetch(key, request).await?;
        serde_json::from_value(payload)
            .map_err(|source| MalformedPayloadError::Listing { what, source }.into())
    }
}
