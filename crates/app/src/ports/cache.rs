//! Cache port: time-bounded storage of remote listings.

use std::future::Future;

use cardtrail_domain::cache::{CacheEntry, CacheKey};

/// Key/value cache of remote responses with a freshness window.
///
/// Neither operation can fail from the caller's point of view: load
/// failures behave as an empty cache and save failures only lose the
/// update. Implementations log what they recover from.
pub trait CacheStore {
    /// Return the entry for `key` if present and still fresh.
    ///
    /// A stale entry and a missing one are indistinguishable.
    fn get(&self, key: &CacheKey) -> impl Future<Output = Option<CacheEntry>> + Send;

    /// Store `payload` under `key`, stamped with the current time.
    fn put(&self, key: &CacheKey, payload: serde_json::Value) -> impl Future<Output = ()> + Send;
}

impl<T: CacheStore + Send + Sync> CacheStore for std::sync::Arc<T> {
    fn get(&self, key: &CacheKey) -> impl Future<Output = Option<CacheEntry>> + Send {
        (**self).get(key)
    }

    fn put(&self, key: &CacheKey, payload: serde_json::Value) -> impl Future<Output = ()> + Send {
        (**self).put(key, payload)
    }
}
