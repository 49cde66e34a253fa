//! In-memory port implementations shared by the service tests.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cardtrail_domain::cache::{CacheEntry, CacheKey};
use cardtrail_domain::error::TrackerError;
use cardtrail_domain::movement::{IdentityKey, MovementRecord};
use cardtrail_domain::time::now;

use crate::ports::{ApiRequest, CacheStore, MovementLog, MovementSink, TrackerApi};

/// Responses keyed by request path.
#[derive(Clone, Default)]
pub struct FakeApi {
    responses: Arc<Mutex<HashMap<String, serde_json::Value>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    unauthorized: bool,
    calls: Arc<AtomicUsize>,
}

impl FakeApi {
    pub fn with(self, path: &str, body: serde_json::Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), body);
        self
    }

    pub fn failing(self, path: &str) -> Self {
        self.failing.lock().unwrap().insert(path.to_string());
        self
    }

    pub fn unauthorized(mut self) -> Self {
        self.unauthorized = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TrackerApi for FakeApi {
    fn get(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<serde_json::Value, TrackerError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = if self.unauthorized {
            Err(TrackerError::Unauthorized)
        } else if self.failing.lock().unwrap().contains(&request.path) {
            Err(TrackerError::Remote(
                format!("503 for {}", request.path).into(),
            ))
        } else {
            self.responses
                .lock()
                .unwrap()
                .get(&request.path)
                .cloned()
                .ok_or_else(|| TrackerError::Remote(format!("404 for {}", request.path).into()))
        };
        async { result }
    }
}

/// Cache without expiry.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<CacheKey, CacheEntry>>>,
}

impl MemoryCache {
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &CacheKey) -> impl Future<Output = Option<CacheEntry>> + Send {
        let entry = self.entries.lock().unwrap().get(key).cloned();
        async { entry }
    }

    fn put(&self, key: &CacheKey, payload: serde_json::Value) -> impl Future<Output = ()> + Send {
        self.entries
            .lock()
            .unwrap()
            .insert(key.clone(), CacheEntry::new(now(), payload));
        async {}
    }
}

/// Output that keeps appended rows in memory and doubles as its own log.
#[derive(Clone, Default)]
pub struct MemoryOutput {
    rows: Arc<Mutex<Option<Vec<MovementRecord>>>>,
    unreadable: bool,
    failing: bool,
}

impl MemoryOutput {
    pub fn existing(records: Vec<MovementRecord>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(Some(records))),
            ..Self::default()
        }
    }

    pub fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<MovementRecord> {
        self.rows.lock().unwrap().clone().unwrap_or_default()
    }
}

impl MovementLog for MemoryOutput {
    fn existing_keys(
        &self,
    ) -> impl Future<Output = Result<Option<HashSet<IdentityKey>>, TrackerError>> + Send {
        let result = if self.unreadable {
            Err(TrackerError::Storage("unreadable output".into()))
        } else {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .as_ref()
                .map(|rows| rows.iter().map(MovementRecord::identity_key).collect()))
        };
        async { result }
    }
}

impl MovementSink for MemoryOutput {
    fn append(
        &self,
        records: &[MovementRecord],
    ) -> impl Future<Output = Result<(), TrackerError>> + Send {
        let result = if self.failing {
            Err(TrackerError::Storage("disk full".into()))
        } else {
            self.rows
                .lock()
                .unwrap()
                .get_or_insert_with(Vec::new)
                .extend_from_slice(records);
            Ok(())
        };
        async { result }
    }
}
