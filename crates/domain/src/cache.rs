//! Cache entries for remote listings and their freshness rule.

use std::fmt;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::id::{BoardId, CardId};
use crate::time::Timestamp;

/// Default freshness window, in hours.
pub const DEFAULT_FRESHNESS_HOURS: i64 = 24;

/// The default freshness window (24 hours).
#[must_use]
pub fn default_freshness() -> TimeDelta {
    TimeDelta::hours(DEFAULT_FRESHNESS_HOURS)
}

/// Key of one cached remote query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Boards accessible to the credential.
    #[must_use]
    pub fn boards() -> Self {
        Self("boards".to_string())
    }

    /// Cards of one board.
    #[must_use]
    pub fn board_cards(board_id: &BoardId) -> Self {
        Self(format!("board-{board_id}-cards"))
    }

    /// Actions of one card.
    #[must_use]
    pub fn card_actions(card_id: &CardId) -> Self {
        Self(format!("card-{card_id}-actions"))
    }

    /// Actions of a whole board.
    #[must_use]
    pub fn board_actions(board_id: &BoardId) -> Self {
        Self(format!("board-{board_id}-actions"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One cached response. Serialized as `{"timestamp": <epoch ms>, "data": …}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub fetched_at: Timestamp,
    #[serde(rename = "data")]
    pub payload: serde_json::Value,
}

impl CacheEntry {
    #[must_use]
    pub fn new(fetched_at: Timestamp, payload: serde_json::Value) -> Self {
        Self {
            fetched_at,
            payload,
        }
    }

    /// Whether the entry is younger than `window` at instant `now`.
    #[must_use]
    pub fn is_fresh(&self, now: Timestamp, window: TimeDelta) -> bool {
        now - self.fetched_at < window
    }
}
