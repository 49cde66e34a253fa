//! Movement record: the normalized form of one card movement.

use std::cmp::{Ordering, Reverse};

use serde::{Deserialize, Serialize};

use crate::id::CardId;
use crate::location::Location;
use crate::time::{Timestamp, parse_iso, to_iso};

/// Column titles of the four-column tabular projection.
pub const HEADER: [&str; 4] = [
    "Card Name",
    "Old Board/List Name",
    "New Board/List Name",
    "Timestamp of Movement",
];

/// One "card moved from A to B at T" record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    /// Present when the record was produced by a per-card history fetch,
    /// or when the action payload carried the card id.
    pub card_id: Option<CardId>,
    pub card_name: String,
    pub old_location: Location,
    pub new_location: Location,
    pub timestamp: Timestamp,
}

impl MovementRecord {
    /// ISO-8601 rendering of [`timestamp`](Self::timestamp).
    #[must_use]
    pub fn timestamp_iso(&self) -> String {
        to_iso(self.timestamp)
    }

    /// Project onto the four output columns, in [`HEADER`] order.
    #[must_use]
    pub fn to_row(&self) -> [String; 4] {
        [
            self.card_name.clone(),
            self.old_location.to_string(),
            self.new_location.to_string(),
            self.timestamp_iso(),
        ]
    }

    /// Dedup identity of this record.
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            card_name: self.card_name.clone(),
            timestamp: self.timestamp_iso(),
        }
    }

    /// Attach the identity of the card whose history produced this record.
    #[must_use]
    pub fn with_card(mut self, card_id: CardId, card_name: impl Into<String>) -> Self {
        self.card_id = Some(card_id);
        self.card_name = card_name.into();
        self
    }
}

/// Ordering used for output: newest first, then a deterministic tie-break
/// on card id (records without one first), card name and locations.
#[must_use]
pub fn newest_first(a: &MovementRecord, b: &MovementRecord) -> Ordering {
    let key = |r: &MovementRecord| {
        (
            Reverse(r.timestamp),
            r.card_id.clone(),
            r.card_name.clone(),
            r.old_location.clone(),
            r.new_location.clone(),
        )
    };
    key(a).cmp(&key(b))
}

/// Sort records in place with [`newest_first`].
pub fn sort_newest_first(records: &mut [MovementRecord]) {
    records.sort_by(newest_first);
}

/// Identity of a movement for dedup: the card name and the instant.
///
/// Two distinct cards sharing a name and moved in the same instant collide;
/// this is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub card_name: String,
    pub timestamp: String,
}

impl IdentityKey {
    /// Build a key from a previously persisted row.
    ///
    /// Timestamps that parse as RFC 3339 are re-rendered so that the same
    /// instant matches regardless of sub-second formatting; anything else is
    /// kept verbatim.
    #[must_use]
    pub fn from_persisted(card_name: &str, timestamp: &str) -> Self {
        let timestamp = parse_iso(timestamp).map_or_else(|| timestamp.to_string(), to_iso);
        Self {
            card_name: card_name.to_string(),
            timestamp,
        }
    }
}
