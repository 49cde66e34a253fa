//! Board and card: the containers whose histories are tracked.

use serde::{Deserialize, Serialize};

use crate::id::{BoardId, CardId};

/// A top-level container accessible to the configured credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
}

/// A work item belonging to exactly one list of a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
}
