//! Location: where a card was before or after a movement.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal rendered for the origin of a newly created card.
pub const CREATED: &str = "Created";

/// Position of a card in the board/list hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    /// The card did not exist before this movement.
    Created,
    /// Only the board is known (source of a cross-board move).
    Board { board: String },
    /// A list within a board.
    Placed { board: String, list: String },
}

impl Location {
    #[must_use]
    pub fn placed(board: impl Into<String>, list: impl Into<String>) -> Self {
        Self::Placed {
            board: board.into(),
            list: list.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str(CREATED),
            Self::Board { board } => f.write_str(board),
            Self::Placed { board, list } => write!(f, "{board} / {list}"),
        }
    }
}

/// What an update did along one axis (board or list) of the hierarchy.
///
/// An update touching only the list still reports the board, and the other
/// way round; the untouched axis is [`AxisChange::Unchanged`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisChange {
    Unchanged(String),
    Changed { before: String, after: String },
}

impl AxisChange {
    /// Resolve one axis from the payload's current value and optional
    /// before/after values. A missing side of a changed axis falls back
    /// to the current value.
    #[must_use]
    pub fn resolve(current: String, before: Option<String>, after: Option<String>) -> Self {
        match (before, after) {
            (None, None) => Self::Unchanged(current),
            (before, after) => Self::Changed {
                before: before.unwrap_or_else(|| current.clone()),
                after: after.unwrap_or(current),
            },
        }
    }

    #[must_use]
    pub fn before(&self) -> &str {
        match self {
            Self::Unchanged(current) => current,
            Self::Changed { before, .. } => before,
        }
    }

    #[must_use]
    pub fn after(&self) -> &str {
        match self {
            Self::Unchanged(current) => current,
            Self::Changed { after, .. } => after,
        }
    }
}
