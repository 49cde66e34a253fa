//! Tracker API port: read-only access to the remote board service.

use std::future::Future;

use cardtrail_domain::action::ActionKind;
use cardtrail_domain::error::TrackerError;
use cardtrail_domain::id::{BoardId, CardId};

/// Page-size cap for action listings.
pub const ACTIONS_LIMIT: u32 = 1000;

/// A `GET` against the remote API: a path relative to the API root plus
/// query parameters. Credentials are the adapter's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub path: String,
    pub params: Vec<(&'static str, String)>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// Boards of the authenticated member.
    #[must_use]
    pub fn member_boards() -> Self {
        Self::new("/members/me/boards")
    }

    /// Cards of a board, restricted to the fields the tracker reads.
    #[must_use]
    pub fn board_cards(board_id: &BoardId) -> Self {
        Self::new(format!("/boards/{board_id}/cards"))
            .param("fields", "id,name")
    }

    /// Movement-related actions of one card.
    #[must_use]
    pub fn card_actions(card_id: &CardId) -> Self {
        Self::new(format!("/cards/{card_id}/actions"))
            .param("filter", ActionKind::tracked_filter())
            .param("fields", "data,date,type")
            .param("limit", ACTIONS_LIMIT.to_string())
    }

    /// Movement-related actions of a whole board.
    #[must_use]
    pub fn board_actions(board_id: &BoardId) -> Self {
        Self::new(format!("/boards/{board_id}/actions"))
            .param("filter", ActionKind::tracked_filter())
            .param("limit", ACTIONS_LIMIT.to_string())
    }
}

/// Remote board service.
///
/// Implementations raise [`TrackerError::Unauthorized`] for rejected
/// credentials and [`TrackerError::Remote`] for any other failure. There is
/// no retry at this boundary.
pub trait TrackerApi {
    /// Perform a `GET` and return the decoded JSON body.
    fn get(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<serde_json::Value, TrackerError>> + Send;
}

impl<T: TrackerApi + Send + Sync> TrackerApi for std::sync::Arc<T> {
    fn get(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<serde_json::Value, TrackerError>> + Send {
        (**self).get(request)
    }
}
