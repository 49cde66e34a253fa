//! Raw actions: the change-events emitted by the remote service.
//!
//! Actions are sourced verbatim from the service and never mutated. Their
//! `data` payload varies by kind; it is kept as raw JSON here and decoded
//! into a typed shape only by the [normalizer](crate::normalize).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Kind of an action, as named by the service's `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    CreateCard,
    MoveCardToBoard,
    UpdateCard,
    /// Any kind this system does not track (comments, checklists, …).
    Other(String),
}

impl ActionKind {
    /// The kinds requested from the service when fetching histories.
    pub const TRACKED: [Self; 3] = [Self::UpdateCard, Self::CreateCard, Self::MoveCardToBoard];

    /// Wire name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::CreateCard => "createCard",
            Self::MoveCardToBoard => "moveCardToBoard",
            Self::UpdateCard => "updateCard",
            Self::Other(name) => name,
        }
    }

    /// Comma-separated server-side filter for the tracked kinds.
    #[must_use]
    pub fn tracked_filter() -> String {
        Self::TRACKED
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "createCard" => Self::CreateCard,
            "moveCardToBoard" => Self::MoveCardToBoard,
            "updateCard" => Self::UpdateCard,
            _ => Self::Other(value),
        }
    }
}

impl From<ActionKind> for String {
    fn from(value: ActionKind) -> Self {
        match value {
            ActionKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change-event as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub date: Timestamp,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl RawEvent {
    /// Whether `data.<field>` is present and not `null`.
    #[must_use]
    pub fn has_data_field(&self, field: &str) -> bool {
        self.data.get(field).is_some_and(|value| !value.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_join_tracked_kinds_into_filter() {
        assert_eq!(
            ActionKind::tracked_filter(),
            "updateCard,createCard,moveCardToBoard"
        );
    }

    #[test]
    fn should_keep_unknown_kind_name() {
        let kind = ActionKind::from("commentCard".to_string());
        assert_eq!(kind, ActionKind::Other("commentCard".to_string()));
        assert_eq!(kind.to_string(), "commentCard");
    }

    #[test]
    fn should_decode_raw_event_from_service_json() {
        let event: RawEvent = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "type": "createCard",
            "date": "2025-01-01T00:00:00.000Z",
            "data": {"card": {"name": "Fix bug"}}
        }))
        .unwrap();
        assert_eq!(event.kind, ActionKind::CreateCard);
        assert!(event.has_data_field("card"));
        assert!(!event.has_data_field("listBefore"));
    }

    #[test]
    fn should_treat_null_field_as_absent() {
        let event: RawEvent = serde_json::from_value(serde_json::json!({
            "type": "updateCard",
            "date": "2025-01-01T00:00:00Z",
            "data": {"listBefore": null}
        }))
        .unwrap();
        assert!(!event.has_data_field("listBefore"));
    }

    #[test]
    fn should_reject_event_without_date() {
        let result = serde_json::from_value::<RawEvent>(serde_json::json!({"type": "createCard"}));
        assert!(result.is_err());
    }
}
