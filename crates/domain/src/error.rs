//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`TrackerError`] via `#[from]` (or an explicit `From` impl when the
//! source must be boxed).

use crate::action::ActionKind;

/// Workspace-wide error returned across port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The remote service rejected the credentials (HTTP 401).
    #[error("authentication failed, check the API key and token")]
    Unauthorized,

    /// A network, rate-limit or server-side failure talking to a remote service.
    #[error("remote request failed")]
    Remote(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The remote service returned a payload we cannot interpret.
    #[error("malformed payload")]
    Malformed(#[from] MalformedPayloadError),

    /// Writing to a durable output failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Caller-supplied input was rejected.
    #[error("validation error")]
    Validation(#[from] ValidationError),
}

/// A payload did not have the shape its kind requires.
#[derive(Debug, thiserror::Error)]
pub enum MalformedPayloadError {
    /// An included action is missing nested fields or has them mistyped.
    #[error("unrecognized {kind} payload")]
    Action {
        kind: ActionKind,
        #[source]
        source: serde_json::Error,
    },

    /// A cached or fetched listing could not be decoded.
    #[error("failed to decode {what}")]
    Listing {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Input validation failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("identifier must not be empty")]
    EmptyId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_unauthorized_with_actionable_message() {
        assert_eq!(
            TrackerError::Unauthorized.to_string(),
            "authentication failed, check the API key and token"
        );
    }

    #[test]
    fn should_convert_validation_error() {
        let err: TrackerError = ValidationError::EmptyId.into();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::EmptyId)
        ));
    }

    #[test]
    fn should_name_action_kind_in_malformed_message() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = MalformedPayloadError::Action {
            kind: ActionKind::UpdateCard,
            source,
        };
        assert_eq!(err.to_string(), "unrecognized updateCard payload");
    }
}
