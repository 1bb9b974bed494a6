//! Error kinds surfaced by the DigitalOcean API layer.

use thiserror::Error;

/// An error from the provider or the transport underneath it.
///
/// Script bindings stringify these and rethrow them into the Lua runtime,
/// so every variant carries a human-readable message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The provider rejected the request (4xx other than 404).
    #[error("{0}")]
    Validation(String),

    /// The provider answered 404 for the requested resource.
    #[error("{0}")]
    NotFound(String),

    /// Any other provider-side failure (5xx, malformed body, ...).
    #[error("{0}")]
    Remote(String),

    /// A long-running action reached the "errored" terminal state.
    #[error("{0}")]
    ActionErrored(String),

    /// The request context was cancelled while waiting on an action.
    #[error("timed out waiting for action {action_id} to complete")]
    Timeout { action_id: i64 },

    /// The HTTP client failed before a response was obtained.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// Map an HTTP status plus the provider's error body to an error kind.
    ///
    /// DigitalOcean error bodies look like `{"id": "...", "message": "..."}`;
    /// the message is kept verbatim so scripts can match on it.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str().map(String::from)))
            .unwrap_or_else(|| format!("API request failed: {status}"));

        match status.as_u16() {
            404 => ApiError::NotFound(message),
            400..=499 => ApiError::Validation(message),
            _ => ApiError::Remote(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn status_mapping_picks_the_right_kind() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"message":"no such droplet"}"#);
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "no such droplet"));

        let err = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"name is required"}"#,
        );
        assert!(matches!(err, ApiError::Validation(ref m) if m == "name is required"));

        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "not json");
        assert!(matches!(err, ApiError::Remote(_)));
    }

    #[test]
    fn timeout_names_the_action() {
        let err = ApiError::Timeout { action_id: 42 };
        assert_eq!(
            err.to_string(),
            "timed out waiting for action 42 to complete"
        );
    }
}
