use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

// ============================================================================
// Message body
// ============================================================================

/// Every endpoint speaks the same flat body shape: `{"message": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Body served with HTTP 403 when a gated feature is disabled on the license.
pub const FEATURE_BLOCKED: &str = "This feature is not enabled on provided application license";

/// Body served with HTTP 429 when the up-front quota counter is exhausted.
pub const QUOTA_CONSUMED: &str =
    "quota for the given license was consumed. Cannot perform more requests";

impl Message {
    pub fn json(text: impl Into<String>) -> Json<Message> {
        Json(Message {
            message: text.into(),
        })
    }

    pub fn ok(text: impl Into<String>) -> (StatusCode, Json<Message>) {
        (StatusCode::OK, Self::json(text))
    }

    pub fn feature_blocked() -> (StatusCode, Json<Message>) {
        (StatusCode::FORBIDDEN, Self::json(FEATURE_BLOCKED))
    }

    pub fn quota_consumed() -> (StatusCode, Json<Message>) {
        (StatusCode::TOO_MANY_REQUESTS, Self::json(QUOTA_CONSUMED))
    }
}

// ============================================================================
// Unified error type for handlers
// ============================================================================

/// Server-side failure (5xx) used as the error type in handler Results.
///
/// Blocked features and consumed quotas are not errors — they are regular
/// outcomes of the gating logic and use the [`Message`] constructors above.
#[derive(Debug)]
pub enum ApiError {
    /// The licensing authority was unreachable or rejected a call (502).
    BadGateway(String),
    /// Local misconfiguration or remote data drift (500).
    Internal(String),
}

impl ApiError {
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Message::json(message)).into_response()
    }
}
