//! Client error types
//!
//! Every failure of a backend call lands in one [`ClientError`] variant.
//! Dashboards show [`ClientError::user_message`] to people and keep the
//! detailed `Display` text for logs.

use reqwest::StatusCode;
use thiserror::Error;

use crate::api::error::ErrorResponse;

/// Shown for transport failures
pub const MSG_CONNECTION: &str = "Error de conexión";

/// Shown for any other failed call
pub const MSG_LOADING: &str = "Error loading data";

/// Shown when the session is no longer valid
pub const MSG_SESSION_EXPIRED: &str = "Sesión expirada";

/// Errors that can occur when talking to the backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// 401: token missing or expired; the caller should clear the session
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Backend unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Classify a transport-level reqwest failure
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::Unavailable
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Request(e)
        }
    }

    /// Build the error for a non-2xx response from its status and body
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|r| r.error.message)
            .unwrap_or_else(|_| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status.canonical_reason().unwrap_or("error").to_string()
                } else {
                    trimmed.to_string()
                }
            });

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(message)
            }
            _ => ClientError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// The generic text a dashboard shows for this failure
    pub fn user_message(&self) -> &'static str {
        match self {
            ClientError::Unauthorized => MSG_SESSION_EXPIRED,
            ClientError::Timeout | ClientError::Unavailable | ClientError::Request(_) => {
                MSG_CONNECTION
            }
            _ => MSG_LOADING,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }

    /// Whether the backend could not be reached at all
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout | ClientError::Unavailable | ClientError::Request(_)
        )
    }
}
