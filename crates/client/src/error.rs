//! Unified error handling for API access.
//!
//! The client never swallows errors: every call either resolves with a
//! response or fails with the most relevant `ApiError`. Callers translate
//! these into user-visible messages.

use milk_delivery_core::ValidationError;
use reqwest::StatusCode;
use thiserror::Error;

use crate::storage::StorageError;

/// Boxed transport-level error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why an unauthorized response could not be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No refresh token was stored, so no refresh was attempted.
    #[error("no refresh token")]
    NoRefreshToken,

    /// The refresh endpoint call failed.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// The request was replayed with a fresh token and rejected again.
    #[error("rejected after token refresh")]
    RejectedAfterRefresh,
}

/// Errors returned by the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection, TLS, timeout).
    #[error("Network error: {0}")]
    Network(#[source] BoxError),

    /// The server answered 401 and the session could not be recovered.
    #[error("Unauthorized ({cause}): {}", message.as_deref().unwrap_or("no message"))]
    Unauthorized {
        /// Message from the 401 response body, if any.
        message: Option<String>,
        /// What stopped recovery.
        cause: AuthFailure,
    },

    /// Non-2xx, non-401 response.
    #[error("Server error {status}: {}", message.as_deref().unwrap_or("no message"))]
    Server {
        /// HTTP status.
        status: StatusCode,
        /// `message` field of the JSON error body, if any.
        message: Option<String>,
    },

    /// Client-side check failed; nothing was sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Response body did not match the expected schema.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Payment provider flow did not complete.
    #[error("Payment error: {0}")]
    Payment(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(Box::new(err))
    }
}

impl ApiError {
    /// Whether the user has to sign in again.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// HTTP status carried by the error, if it came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Cannot reach the server. Check your connection.".to_owned(),
            Self::Unauthorized { .. } => "Your session has expired. Please sign in again.".to_owned(),
            Self::Server { message, .. } => message
                .clone()
                .unwrap_or_else(|| "The server could not complete the request.".to_owned()),
            Self::Validation(err) => err.to_string(),
            Self::Payment(msg) => msg.clone(),
            Self::Decode(_) | Self::Storage(_) | Self::Url(_) => {
                "Something went wrong. Please try again.".to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_display() {
        let err = ApiError::Unauthorized {
            message: Some("jwt expired".to_owned()),
            cause: AuthFailure::NoRefreshToken,
        };
        assert_eq!(err.to_string(), "Unauthorized (no refresh token): jwt expired");
        assert!(err.is_auth());
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_server_error_display() {
        let err = ApiError::Server {
            status: StatusCode::NOT_FOUND,
            message: None,
        };
        assert_eq!(err.to_string(), "Server error 404 Not Found: no message");
        assert_eq!(
            err.user_message(),
            "The server could not complete the request."
        );
    }

    #[test]
    fn test_network_error_keeps_source() {
        let err = ApiError::Network("connection reset".into());
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_auth());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_validation_error_converts() {
        let err: ApiError = ValidationError::PasswordMismatch.into();
        assert_eq!(err.user_message(), "new passwords do not match");
    }
}
