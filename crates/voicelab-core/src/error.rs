//! Error types for the VoiceLab client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire VoiceLab client.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. The first six variants map
/// the workflow taxonomy (local validation, credential rejection, mid-session
/// 401, transport failure, rate limiting, unexpected body shape); the rest
/// cover ambient concerns such as storage and configuration.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum VoiceLabError {
    /// Local precondition failure; no network call was made
    #[error("{0}")]
    Validation(String),

    /// The server declined credentials or registration
    #[error("{0}")]
    AuthRejected(String),

    /// A 401 arrived mid-session; the caller must invalidate the session
    #[error("unauthorized")]
    Unauthorized,

    /// Network or transport failure (retryable)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// HTTP 429 from a remote service (retryable)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Non-retryable error reported by a remote service
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VoiceLabError {
    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an AuthRejected error
    pub fn auth_rejected(message: impl Into<String>) -> Self {
        Self::AuthRejected(message.into())
    }

    /// Creates a ServiceUnavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Creates a RateLimited error
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited(message.into())
    }

    /// Creates a MalformedResponse error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Creates a Remote error from an HTTP status and a message
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether a retry with backoff may succeed.
    ///
    /// Only rate limiting (HTTP 429) and transport-level failures qualify;
    /// every other failure propagates immediately without consuming retry
    /// budget.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::ServiceUnavailable(_))
    }

    /// Check if this is an Unauthorized error (forces logout upstream)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for VoiceLabError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for VoiceLabError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for VoiceLabError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::ServiceUnavailable(err.to_string())
        }
    }
}

/// A type alias for `Result<T, VoiceLabError>`.
pub type Result<T> = std::result::Result<T, VoiceLabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(VoiceLabError::rate_limited("429").is_retryable());
        assert!(VoiceLabError::service_unavailable("connection refused").is_retryable());

        assert!(!VoiceLabError::Unauthorized.is_retryable());
        assert!(!VoiceLabError::remote(400, "bad request").is_retryable());
        assert!(!VoiceLabError::validation("empty field").is_retryable());
        assert!(!VoiceLabError::malformed("missing field").is_retryable());
    }

    #[test]
    fn test_validation_displays_message_verbatim() {
        let err = VoiceLabError::validation("All fields are required.");
        assert_eq!(err.to_string(), "All fields are required.");
    }
}
