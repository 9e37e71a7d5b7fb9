//! Custom error types and handling
//!
//! This module defines the client's error types. Every asynchronous failure
//! in this crate is caught at its call site and converted into a retry, a
//! dropped event or a localized error value; nothing here is fatal to the
//! process.

use chrono::{DateTime, Utc};

/// Client-wide error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    // Authentication errors
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Banned: {reason} (until {until})")]
    Banned {
        reason: String,
        until: DateTime<Utc>,
    },

    // Resource errors
    #[error("Not found: {0}")]
    NotFound(String),

    // Server-side errors
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    // Transport errors (retried, never surfaced as fatal)
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    // Local misuse, e.g. interrupting a finished submission
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] crate::config::ConfigError),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Banned { .. } => "BANNED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Api { .. } => "API_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error is transient and the operation may be retried
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Api { status: 500..=599, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Result type alias using ClientError
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ClientError::Unauthorized.error_code(), "UNAUTHORIZED");
        assert_eq!(
            ClientError::Transport("connection reset".to_string()).error_code(),
            "TRANSPORT_ERROR"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::Transport("timeout".to_string()).is_transient());
        assert!(ClientError::Api {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_transient());
        assert!(!ClientError::Unauthorized.is_transient());
        assert!(!ClientError::Api {
            status: 404,
            message: "missing".to_string()
        }
        .is_transient());
    }
}
