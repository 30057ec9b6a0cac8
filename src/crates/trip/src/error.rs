//! Error types for trip
//!
//! Provides a unified error type for all mission tracker operations.

use thiserror::Error;

/// Result type alias for trip operations
pub type Result<T> = std::result::Result<T, TripError>;

/// Main error type for trip operations
#[derive(Debug, Error)]
pub enum TripError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local storage error (unreadable or unwritable backing file)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Storage quota exceeded on write
    #[error("Storage quota exceeded: needed {needed} bytes, limit is {limit} bytes")]
    QuotaExceeded { needed: usize, limit: usize },

    /// Submission rejected before persisting
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote integration is disabled or missing credentials
    #[error("Remote disabled: {0}")]
    RemoteDisabled(String),

    /// Remote API answered with a non-success status
    #[error("GitHub API error ({status}): {message}")]
    RemoteStatus { status: u16, message: String },

    /// Access token rejected by the remote
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    /// Token is valid but cannot reach the configured repository
    #[error("Repository access denied: {0}")]
    RepositoryAccess(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl TripError {
    /// Whether the failure is worth retrying against the remote
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            Self::RemoteStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether the user should be asked to re-enter or rescan the token
    pub fn needs_new_token(&self) -> bool {
        matches!(self, Self::InvalidToken(_) | Self::RepositoryAccess(_))
    }
}

impl From<toml::de::Error> for TripError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for TripError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for TripError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

impl From<&str> for TripError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_status_transience() {
        let server = TripError::RemoteStatus {
            status: 502,
            message: "bad gateway".to_string(),
        };
        let client = TripError::RemoteStatus {
            status: 422,
            message: "unprocessable".to_string(),
        };

        assert!(server.is_transient());
        assert!(!client.is_transient());
    }

    #[test]
    fn test_token_errors_prompt_for_new_token() {
        assert!(TripError::InvalidToken("401".into()).needs_new_token());
        assert!(TripError::RepositoryAccess("404".into()).needs_new_token());
        assert!(!TripError::Storage("disk".into()).needs_new_token());
    }

    #[test]
    fn test_quota_display() {
        let err = TripError::QuotaExceeded { needed: 10, limit: 5 };
        assert_eq!(
            err.to_string(),
            "Storage quota exceeded: needed 10 bytes, limit is 5 bytes"
        );
    }
}
