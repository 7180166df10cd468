//! Session error types.

use console_storage::StorageError;
use thiserror::Error;

/// Failure reported by a transport collaborator.
///
/// Cloneable so a single refresh failure can fan out to every waiter that
/// joined the in-flight refresh.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The backend answered with a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        /// Machine-readable error code from the response payload, if any
        code: Option<String>,
        message: String,
    },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The transport-level timeout elapsed
    #[error("Request timed out")]
    Timeout,

    /// The response arrived but could not be decoded
    #[error("Invalid response payload: {0}")]
    Payload(String),
}

impl ApiError {
    /// Returns true if the transport may retry this failure.
    ///
    /// Retryable failures are connectivity loss, timeouts, and 5xx server
    /// errors. Everything else reflects the request itself and would fail
    /// again unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Timeout => true,
            ApiError::Status { status, .. } => (500..600).contains(status),
            ApiError::Payload(_) => false,
        }
    }
}

/// Session error type.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The credential payload segment could not be decoded
    #[error("Malformed credential: {0}")]
    MalformedCredential(String),

    /// No credential is available for a protected call
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Login exchange rejected or never answered
    #[error("Login failed: {0}")]
    LoginFailed(ApiError),

    /// The refresh endpoint rejected or never answered the refresh call
    #[error("Credential refresh failed: {0}")]
    RefreshFailed(ApiError),

    /// A refresh was abandoned because the session was torn down
    #[error("Credential refresh cancelled")]
    RefreshCancelled,

    /// The refreshed credential could not be written to the vault
    #[error("Failed to persist refreshed credential: {0}")]
    PersistFailed(String),

    /// A protected call failed without ending the session
    #[error("Request failed: {0}")]
    Request(ApiError),

    /// A protected call failed with an auth-fatal outcome; the session is gone
    #[error("Session terminated: {0}")]
    Terminated(ApiError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias using SessionError.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable_network() {
        assert!(ApiError::Network("connection refused".to_string()).is_retryable());
    }

    #[test]
    fn test_is_retryable_timeout() {
        assert!(ApiError::Timeout.is_retryable());
    }

    #[test]
    fn test_is_retryable_server_error() {
        let error = ApiError::Status {
            status: 503,
            code: None,
            message: "service unavailable".to_string(),
        };
        assert!(error.is_retryable());
    }

    #[test]
    fn test_is_not_retryable_client_error() {
        let error = ApiError::Status {
            status: 401,
            code: None,
            message: "unauthorized".to_string(),
        };
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_is_not_retryable_payload() {
        assert!(!ApiError::Payload("truncated body".to_string()).is_retryable());
    }
}
