//! Error types for session-gate.

use thiserror::Error;

use crate::session::{SessionEvent, StateKind};

/// Message shown when the verifier rejects a credential pair.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Fallback message for failures that carry no text of their own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Main error type for session-gate operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The verifier rejected the email/password pair.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The verifier call itself failed.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The persistence adapter could not read or write.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Event not accepted in the current state.
    #[error("invalid transition: {event:?} in state {from:?}")]
    InvalidTransition { from: StateKind, event: SessionEvent },

    /// Navigation kept redirecting without reaching a route.
    #[error("redirect loop while navigating to {0}")]
    RedirectLoop(String),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// Human-readable text placed in `Session::error` after a failed login.
    pub fn failure_message(&self) -> String {
        match self {
            Self::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            Self::Transport(msg) if msg.trim().is_empty() => UNKNOWN_ERROR_MESSAGE.to_string(),
            Self::Transport(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this error came from the persistence adapter.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_) | Self::Io(_) | Self::Json(_))
    }
}

/// Convenience Result type for session-gate operations.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_message() {
        let err = SessionError::InvalidCredentials;
        assert_eq!(err.to_string(), "Invalid email or password");
        assert_eq!(err.failure_message(), INVALID_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn test_transport_message() {
        let err = SessionError::Transport("connection refused".into());
        assert_eq!(err.failure_message(), "connection refused");
        assert!(err.to_string().contains("transport failure"));
    }

    #[test]
    fn test_empty_transport_falls_back() {
        let err = SessionError::Transport("  ".into());
        assert_eq!(err.failure_message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = SessionError::InvalidTransition {
            from: StateKind::Authenticated,
            event: SessionEvent::LoginRequested,
        };
        assert!(err.to_string().contains("Authenticated"));
        assert!(err.to_string().contains("LoginRequested"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: SessionError = io_err.into();
        assert!(matches!(err, SessionError::Io(_)));
        assert!(err.is_storage());
        assert!(!SessionError::InvalidCredentials.is_storage());
    }
}
