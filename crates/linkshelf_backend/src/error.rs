//! Error types for the reference backend.

use linkshelf_protocol::{SessionError, StoreError};
use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur in the backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Invalid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Session token failed validation.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Caller does not own the target.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// No session is active on this client.
    #[error("not signed in")]
    NotSignedIn,

    /// Backend switched off.
    #[error("backend unavailable")]
    Unavailable,

    /// Internal backend error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BackendError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BackendError::InvalidRequest(_)
                | BackendError::AuthenticationFailed(_)
                | BackendError::NotAuthorized(_)
                | BackendError::NotSignedIn
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        matches!(self, BackendError::Unavailable | BackendError::Internal(_))
    }
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotAuthorized(msg) => StoreError::NotAuthorized(msg),
            BackendError::NotSignedIn | BackendError::AuthenticationFailed(_) => {
                StoreError::NotSignedIn
            }
            BackendError::Unavailable => StoreError::Unavailable(err.to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<BackendError> for SessionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::AuthenticationFailed(msg) => SessionError::InvalidSession(msg),
            other => SessionError::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(BackendError::InvalidRequest("bad".into()).is_client_error());
        assert!(BackendError::NotSignedIn.is_client_error());
        assert!(BackendError::Internal("oops".into()).is_server_error());
        assert!(!BackendError::InvalidRequest("bad".into()).is_server_error());
    }

    #[test]
    fn store_error_mapping() {
        assert_eq!(
            StoreError::from(BackendError::NotSignedIn),
            StoreError::NotSignedIn
        );
        assert!(matches!(
            StoreError::from(BackendError::Unavailable),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(BackendError::NotAuthorized("row".into())),
            StoreError::NotAuthorized(_)
        ));
    }

    #[test]
    fn session_error_mapping() {
        assert!(matches!(
            SessionError::from(BackendError::AuthenticationFailed("expired".into())),
            SessionError::InvalidSession(_)
        ));
        assert!(matches!(
            SessionError::from(BackendError::Unavailable),
            SessionError::Unavailable(_)
        ));
    }
}
