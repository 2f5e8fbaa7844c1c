//! Error types at the backend boundary.

use thiserror::Error;

/// Result type for bookmark store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for session provider operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors reported by a bookmark store.
///
/// Backend failures are opaque to callers; the variants only distinguish
/// what a caller can act on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The caller does not own the affected record.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// No session is active.
    #[error("not signed in")]
    NotSignedIn,

    /// The backend rejected the request.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors reported by a session provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session token failed validation.
    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// The identity service could not be reached.
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}
