//! Error types for the sync engine.

use linkshelf_protocol::{BookmarkId, SessionError, StoreError};
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while handling a user intent.
///
/// Validation errors are detected locally and never reach the store. Store
/// failures are opaque and are never retried by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A required field was blank after trimming.
    #[error("required field is empty")]
    EmptyField,

    /// The url is already bookmarked.
    #[error("url already exists as \"{existing_title}\"")]
    DuplicateUrl {
        /// Title of the bookmark that already uses the url.
        existing_title: String,
    },

    /// The title is already in use.
    #[error("a bookmark titled \"{title}\" already exists")]
    DuplicateTitle {
        /// The conflicting title as stored.
        title: String,
    },

    /// Delete lookup found nothing.
    #[error("no bookmark matches the given title or url")]
    NotFound,

    /// Create, update or delete failed in the store.
    #[error("store write failed: {0}")]
    StoreWriteFailure(StoreError),

    /// Lookup or subscription failed in the store.
    #[error("store query failed: {0}")]
    StoreQueryFailure(StoreError),

    /// No user is signed in.
    #[error("not signed in")]
    NotSignedIn,

    /// The session provider failed.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// An edit operation was issued with no edit in progress.
    #[error("no edit in progress")]
    NoActiveEdit,

    /// The bookmark is not in the local view.
    #[error("bookmark {0} is not in the local view")]
    UnknownBookmark(BookmarkId),
}

impl EngineError {
    /// Returns true if the error was detected without contacting the store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::EmptyField
                | EngineError::DuplicateUrl { .. }
                | EngineError::DuplicateTitle { .. }
        )
    }

    /// Returns true if the store reported a failure.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            EngineError::StoreWriteFailure(_) | EngineError::StoreQueryFailure(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(EngineError::EmptyField.is_validation());
        assert!(EngineError::DuplicateTitle {
            title: "Docs".into()
        }
        .is_validation());
        assert!(!EngineError::NotFound.is_validation());
        assert!(EngineError::StoreWriteFailure(StoreError::NotSignedIn).is_store_failure());
        assert!(
            EngineError::StoreQueryFailure(StoreError::Unavailable("down".into()))
                .is_store_failure()
        );
        assert!(!EngineError::NoActiveEdit.is_store_failure());
    }

    #[test]
    fn error_display() {
        let err = EngineError::DuplicateUrl {
            existing_title: "Docs".into(),
        };
        assert_eq!(err.to_string(), "url already exists as \"Docs\"");

        let err = EngineError::StoreWriteFailure(StoreError::Backend("boom".into()));
        assert!(err.to_string().contains("boom"));
    }
}
