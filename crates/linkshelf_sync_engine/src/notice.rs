//! Transient user-facing notices.

use crate::error::EngineError;
use std::time::{Duration, Instant};

/// Whether a notice reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The intent succeeded.
    Success,
    /// The intent failed.
    Error,
}

/// A message shown to the user for a limited time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Message text.
    pub text: String,
    /// Success or error.
    pub kind: NoticeKind,
    /// When the notice was raised.
    pub raised_at: Instant,
}

/// The intent a notice reports on. Selects the wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Intent {
    Add,
    Delete,
}

impl Intent {
    /// Text for a successful intent.
    pub(crate) fn success_text(self) -> &'static str {
        match self {
            Intent::Add => "Bookmark added!",
            Intent::Delete => "Bookmark deleted!",
        }
    }

    /// Text for a failed intent.
    pub(crate) fn failure_text(self, error: &EngineError) -> String {
        match (self, error) {
            (Intent::Add, EngineError::EmptyField) => "Fill in Title and URL".into(),
            (Intent::Delete, EngineError::EmptyField) => "Enter Title or URL to delete".into(),
            (_, EngineError::DuplicateUrl { existing_title }) => {
                format!("URL already exists as: \"{existing_title}\"")
            }
            (_, EngineError::DuplicateTitle { .. }) => {
                "Bookmark already exists, choose another name".into()
            }
            (_, EngineError::NotFound) => "No match found".into(),
            (Intent::Add, EngineError::StoreWriteFailure(_)) => "Failed to add".into(),
            (Intent::Delete, EngineError::StoreWriteFailure(_)) => "Failed to delete".into(),
            (_, EngineError::StoreQueryFailure(_)) => "Failed to look up bookmarks".into(),
            (_, EngineError::NotSignedIn) => "Please sign in again".into(),
            (_, other) => other.to_string(),
        }
    }
}

/// Holds at most one notice and expires it after a fixed interval.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    ttl: Duration,
    current: Option<Notice>,
}

impl NoticeBoard {
    /// Creates an empty board whose notices live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    /// Posts a notice, replacing any current one.
    pub fn post(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.post_at(kind, text, Instant::now());
    }

    /// Posts a notice raised at the given instant.
    pub fn post_at(&mut self, kind: NoticeKind, text: impl Into<String>, now: Instant) {
        self.current = Some(Notice {
            text: text.into(),
            kind,
            raised_at: now,
        });
    }

    /// Returns the notice if it has not expired yet.
    pub fn current(&self) -> Option<&Notice> {
        self.current_at(Instant::now())
    }

    /// Returns the notice if it has not expired at `now`.
    pub fn current_at(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|notice| now.saturating_duration_since(notice.raised_at) < self.ttl)
    }

    /// Drops the notice if it has expired at `now`.
    pub fn expire(&mut self, now: Instant) {
        if self.current_at(now).is_none() {
            self.current = None;
        }
    }

    /// Removes any notice.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Returns the notice lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkshelf_protocol::StoreError;

    #[test]
    fn notice_expires_after_ttl() {
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        let start = Instant::now();
        board.post_at(NoticeKind::Success, "Bookmark added!", start);

        assert!(board.current_at(start + Duration::from_millis(2999)).is_some());
        assert!(board.current_at(start + Duration::from_secs(3)).is_none());

        board.expire(start + Duration::from_secs(4));
        assert!(board.current_at(start).is_none());
    }

    #[test]
    fn newer_notice_replaces_older() {
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        let start = Instant::now();
        board.post_at(NoticeKind::Error, "No match found", start);
        board.post_at(NoticeKind::Success, "Bookmark deleted!", start);

        let notice = board.current_at(start).unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.text, "Bookmark deleted!");
    }

    #[test]
    fn wording_depends_on_intent() {
        assert_eq!(
            Intent::Add.failure_text(&EngineError::EmptyField),
            "Fill in Title and URL"
        );
        assert_eq!(
            Intent::Delete.failure_text(&EngineError::EmptyField),
            "Enter Title or URL to delete"
        );
        assert_eq!(
            Intent::Add.failure_text(&EngineError::StoreWriteFailure(StoreError::NotSignedIn)),
            "Failed to add"
        );
        assert_eq!(
            Intent::Add.failure_text(&EngineError::DuplicateUrl {
                existing_title: "Docs".into()
            }),
            "URL already exists as: \"Docs\""
        );
    }
}
