//! Edit-state machine.
//!
//! At most one bookmark is in edit mode at a time:
//!
//! ```text
//! Viewing --begin(id)--> Editing(id)
//! Editing --cancel / save ok--> Viewing
//! Editing --save failed--> Editing (error set)
//! Editing --field changed--> Editing (error cleared)
//! Editing(x) --begin(y)--> Editing(y)   // x is discarded
//! ```

use crate::error::{EngineError, EngineResult};
use linkshelf_protocol::{Bookmark, BookmarkId};

/// Working copy of a bookmark being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    /// Bookmark being edited.
    pub id: BookmarkId,
    /// Working title.
    pub title: String,
    /// Working url.
    pub url: String,
    /// Message from the last failed save, cleared on any field change.
    pub error: Option<String>,
}

impl EditSession {
    fn seeded_from(bookmark: &Bookmark) -> Self {
        Self {
            id: bookmark.id,
            title: bookmark.title.clone(),
            url: bookmark.url.clone(),
            error: None,
        }
    }
}

/// Current edit state of a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    /// No active edit.
    #[default]
    Viewing,
    /// One bookmark is being edited.
    Editing(EditSession),
}

impl EditState {
    /// Starts editing a bookmark, seeded from its committed values.
    ///
    /// Returns the session that was implicitly discarded, if any.
    pub fn begin(&mut self, bookmark: &Bookmark) -> Option<EditSession> {
        let previous = self.end();
        *self = EditState::Editing(EditSession::seeded_from(bookmark));
        previous
    }

    /// Replaces the working title and clears any error.
    pub fn set_title(&mut self, title: impl Into<String>) -> EngineResult<()> {
        let session = self.session_mut()?;
        session.title = title.into();
        session.error = None;
        Ok(())
    }

    /// Replaces the working url and clears any error.
    pub fn set_url(&mut self, url: impl Into<String>) -> EngineResult<()> {
        let session = self.session_mut()?;
        session.url = url.into();
        session.error = None;
        Ok(())
    }

    /// Records a failed save. The session stays open.
    pub fn fail(&mut self, message: impl Into<String>) {
        if let EditState::Editing(session) = self {
            session.error = Some(message.into());
        }
    }

    /// Ends the edit, returning the discarded session.
    pub fn end(&mut self) -> Option<EditSession> {
        match std::mem::take(self) {
            EditState::Editing(session) => Some(session),
            EditState::Viewing => None,
        }
    }

    /// Returns the active session.
    pub fn session(&self) -> Option<&EditSession> {
        match self {
            EditState::Editing(session) => Some(session),
            EditState::Viewing => None,
        }
    }

    /// Returns the id being edited.
    pub fn editing_id(&self) -> Option<BookmarkId> {
        self.session().map(|s| s.id)
    }

    /// Returns true if an edit is active.
    pub fn is_editing(&self) -> bool {
        matches!(self, EditState::Editing(_))
    }

    fn session_mut(&mut self) -> EngineResult<&mut EditSession> {
        match self {
            EditState::Editing(session) => Ok(session),
            EditState::Viewing => Err(EngineError::NoActiveEdit),
        }
    }
}
