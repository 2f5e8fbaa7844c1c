//! Change events delivered by a store's per-owner change feed.

use crate::bookmark::{Bookmark, BookmarkId, OwnerId};
use serde::{Deserialize, Serialize};

/// Type of change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A bookmark was created.
    Created,
    /// A bookmark's title or url changed.
    Updated,
    /// A bookmark was deleted.
    Deleted,
}

/// A single change event from the change feed.
///
/// Events are emitted after the store has committed the change. Created and
/// updated events carry the full post-change record; deleted events carry
/// only the identity of the removed record.
///
/// Feeds make no ordering or exactly-once promise: consumers must merge
/// events idempotently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ChangeEvent {
    /// A bookmark was created.
    Created {
        /// The new record.
        record: Bookmark,
    },
    /// A bookmark was updated.
    Updated {
        /// The record after the update.
        record: Bookmark,
    },
    /// A bookmark was deleted.
    Deleted {
        /// ID of the removed record.
        id: BookmarkId,
        /// Owner of the removed record, used for feed filtering.
        owner: OwnerId,
    },
}

impl ChangeEvent {
    /// Creates a created event.
    pub fn created(record: Bookmark) -> Self {
        Self::Created { record }
    }

    /// Creates an updated event.
    pub fn updated(record: Bookmark) -> Self {
        Self::Updated { record }
    }

    /// Creates a deleted event.
    pub fn deleted(id: BookmarkId, owner: OwnerId) -> Self {
        Self::Deleted { id, owner }
    }

    /// Returns the kind of change.
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Created { .. } => ChangeKind::Created,
            Self::Updated { .. } => ChangeKind::Updated,
            Self::Deleted { .. } => ChangeKind::Deleted,
        }
    }

    /// Returns the ID of the affected bookmark.
    pub fn bookmark_id(&self) -> BookmarkId {
        match self {
            Self::Created { record } | Self::Updated { record } => record.id,
            Self::Deleted { id, .. } => *id,
        }
    }

    /// Returns the owner of the affected bookmark.
    pub fn owner(&self) -> OwnerId {
        match self {
            Self::Created { record } | Self::Updated { record } => record.owner,
            Self::Deleted { owner, .. } => *owner,
        }
    }

    /// Encodes the event as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decodes an event from JSON.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
