//! Boundary traits for the managed backend.
//!
//! Persistence, identity and change notification live in an external
//! backend. These traits describe the calls the sync engine makes; a backend
//! (or a test double) implements them.

use crate::bookmark::{Bookmark, BookmarkId, BookmarkPatch, OwnerId, User};
use crate::change_feed::ChangeEvent;
use crate::error::{SessionResult, StoreResult};
use crate::matching::BookmarkQuery;
use std::fmt;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

/// Identifier of an open change-feed subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// An open subscription to an owner's change feed.
///
/// Events arrive on a channel and are consumed exactly once. The store keeps
/// the sending half until [`BookmarkStore::unsubscribe`] is called with this
/// subscription's id.
pub struct Subscription {
    id: SubscriptionId,
    owner: OwnerId,
    events: Receiver<ChangeEvent>,
}

impl Subscription {
    /// Wraps the receiving half of a feed channel.
    pub fn new(id: SubscriptionId, owner: OwnerId, events: Receiver<ChangeEvent>) -> Self {
        Self { id, owner, events }
    }

    /// Returns the subscription id.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns the owner this subscription is filtered to.
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Takes the next pending event without blocking.
    ///
    /// Returns `None` when no event is pending or the feed has closed.
    pub fn try_next(&self) -> Option<ChangeEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Takes up to `limit` pending events without blocking.
    pub fn drain(&self, limit: usize) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        while events.len() < limit {
            match self.try_next() {
                Some(event) => events.push(event),
                None => break,
            }
        }
        events
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// Durable bookmark records with per-owner change notification.
///
/// All calls complete (or fail) before returning. Implementations enforce row
/// ownership for the signed-in user.
pub trait BookmarkStore: Send + Sync {
    /// Returns the owner's bookmarks, newest first by creation.
    fn list(&self, owner: OwnerId) -> StoreResult<Vec<Bookmark>>;

    /// Creates a bookmark and returns the stored record.
    fn create(&self, owner: OwnerId, title: &str, url: &str) -> StoreResult<Bookmark>;

    /// Applies a partial update to one bookmark.
    fn update(&self, id: BookmarkId, patch: &BookmarkPatch) -> StoreResult<()>;

    /// Deletes a batch of bookmarks in one request.
    fn delete_many(&self, ids: &[BookmarkId]) -> StoreResult<()>;

    /// Returns the ids of the owner's bookmarks matching the query.
    fn find_matches(&self, query: &BookmarkQuery) -> StoreResult<Vec<BookmarkId>>;

    /// Opens a change-feed subscription filtered to one owner.
    fn subscribe(&self, owner: OwnerId) -> StoreResult<Subscription>;

    /// Releases a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Issues and validates user identity.
pub trait SessionProvider: Send + Sync {
    /// Returns the signed-in user, or `None` if there is no valid session.
    fn current_user(&self) -> SessionResult<Option<User>>;

    /// Ends the current session.
    fn sign_out(&self) -> SessionResult<()>;
}

impl<T: BookmarkStore + ?Sized> BookmarkStore for Arc<T> {
    fn list(&self, owner: OwnerId) -> StoreResult<Vec<Bookmark>> {
        (**self).list(owner)
    }

    fn create(&self, owner: OwnerId, title: &str, url: &str) -> StoreResult<Bookmark> {
        (**self).create(owner, title, url)
    }

    fn update(&self, id: BookmarkId, patch: &BookmarkPatch) -> StoreResult<()> {
        (**self).update(id, patch)
    }

    fn delete_many(&self, ids: &[BookmarkId]) -> StoreResult<()> {
        (**self).delete_many(ids)
    }

    fn find_matches(&self, query: &BookmarkQuery) -> StoreResult<Vec<BookmarkId>> {
        (**self).find_matches(query)
    }

    fn subscribe(&self, owner: OwnerId) -> StoreResult<Subscription> {
        (**self).subscribe(owner)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        (**self).unsubscribe(id)
    }
}

impl<T: SessionProvider + ?Sized> SessionProvider for Arc<T> {
    fn current_user(&self) -> SessionResult<Option<User>> {
        (**self).current_user()
    }

    fn sign_out(&self) -> SessionResult<()> {
        (**self).sign_out()
    }
}
