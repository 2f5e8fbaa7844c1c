//! The in-process backend and its per-session clients.

use crate::auth::{AuthConfig, TokenValidator};
use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::feed::ChangeFeed;
use crate::table::BookmarkTable;
use linkshelf_protocol::{
    Bookmark, BookmarkId, BookmarkPatch, BookmarkQuery, BookmarkStore, ChangeEvent, OwnerId,
    SessionProvider, SessionResult, StoreResult, Subscription, SubscriptionId, User,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

struct Shared {
    table: BookmarkTable,
    feed: ChangeFeed,
    validator: TokenValidator,
    /// Registered users by email.
    users: RwLock<HashMap<String, OwnerId>>,
    available: AtomicBool,
}

/// Reference backend holding bookmark rows, users and the change feed.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct MemoryBackend {
    shared: Arc<Shared>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new(config: BackendConfig) -> Self {
        let auth = AuthConfig::new(config.auth_secret).with_expiry(config.session_ttl);
        Self {
            shared: Arc::new(Shared {
                table: BookmarkTable::new(),
                feed: ChangeFeed::new(),
                validator: TokenValidator::new(auth),
                users: RwLock::new(HashMap::new()),
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Signs a user in by email, registering them on first use.
    ///
    /// Stands in for the identity provider's OAuth exchange: the returned
    /// client carries a freshly signed session token.
    pub fn sign_in(&self, email: &str) -> BackendResult<BackendClient> {
        self.check_available()?;
        let email = email.trim();
        if email.is_empty() {
            return Err(BackendError::InvalidRequest("email is required".into()));
        }

        let owner = *self
            .shared
            .users
            .write()
            .entry(email.to_string())
            .or_insert_with(OwnerId::new);
        let token = self.shared.validator.create_token(owner)?;
        info!(%owner, email, "user signed in");

        Ok(BackendClient {
            shared: Arc::clone(&self.shared),
            email: email.to_string(),
            token: Arc::new(RwLock::new(Some(token))),
        })
    }

    /// Switches the backend on or off. While off every call fails.
    pub fn set_available(&self, available: bool) {
        self.shared.available.store(available, Ordering::SeqCst);
    }

    /// Returns true if the backend is accepting calls.
    pub fn is_available(&self) -> bool {
        self.shared.available.load(Ordering::SeqCst)
    }

    /// Returns the bookmark table.
    pub fn table(&self) -> &BookmarkTable {
        &self.shared.table
    }

    /// Returns the change feed.
    pub fn feed(&self) -> &ChangeFeed {
        &self.shared.feed
    }

    fn check_available(&self) -> BackendResult<()> {
        check_available(&self.shared)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}

fn check_available(shared: &Shared) -> BackendResult<()> {
    if shared.available.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err(BackendError::Unavailable)
    }
}

/// One signed-in session against a [`MemoryBackend`].
///
/// Implements [`SessionProvider`] for the session and [`BookmarkStore`] for
/// the rows it can see. Clones share the session: signing out through one
/// clone signs out all of them.
#[derive(Clone)]
pub struct BackendClient {
    shared: Arc<Shared>,
    email: String,
    token: Arc<RwLock<Option<Vec<u8>>>>,
}

impl BackendClient {
    /// Returns the email this client signed in with.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns true if the client still holds a session token.
    pub fn is_signed_in(&self) -> bool {
        self.token.read().is_some()
    }

    /// Resolves the signed-in user for a store call.
    fn caller(&self) -> BackendResult<OwnerId> {
        check_available(&self.shared)?;
        let token = self.token.read();
        let token = token.as_deref().ok_or(BackendError::NotSignedIn)?;
        self.shared.validator.validate_token(token)
    }

    fn require_owner(&self, owner: OwnerId) -> BackendResult<OwnerId> {
        let caller = self.caller()?;
        if caller != owner {
            return Err(BackendError::NotAuthorized(format!(
                "session user {caller} cannot act for {owner}"
            )));
        }
        Ok(caller)
    }
}

impl SessionProvider for BackendClient {
    fn current_user(&self) -> SessionResult<Option<User>> {
        check_available(&self.shared)?;
        let token = self.token.read();
        let Some(token) = token.as_deref() else {
            return Ok(None);
        };
        match self.shared.validator.validate_token(token) {
            Ok(id) => Ok(Some(User::new(id, self.email.clone()))),
            Err(BackendError::AuthenticationFailed(reason)) => {
                debug!(%reason, "session token rejected");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn sign_out(&self) -> SessionResult<()> {
        check_available(&self.shared)?;
        if self.token.write().take().is_some() {
            info!(email = %self.email, "user signed out");
        }
        Ok(())
    }
}

impl BookmarkStore for BackendClient {
    fn list(&self, owner: OwnerId) -> StoreResult<Vec<Bookmark>> {
        let caller = self.caller()?;
        if caller != owner {
            return Ok(Vec::new());
        }
        Ok(self.shared.table.list(owner))
    }

    fn create(&self, owner: OwnerId, title: &str, url: &str) -> StoreResult<Bookmark> {
        let owner = self.require_owner(owner)?;
        let bookmark = self.shared.table.insert(owner, title, url);
        debug!(id = %bookmark.id, %owner, "bookmark created");
        self.shared.feed.emit(ChangeEvent::created(bookmark.clone()));
        Ok(bookmark)
    }

    fn update(&self, id: BookmarkId, patch: &BookmarkPatch) -> StoreResult<()> {
        let caller = self.caller()?;
        match self.shared.table.update(caller, id, patch) {
            Some(updated) => {
                debug!(%id, "bookmark updated");
                self.shared.feed.emit(ChangeEvent::updated(updated));
            }
            None => debug!(%id, "update matched no visible row"),
        }
        Ok(())
    }

    fn delete_many(&self, ids: &[BookmarkId]) -> StoreResult<()> {
        let caller = self.caller()?;
        let removed = self.shared.table.delete_many(caller, ids);
        debug!(requested = ids.len(), removed = removed.len(), "bookmarks deleted");
        self.shared.feed.emit_batch(
            removed
                .into_iter()
                .map(|id| ChangeEvent::deleted(id, caller))
                .collect(),
        );
        Ok(())
    }

    fn find_matches(&self, query: &BookmarkQuery) -> StoreResult<Vec<BookmarkId>> {
        let caller = self.caller()?;
        if caller != query.owner {
            return Ok(Vec::new());
        }
        Ok(self.shared.table.find(query))
    }

    fn subscribe(&self, owner: OwnerId) -> StoreResult<Subscription> {
        let owner = self.require_owner(owner)?;
        Ok(self.shared.feed.subscribe(owner))
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.shared.feed.unsubscribe(id);
    }
}
