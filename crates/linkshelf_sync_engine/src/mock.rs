//! Test doubles for the backend boundary.

use linkshelf_protocol::{
    Bookmark, BookmarkId, BookmarkPatch, BookmarkQuery, BookmarkStore, ChangeEvent, OwnerId,
    SessionError, SessionProvider, SessionResult, StoreError, StoreResult, Subscription,
    SubscriptionId, User,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};

/// A call received by [`MockStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `list(owner)`.
    List(OwnerId),
    /// `create(owner, title, url)`.
    Create {
        /// Owner passed by the caller.
        owner: OwnerId,
        /// Title passed by the caller.
        title: String,
        /// Url passed by the caller.
        url: String,
    },
    /// `update(id, patch)`.
    Update(BookmarkId, BookmarkPatch),
    /// `delete_many(ids)`.
    DeleteMany(Vec<BookmarkId>),
    /// `find_matches(query)`.
    FindMatches(BookmarkQuery),
    /// `subscribe(owner)`.
    Subscribe(OwnerId),
    /// `unsubscribe(id)`.
    Unsubscribe(SubscriptionId),
}

impl StoreCall {
    /// Returns true for create, update and delete calls.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StoreCall::Create { .. } | StoreCall::Update(..) | StoreCall::DeleteMany(_)
        )
    }
}

#[derive(Default)]
struct MockState {
    /// Newest first.
    rows: Vec<Bookmark>,
    calls: Vec<StoreCall>,
    subscribers: HashMap<SubscriptionId, (OwnerId, Sender<ChangeEvent>)>,
    next_subscription: u64,
    clock: u64,
}

impl MockState {
    fn emit(&mut self, event: ChangeEvent) {
        let owner = event.owner();
        for (sub_owner, tx) in self.subscribers.values() {
            if *sub_owner == owner {
                let _ = tx.send(event.clone());
            }
        }
    }
}

/// An in-memory [`BookmarkStore`] that records every call.
///
/// Writes echo change events to subscribers unless echoing is switched off,
/// and any class of call can be made to fail.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<MockState>,
    fail_writes: AtomicBool,
    fail_queries: AtomicBool,
    silent: AtomicBool,
}

impl MockStore {
    /// Creates an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row directly, without recording a call or emitting an event.
    pub fn seed(&self, owner: OwnerId, title: &str, url: &str) -> Bookmark {
        let mut state = self.state.lock();
        state.clock += 1;
        let bookmark = Bookmark {
            id: BookmarkId::new(),
            title: title.to_string(),
            url: url.to_string(),
            owner,
            created_at: state.clock,
        };
        state.rows.insert(0, bookmark.clone());
        bookmark
    }

    /// Makes create, update and delete fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes list, find and subscribe fail.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Stops writes from emitting change events.
    pub fn set_silent(&self, silent: bool) {
        self.silent.store(silent, Ordering::SeqCst);
    }

    /// Delivers an event to the owner's subscribers as if the backend sent it.
    pub fn push_event(&self, event: ChangeEvent) {
        self.state.lock().emit(event);
    }

    /// Returns all recorded calls in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().calls.clone()
    }

    /// Returns the number of recorded write calls.
    pub fn write_calls(&self) -> usize {
        self.state.lock().calls.iter().filter(|c| c.is_write()).count()
    }

    /// Returns the number of open subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// Returns the owner's rows, newest first.
    pub fn rows(&self, owner: OwnerId) -> Vec<Bookmark> {
        self.state
            .lock()
            .rows
            .iter()
            .filter(|b| b.owner == owner)
            .cloned()
            .collect()
    }

    fn check(&self, flag: &AtomicBool) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("mock failure".into()))
        } else {
            Ok(())
        }
    }

    fn echo(&self, state: &mut MockState, events: Vec<ChangeEvent>) {
        if self.silent.load(Ordering::SeqCst) {
            return;
        }
        for event in events {
            state.emit(event);
        }
    }
}

impl BookmarkStore for MockStore {
    fn list(&self, owner: OwnerId) -> StoreResult<Vec<Bookmark>> {
        self.state.lock().calls.push(StoreCall::List(owner));
        self.check(&self.fail_queries)?;
        Ok(self.rows(owner))
    }

    fn create(&self, owner: OwnerId, title: &str, url: &str) -> StoreResult<Bookmark> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::Create {
            owner,
            title: title.to_string(),
            url: url.to_string(),
        });
        self.check(&self.fail_writes)?;

        state.clock += 1;
        let bookmark = Bookmark {
            id: BookmarkId::new(),
            title: title.to_string(),
            url: url.to_string(),
            owner,
            created_at: state.clock,
        };
        state.rows.insert(0, bookmark.clone());
        self.echo(&mut state, vec![ChangeEvent::created(bookmark.clone())]);
        Ok(bookmark)
    }

    fn update(&self, id: BookmarkId, patch: &BookmarkPatch) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::Update(id, patch.clone()));
        self.check(&self.fail_writes)?;

        let updated = state.rows.iter_mut().find(|b| b.id == id).map(|row| {
            *row = row.patched(patch);
            row.clone()
        });
        if let Some(record) = updated {
            self.echo(&mut state, vec![ChangeEvent::updated(record)]);
        }
        Ok(())
    }

    fn delete_many(&self, ids: &[BookmarkId]) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::DeleteMany(ids.to_vec()));
        self.check(&self.fail_writes)?;

        let mut removed = Vec::new();
        state.rows.retain(|b| {
            if ids.contains(&b.id) {
                removed.push(ChangeEvent::deleted(b.id, b.owner));
                false
            } else {
                true
            }
        });
        self.echo(&mut state, removed);
        Ok(())
    }

    fn find_matches(&self, query: &BookmarkQuery) -> StoreResult<Vec<BookmarkId>> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::FindMatches(query.clone()));
        self.check(&self.fail_queries)?;
        Ok(state
            .rows
            .iter()
            .filter(|b| query.matches(b))
            .map(|b| b.id)
            .collect())
    }

    fn subscribe(&self, owner: OwnerId) -> StoreResult<Subscription> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::Subscribe(owner));
        self.check(&self.fail_queries)?;

        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        let (tx, rx) = mpsc::channel();
        state.subscribers.insert(id, (owner, tx));
        Ok(Subscription::new(id, owner, rx))
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::Unsubscribe(id));
        state.subscribers.remove(&id);
    }
}

/// A [`SessionProvider`] with a fixed user.
#[derive(Debug, Default)]
pub struct MockSession {
    user: Mutex<Option<User>>,
    fail_sign_out: AtomicBool,
    sign_out_calls: AtomicUsize,
}

impl MockSession {
    /// Creates a provider with the given user signed in.
    pub fn signed_in(user: User) -> Self {
        Self {
            user: Mutex::new(Some(user)),
            ..Self::default()
        }
    }

    /// Creates a provider with nobody signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Makes `sign_out` fail.
    pub fn set_fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    /// Returns how many times `sign_out` was called.
    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

impl SessionProvider for MockSession {
    fn current_user(&self) -> SessionResult<Option<User>> {
        Ok(self.user.lock().clone())
    }

    fn sign_out(&self) -> SessionResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(SessionError::Unavailable("mock failure".into()));
        }
        *self.user.lock() = None;
        Ok(())
    }
}
