//! The sync engine: local view, intents and change-feed merging.

use crate::config::EngineConfig;
use crate::context::{SessionContext, SessionOutcome};
use crate::edit::{EditSession, EditState};
use crate::error::{EngineError, EngineResult};
use crate::notice::{Intent, Notice, NoticeBoard, NoticeKind};
use crate::validate;
use crate::view::LocalView;
use linkshelf_protocol::{
    Bookmark, BookmarkId, BookmarkPatch, BookmarkQuery, BookmarkStore, ChangeEvent, OwnerId,
    SessionProvider, Subscription, SubscriptionId, User,
};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Text bound to an edit session whose fields are blank.
const EMPTY_EDIT_FIELDS: &str = "Fields cannot be empty";
/// Text bound to an edit session whose update failed.
const FAILED_UPDATE: &str = "Failed to update";
/// Notice raised after a successful save.
const UPDATED: &str = "Updated!";

/// Raw text of the add/delete input fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInputs {
    /// Title field.
    pub title: String,
    /// Url field.
    pub url: String,
}

impl FormInputs {
    /// Empties both fields.
    pub fn clear(&mut self) {
        self.title.clear();
        self.url.clear();
    }
}

/// Counters describing engine activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Feed events received for the signed-in owner.
    pub events_received: u64,
    /// Feed events that changed the view.
    pub events_applied: u64,
    /// Store writes issued (create, update, delete).
    pub writes_issued: u64,
    /// Store writes that failed.
    pub writes_failed: u64,
}

/// Keeps one owner's bookmarks in sync with the store.
///
/// The engine owns the [`LocalView`], the edit state and the add/delete form
/// for a single signed-in session. It is driven from one thread: intents and
/// [`process_events`](Self::process_events) take `&mut self`. Feed events are
/// merged by id, so a write confirmed locally and echoed by the feed is
/// applied only once.
///
/// Dropping the engine releases its feed subscription.
pub struct SyncEngine<S: BookmarkStore, P: SessionProvider> {
    config: EngineConfig,
    context: SessionContext<S, P>,
    user: Option<User>,
    view: LocalView,
    edit: EditState,
    form: FormInputs,
    notices: NoticeBoard,
    subscription: Option<Subscription>,
    stats: EngineStats,
}

impl<S: BookmarkStore, P: SessionProvider> SyncEngine<S, P> {
    /// Starts an engine for the current user, loading their bookmarks.
    ///
    /// Fails with [`EngineError::NotSignedIn`] if nobody is signed in and
    /// with [`EngineError::StoreQueryFailure`] if the load or subscription
    /// fails.
    pub fn start(context: SessionContext<S, P>, config: EngineConfig) -> EngineResult<Self> {
        let user = Self::resolve_user(&context)?;
        let snapshot = context.store().list(user.id).map_err(|e| {
            warn!(owner = %user.id, error = %e, "initial load failed");
            EngineError::StoreQueryFailure(e)
        })?;
        Self::open(context, config, user, snapshot)
    }

    /// Starts an engine from a snapshot the caller already holds.
    ///
    /// The snapshot must be newest first. Records of other owners are dropped.
    pub fn with_snapshot(
        context: SessionContext<S, P>,
        config: EngineConfig,
        snapshot: Vec<Bookmark>,
    ) -> EngineResult<Self> {
        let user = Self::resolve_user(&context)?;
        Self::open(context, config, user, snapshot)
    }

    fn resolve_user(context: &SessionContext<S, P>) -> EngineResult<User> {
        context
            .session()
            .current_user()?
            .ok_or(EngineError::NotSignedIn)
    }

    fn open(
        context: SessionContext<S, P>,
        config: EngineConfig,
        user: User,
        snapshot: Vec<Bookmark>,
    ) -> EngineResult<Self> {
        let owner = user.id;
        let total = snapshot.len();
        let snapshot: Vec<Bookmark> = snapshot.into_iter().filter(|b| b.owner == owner).collect();
        if snapshot.len() != total {
            debug!(dropped = total - snapshot.len(), "snapshot held foreign records");
        }

        let subscription = context.store().subscribe(owner).map_err(|e| {
            warn!(%owner, error = %e, "subscribe failed");
            EngineError::StoreQueryFailure(e)
        })?;
        info!(%owner, subscription = %subscription.id(), bookmarks = snapshot.len(), "sync engine started");

        Ok(Self {
            notices: NoticeBoard::new(config.notice_ttl),
            config,
            context,
            user: Some(user),
            view: LocalView::from_snapshot(snapshot),
            edit: EditState::default(),
            form: FormInputs::default(),
            subscription: Some(subscription),
            stats: EngineStats::default(),
        })
    }

    // === Accessors ===

    /// Returns the signed-in user, or `None` after sign-out.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Returns the name used to greet the user.
    pub fn welcome_name(&self) -> Option<&str> {
        self.user.as_ref().map(User::display_name)
    }

    /// Returns the local view.
    pub fn view(&self) -> &LocalView {
        &self.view
    }

    /// Returns the bookmarks, newest first.
    pub fn bookmarks(&self) -> &[Bookmark] {
        self.view.as_slice()
    }

    /// Returns the edit state.
    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Returns the add/delete form.
    pub fn form(&self) -> &FormInputs {
        &self.form
    }

    /// Sets the title field of the add/delete form.
    pub fn set_title_input(&mut self, title: impl Into<String>) {
        self.form.title = title.into();
    }

    /// Sets the url field of the add/delete form.
    pub fn set_url_input(&mut self, url: impl Into<String>) {
        self.form.url = url.into();
    }

    /// Returns the current notice unless it has expired.
    pub fn notice(&self) -> Option<&Notice> {
        self.notices.current()
    }

    /// Returns the notice visible at `now`.
    pub fn notice_at(&self, now: Instant) -> Option<&Notice> {
        self.notices.current_at(now)
    }

    /// Returns activity counters.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns true while the feed subscription is open.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Returns the id of the open feed subscription.
    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription.as_ref().map(Subscription::id)
    }

    // === Change feed ===

    /// Merges pending feed events, up to the configured batch limit.
    ///
    /// Returns the number of events that changed the view.
    pub fn process_events(&mut self) -> usize {
        self.merge_pending()
            .iter()
            .filter(|(_, changed)| *changed)
            .count()
    }

    /// Merges pending feed events and returns each one with whether it
    /// changed the view.
    pub fn merge_pending(&mut self) -> Vec<(ChangeEvent, bool)> {
        let events = match &self.subscription {
            Some(subscription) => subscription.drain(self.config.event_batch_limit),
            None => return Vec::new(),
        };
        let mut merged = Vec::with_capacity(events.len());
        for event in events {
            let changed = self.apply_event(&event);
            merged.push((event, changed));
        }
        merged
    }

    /// Merges one change event into the view.
    ///
    /// Events for other owners are ignored. A deleted event for the bookmark
    /// being edited also closes the edit session. Returns true if the view
    /// changed.
    pub fn apply_event(&mut self, event: &ChangeEvent) -> bool {
        let Some(owner) = self.user.as_ref().map(|u| u.id) else {
            return false;
        };
        if event.owner() != owner {
            debug!(id = %event.bookmark_id(), "ignoring event for another owner");
            return false;
        }

        self.stats.events_received += 1;
        let changed = self.view.apply(event);
        if changed {
            self.stats.events_applied += 1;
        }
        debug!(kind = ?event.kind(), id = %event.bookmark_id(), changed, "merged feed event");

        if let ChangeEvent::Deleted { id, .. } = event {
            if self.edit.editing_id() == Some(*id) {
                self.edit.end();
                info!(%id, "edited bookmark was deleted remotely");
            }
        }
        changed
    }

    // === Intents ===

    /// Adds a bookmark from the form fields.
    ///
    /// Validation runs locally against the view; the store is contacted only
    /// if it passes. On success the record is at the front of the view and the
    /// form is cleared.
    pub fn add_bookmark(&mut self) -> EngineResult<Bookmark> {
        let result = self.try_add();
        self.report(Intent::Add, &result);
        result
    }

    fn try_add(&mut self) -> EngineResult<Bookmark> {
        let owner = self.owner()?;
        let fields = validate::new_bookmark(&self.view, &self.form.title, &self.form.url)?;

        self.stats.writes_issued += 1;
        let created = self
            .context
            .store()
            .create(owner, &fields.title, &fields.url)
            .map_err(|e| {
                self.stats.writes_failed += 1;
                warn!(error = %e, "create failed");
                EngineError::StoreWriteFailure(e)
            })?;

        self.view.insert_front(created.clone());
        self.form.clear();
        debug!(id = %created.id, "bookmark added");
        Ok(created)
    }

    /// Deletes every bookmark whose title or url matches the form fields.
    ///
    /// Returns the deleted ids.
    pub fn delete_bookmarks(&mut self) -> EngineResult<Vec<BookmarkId>> {
        let result = self.try_delete();
        self.report(Intent::Delete, &result);
        result
    }

    fn try_delete(&mut self) -> EngineResult<Vec<BookmarkId>> {
        let owner = self.owner()?;
        validate::lookup_keys(&self.form.title, &self.form.url)?;

        let query = BookmarkQuery::new(owner, self.form.title.as_str(), self.form.url.as_str())
            .with_rule(self.config.delete_match);
        let ids = self.context.store().find_matches(&query).map_err(|e| {
            warn!(error = %e, "delete lookup failed");
            EngineError::StoreQueryFailure(e)
        })?;
        if ids.is_empty() {
            return Err(EngineError::NotFound);
        }

        self.stats.writes_issued += 1;
        self.context.store().delete_many(&ids).map_err(|e| {
            self.stats.writes_failed += 1;
            warn!(count = ids.len(), error = %e, "delete failed");
            EngineError::StoreWriteFailure(e)
        })?;

        let removed = self.view.remove_all(&ids);
        if let Some(editing) = self.edit.editing_id() {
            if ids.contains(&editing) {
                self.edit.end();
            }
        }
        self.form.clear();
        debug!(matched = ids.len(), removed, "bookmarks deleted");
        Ok(ids)
    }

    /// Puts a bookmark into edit mode, discarding any other active edit.
    pub fn begin_edit(&mut self, id: BookmarkId) -> EngineResult<()> {
        self.owner()?;
        let bookmark = self.view.get(id).ok_or(EngineError::UnknownBookmark(id))?;
        if let Some(discarded) = self.edit.begin(bookmark) {
            debug!(id = %discarded.id, "discarded previous edit");
        }
        Ok(())
    }

    /// Changes the working title of the active edit.
    pub fn edit_title(&mut self, title: impl Into<String>) -> EngineResult<()> {
        self.edit.set_title(title)
    }

    /// Changes the working url of the active edit.
    pub fn edit_url(&mut self, url: impl Into<String>) -> EngineResult<()> {
        self.edit.set_url(url)
    }

    /// Saves the active edit.
    ///
    /// On failure the session stays open with an error message bound to it.
    pub fn save_edit(&mut self) -> EngineResult<()> {
        self.owner()?;
        let session = self.edit.session().ok_or(EngineError::NoActiveEdit)?;
        let id = session.id;

        let fields = match validate::required_fields(&session.title, &session.url) {
            Ok(fields) => fields,
            Err(e) => {
                self.edit.fail(EMPTY_EDIT_FIELDS);
                return Err(e);
            }
        };

        let patch = BookmarkPatch::both(fields.title, fields.url);
        self.stats.writes_issued += 1;
        if let Err(e) = self.context.store().update(id, &patch) {
            self.stats.writes_failed += 1;
            warn!(%id, error = %e, "update failed");
            self.edit.fail(FAILED_UPDATE);
            return Err(EngineError::StoreWriteFailure(e));
        }

        self.edit.end();
        if let Some(updated) = self.view.get(id).map(|b| b.patched(&patch)) {
            self.view.replace(updated);
        }
        self.notices.post(NoticeKind::Success, UPDATED);
        debug!(%id, "bookmark updated");
        Ok(())
    }

    /// Discards the active edit without contacting the store.
    pub fn cancel_edit(&mut self) -> Option<EditSession> {
        self.edit.end()
    }

    /// Signs the user out.
    ///
    /// On success the feed is released and the view, edit state and form are
    /// cleared. On failure everything is kept and the user stays signed in.
    pub fn sign_out(&mut self) -> SessionOutcome {
        match self.context.session().sign_out() {
            Ok(()) => {
                self.release();
                self.user = None;
                self.view.clear();
                self.edit.end();
                self.form.clear();
                self.notices.clear();
                info!("signed out");
                SessionOutcome::SignedOut
            }
            Err(e) => {
                error!(error = %e, "sign-out failed");
                SessionOutcome::AuthError(e)
            }
        }
    }

    /// Releases the feed subscription. Later calls do nothing.
    pub fn shutdown(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.context.store().unsubscribe(subscription.id());
            debug!(subscription = %subscription.id(), "released feed subscription");
        }
    }

    fn owner(&self) -> EngineResult<OwnerId> {
        self.user
            .as_ref()
            .map(|u| u.id)
            .ok_or(EngineError::NotSignedIn)
    }

    fn report<T>(&mut self, intent: Intent, result: &EngineResult<T>) {
        match result {
            Ok(_) => self.notices.post(NoticeKind::Success, intent.success_text()),
            Err(e) => self.notices.post(NoticeKind::Error, intent.failure_text(e)),
        }
    }
}

impl<S: BookmarkStore, P: SessionProvider> Drop for SyncEngine<S, P> {
    fn drop(&mut self) {
        self.release();
    }
}
