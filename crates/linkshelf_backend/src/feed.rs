//! Owner-filtered change feed.
//!
//! The feed distributes committed bookmark changes to subscribers. Each
//! subscriber is bound to one owner and only receives that owner's events.
//!
//! # Usage
//!
//! ```rust,ignore
//! let feed = ChangeFeed::new();
//! let sub = feed.subscribe(owner);
//!
//! feed.emit(ChangeEvent::created(bookmark));
//! assert!(sub.try_next().is_some());
//!
//! feed.unsubscribe(sub.id());
//! ```

use linkshelf_protocol::{ChangeEvent, OwnerId, Subscription, SubscriptionId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use tracing::debug;

struct Subscriber {
    owner: OwnerId,
    tx: Sender<ChangeEvent>,
}

/// Fan-out of committed bookmark changes, keyed by subscription.
///
/// An event reaches only the subscriptions opened for its owner. A
/// subscription whose receiver is gone is removed on the next emit for that
/// owner.
pub struct ChangeFeed {
    subscribers: RwLock<HashMap<SubscriptionId, Subscriber>>,
    next_id: AtomicU64,
    emitted: AtomicU64,
}

impl ChangeFeed {
    /// Creates a feed with no subscriptions.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            emitted: AtomicU64::new(0),
        }
    }

    /// Subscribes to one owner's changes.
    ///
    /// The returned subscription receives every event for `owner` emitted
    /// after this call, until it is unsubscribed or dropped.
    pub fn subscribe(&self, owner: OwnerId) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.subscribers.write().insert(id, Subscriber { owner, tx });
        debug!(%id, %owner, "feed subscription opened");
        Subscription::new(id, owner, rx)
    }

    /// Removes a subscriber. Returns false if the id was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.write().remove(&id).is_some();
        if removed {
            debug!(%id, "feed subscription released");
        }
        removed
    }

    /// Emits a change event to every subscriber of the event's owner.
    pub fn emit(&self, event: ChangeEvent) {
        self.emitted.fetch_add(1, Ordering::SeqCst);
        let owner = event.owner();

        // Other owners' entries are kept untouched; a failed send drops the entry.
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|_, sub| sub.owner != owner || sub.tx.send(event.clone()).is_ok());
    }

    /// Emits the events of one write, in order.
    pub fn emit_batch(&self, events: Vec<ChangeEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    /// Returns the number of open subscriptions across all owners.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Returns the number of active subscribers for one owner.
    pub fn subscriber_count_for(&self, owner: OwnerId) -> usize {
        self.subscribers
            .read()
            .values()
            .filter(|sub| sub.owner == owner)
            .count()
    }

    /// Returns the total number of events emitted.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::SeqCst)
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
