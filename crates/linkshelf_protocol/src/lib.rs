//! # Linkshelf Protocol
//!
//! Bookmark data model and backend boundary for Linkshelf.
//!
//! This crate provides:
//! - `Bookmark` records and their identifiers
//! - `ChangeEvent` for the per-owner change feed
//! - `MatchRule` and `BookmarkQuery` for text lookups
//! - The `BookmarkStore` and `SessionProvider` boundary traits
//!
//! This is a pure protocol crate with no I/O operations. Backends implement
//! the boundary traits; the sync engine consumes them.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bookmark;
mod boundary;
mod change_feed;
mod error;
mod matching;

pub use bookmark::{Bookmark, BookmarkId, BookmarkPatch, OwnerId, User};
pub use boundary::{BookmarkStore, SessionProvider, Subscription, SubscriptionId};
pub use change_feed::{ChangeEvent, ChangeKind};
pub use error::{SessionError, SessionResult, StoreError, StoreResult};
pub use matching::{normalize, BookmarkQuery, MatchRule};
