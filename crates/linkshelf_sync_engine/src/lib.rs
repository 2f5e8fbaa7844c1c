//! # Linkshelf Sync Engine
//!
//! Client-side bookmark synchronization for Linkshelf.
//!
//! This crate provides:
//! - `SyncEngine`, the in-memory view of one owner's bookmarks
//! - Local validation (blank fields, duplicate urls and titles)
//! - Idempotent merging of change-feed events
//! - The edit-state machine (`Viewing` / `Editing`)
//! - Transient notices that expire on their own
//! - Mock store and session for testing
//!
//! ## Architecture
//!
//! The engine sits between the presentation layer and a backend reached
//! through the `BookmarkStore` and `SessionProvider` traits:
//! 1. An intent is validated against the local view
//! 2. The store write is issued and the view updated on success
//! 3. The change feed echoes the write (and other sessions' writes) back
//! 4. `process_events` merges the echo by id
//!
//! ## Key Invariants
//!
//! - Invalid input never reaches the store
//! - Every bookmark id appears in the view at most once
//! - Merging the same event twice is a no-op
//! - At most one bookmark is in edit mode
//! - The feed subscription is released on sign-out and on drop

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod edit;
mod engine;
mod error;
mod mock;
mod notice;
mod validate;
mod view;

pub use config::EngineConfig;
pub use context::{SessionContext, SessionOutcome};
pub use edit::{EditSession, EditState};
pub use engine::{EngineStats, FormInputs, SyncEngine};
pub use error::{EngineError, EngineResult};
pub use mock::{MockSession, MockStore, StoreCall};
pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use validate::{lookup_keys, new_bookmark, required_fields, ValidFields};
pub use view::LocalView;
