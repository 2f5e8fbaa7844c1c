//! # Linkshelf Backend
//!
//! In-process reference backend for Linkshelf.
//!
//! This crate provides:
//! - A bookmark table with per-user row ownership
//! - A change feed filtered by owner
//! - Session tokens signed with HMAC-SHA256
//! - An availability switch for exercising failure paths
//!
//! # Architecture
//!
//! A [`MemoryBackend`] holds the shared state. Signing a user in returns a
//! [`BackendClient`], which implements both boundary traits from
//! `linkshelf_protocol`: it is the user's session and their view of the
//! bookmark table. Several clients for the same user behave like several
//! open browser tabs: a write through one is delivered to the others via the
//! change feed.
//!
//! ```rust,ignore
//! use linkshelf_backend::{BackendConfig, MemoryBackend};
//!
//! let backend = MemoryBackend::new(BackendConfig::default());
//! let client = backend.sign_in("ada@example.com")?;
//! ```
//!
//! # Row ownership
//!
//! Rows that do not belong to the signed-in user are invisible to the
//! client: lookups skip them and updates or deletes aimed at them affect
//! nothing.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod backend;
mod config;
mod error;
mod feed;
mod table;

pub use auth::{AuthConfig, TokenValidator, TOKEN_LEN};
pub use backend::{BackendClient, MemoryBackend};
pub use config::BackendConfig;
pub use error::{BackendError, BackendResult};
pub use feed::ChangeFeed;
pub use table::BookmarkTable;
