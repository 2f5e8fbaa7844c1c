//! Seed file loading.
//!
//! A seed file is a JSON array of `{"title": ..., "url": ...}` objects added
//! through the engine at startup, so the usual validation applies.

use super::ShellResult;
use linkshelf_protocol::{BookmarkStore, SessionProvider};
use linkshelf_sync_engine::SyncEngine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// One bookmark in a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEntry {
    /// Bookmark title.
    pub title: String,
    /// Bookmark url.
    pub url: String,
}

/// Reads a seed file.
pub fn load(path: &Path) -> ShellResult<Vec<SeedEntry>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Adds seed entries through the engine. Returns how many were added.
///
/// Entries the engine rejects are logged and skipped.
pub fn apply<S, P>(engine: &mut SyncEngine<S, P>, entries: &[SeedEntry]) -> usize
where
    S: BookmarkStore,
    P: SessionProvider,
{
    let mut added = 0;
    for entry in entries {
        engine.set_title_input(entry.title.as_str());
        engine.set_url_input(entry.url.as_str());
        match engine.add_bookmark() {
            Ok(_) => added += 1,
            Err(e) => warn!(title = %entry.title, error = %e, "skipping seed entry"),
        }
    }
    engine.process_events();
    added
}
