//! Bookmark rows with per-owner visibility.

use crate::auth::now_millis;
use linkshelf_protocol::{Bookmark, BookmarkId, BookmarkPatch, BookmarkQuery, OwnerId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct Row {
    /// Insertion order; breaks ties between equal timestamps.
    seq: u64,
    bookmark: Bookmark,
}

#[derive(Default)]
struct Rows {
    by_id: HashMap<BookmarkId, Row>,
    next_seq: u64,
}

/// The bookmark table.
///
/// Every read and write is scoped to an owner: rows belonging to other
/// owners are never returned or modified.
#[derive(Default)]
pub struct BookmarkTable {
    rows: RwLock<Rows>,
}

impl BookmarkTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new row and returns the stored record.
    pub fn insert(&self, owner: OwnerId, title: &str, url: &str) -> Bookmark {
        let bookmark = Bookmark {
            id: BookmarkId::new(),
            title: title.to_string(),
            url: url.to_string(),
            owner,
            created_at: now_millis(),
        };

        let mut rows = self.rows.write();
        let seq = rows.next_seq;
        rows.next_seq += 1;
        rows.by_id.insert(
            bookmark.id,
            Row {
                seq,
                bookmark: bookmark.clone(),
            },
        );
        bookmark
    }

    /// Returns the owner's rows, newest first by creation.
    pub fn list(&self, owner: OwnerId) -> Vec<Bookmark> {
        let rows = self.rows.read();
        let mut owned: Vec<&Row> = rows
            .by_id
            .values()
            .filter(|row| row.bookmark.owner == owner)
            .collect();
        owned.sort_by(|a, b| {
            (b.bookmark.created_at, b.seq).cmp(&(a.bookmark.created_at, a.seq))
        });
        owned.into_iter().map(|row| row.bookmark.clone()).collect()
    }

    /// Returns one of the owner's rows.
    pub fn get(&self, owner: OwnerId, id: BookmarkId) -> Option<Bookmark> {
        self.rows
            .read()
            .by_id
            .get(&id)
            .filter(|row| row.bookmark.owner == owner)
            .map(|row| row.bookmark.clone())
    }

    /// Applies a patch to one of the owner's rows.
    ///
    /// Returns the updated record, or `None` if the row does not exist or
    /// belongs to someone else.
    pub fn update(&self, owner: OwnerId, id: BookmarkId, patch: &BookmarkPatch) -> Option<Bookmark> {
        let mut rows = self.rows.write();
        let row = rows
            .by_id
            .get_mut(&id)
            .filter(|row| row.bookmark.owner == owner)?;
        row.bookmark = row.bookmark.patched(patch);
        Some(row.bookmark.clone())
    }

    /// Deletes the owner's rows among `ids`. Returns the ids actually removed.
    pub fn delete_many(&self, owner: OwnerId, ids: &[BookmarkId]) -> Vec<BookmarkId> {
        let mut rows = self.rows.write();
        let mut seen = HashSet::new();
        let mut removed = Vec::new();
        for id in ids {
            if !seen.insert(*id) {
                continue;
            }
            let owned = rows
                .by_id
                .get(id)
                .is_some_and(|row| row.bookmark.owner == owner);
            if owned {
                rows.by_id.remove(id);
                removed.push(*id);
            }
        }
        removed
    }

    /// Returns the ids of rows matching the query, newest first.
    pub fn find(&self, query: &BookmarkQuery) -> Vec<BookmarkId> {
        self.list(query.owner)
            .into_iter()
            .filter(|bookmark| query.matches(bookmark))
            .map(|bookmark| bookmark.id)
            .collect()
    }

    /// Returns the total number of rows across all owners.
    pub fn len(&self) -> usize {
        self.rows.read().by_id.len()
    }

    /// Returns true if the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkshelf_protocol::MatchRule;

    #[test]
    fn list_is_newest_first() {
        let table = BookmarkTable::new();
        let owner = OwnerId::new();
        let first = table.insert(owner, "First", "a.com");
        let second = table.insert(owner, "Second", "b.com");

        let listed = table.list(owner);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[test]
    fn rows_are_scoped_to_owner() {
        let table = BookmarkTable::new();
        let alice = OwnerId::new();
        let bob = OwnerId::new();
        let row = table.insert(alice, "Docs", "a.com");

        assert!(table.list(bob).is_empty());
        assert!(table.get(bob, row.id).is_none());
        assert!(table
            .update(bob, row.id, &BookmarkPatch::both("x", "y"))
            .is_none());
        assert!(table.delete_many(bob, &[row.id]).is_empty());
        assert_eq!(table.get(alice, row.id), Some(row));
    }

    #[test]
    fn update_applies_patch() {
        let table = BookmarkTable::new();
        let owner = OwnerId::new();
        let row = table.insert(owner, "Docs", "a.com");

        let updated = table
            .update(owner, row.id, &BookmarkPatch::both("Rust", "rust-lang.org"))
            .unwrap();
        assert_eq!(updated.title, "Rust");
        assert_eq!(updated.url, "rust-lang.org");
        assert_eq!(updated.created_at, row.created_at);
    }

    #[test]
    fn delete_many_skips_duplicates_and_unknown() {
        let table = BookmarkTable::new();
        let owner = OwnerId::new();
        let row = table.insert(owner, "Docs", "a.com");

        let removed = table.delete_many(owner, &[row.id, row.id, BookmarkId::new()]);
        assert_eq!(removed, vec![row.id]);
        assert!(table.is_empty());
    }

    #[test]
    fn find_uses_query_rule() {
        let table = BookmarkTable::new();
        let owner = OwnerId::new();
        let docs = table.insert(owner, "Docs", "a.com");
        table.insert(owner, "Blog", "b.com");

        let exact = BookmarkQuery::new(owner, "docs", "").with_rule(MatchRule::Exact);
        assert!(table.find(&exact).is_empty());

        let normalized = BookmarkQuery::new(owner, "docs", "");
        assert_eq!(table.find(&normalized), vec![docs.id]);
    }
}
