//! The local, ordered view of one owner's bookmarks.

use linkshelf_protocol::{normalize, Bookmark, BookmarkId, ChangeEvent};
use std::collections::HashSet;

/// Bookmarks for the signed-in owner, newest first.
///
/// Every mutation is keyed by bookmark id, which makes merging feed events
/// idempotent: a record is inserted at most once, removing an absent id does
/// nothing, and replacing an absent id does nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalView {
    items: Vec<Bookmark>,
}

impl LocalView {
    /// Creates an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a view from a snapshot that is already newest first.
    ///
    /// Later duplicates of an id are dropped.
    pub fn from_snapshot(snapshot: Vec<Bookmark>) -> Self {
        let mut seen = HashSet::new();
        let items = snapshot
            .into_iter()
            .filter(|bookmark| seen.insert(bookmark.id))
            .collect();
        Self { items }
    }

    /// Merges one change event. Returns true if the view changed.
    pub fn apply(&mut self, event: &ChangeEvent) -> bool {
        match event {
            ChangeEvent::Created { record } => self.insert_front(record.clone()),
            ChangeEvent::Updated { record } => self.replace(record.clone()),
            ChangeEvent::Deleted { id, .. } => self.remove(*id),
        }
    }

    /// Inserts at the front unless the id is already present.
    pub fn insert_front(&mut self, bookmark: Bookmark) -> bool {
        if self.contains(bookmark.id) {
            return false;
        }
        self.items.insert(0, bookmark);
        true
    }

    /// Replaces the bookmark with the same id in place.
    pub fn replace(&mut self, bookmark: Bookmark) -> bool {
        match self.items.iter_mut().find(|b| b.id == bookmark.id) {
            Some(slot) if *slot != bookmark => {
                *slot = bookmark;
                true
            }
            _ => false,
        }
    }

    /// Removes the bookmark with the given id.
    pub fn remove(&mut self, id: BookmarkId) -> bool {
        let before = self.items.len();
        self.items.retain(|b| b.id != id);
        self.items.len() != before
    }

    /// Removes every bookmark whose id is listed. Returns how many were removed.
    pub fn remove_all(&mut self, ids: &[BookmarkId]) -> usize {
        let ids: HashSet<&BookmarkId> = ids.iter().collect();
        let before = self.items.len();
        self.items.retain(|b| !ids.contains(&b.id));
        before - self.items.len()
    }

    /// Returns the bookmark with the given id.
    pub fn get(&self, id: BookmarkId) -> Option<&Bookmark> {
        self.items.iter().find(|b| b.id == id)
    }

    /// Returns true if a bookmark with the given id is present.
    pub fn contains(&self, id: BookmarkId) -> bool {
        self.get(id).is_some()
    }

    /// Finds a bookmark whose url equals `url` ignoring case and padding.
    pub fn find_url(&self, url: &str) -> Option<&Bookmark> {
        let needle = normalize(url);
        self.items.iter().find(|b| normalize(&b.url) == needle)
    }

    /// Finds a bookmark whose title equals `title` ignoring case and padding.
    pub fn find_title(&self, title: &str) -> Option<&Bookmark> {
        let needle = normalize(title);
        self.items.iter().find(|b| normalize(&b.title) == needle)
    }

    /// Returns the bookmarks, newest first.
    pub fn as_slice(&self) -> &[Bookmark] {
        &self.items
    }

    /// Iterates over the bookmarks, newest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Bookmark> {
        self.items.iter()
    }

    /// Returns the number of bookmarks.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the view is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a LocalView {
    type Item = &'a Bookmark;
    type IntoIter = std::slice::Iter<'a, Bookmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkshelf_protocol::OwnerId;

    fn bookmark(title: &str, url: &str) -> Bookmark {
        Bookmark {
            id: BookmarkId::new(),
            title: title.into(),
            url: url.into(),
            owner: OwnerId::from_bytes([1u8; 16]),
            created_at: 0,
        }
    }

    fn titles(view: &LocalView) -> Vec<&str> {
        view.iter().map(|b| b.title.as_str()).collect()
    }

    #[test]
    fn created_goes_to_front_once() {
        let mut view = LocalView::from_snapshot(vec![bookmark("Old", "old.com")]);
        let new = bookmark("New", "new.com");

        assert!(view.apply(&ChangeEvent::created(new.clone())));
        assert!(!view.apply(&ChangeEvent::created(new)));
        assert_eq!(titles(&view), vec!["New", "Old"]);
    }

    #[test]
    fn updated_replaces_in_place() {
        let a = bookmark("A", "a.com");
        let b = bookmark("B", "b.com");
        let mut view = LocalView::from_snapshot(vec![a.clone(), b.clone()]);

        let mut renamed = b.clone();
        renamed.title = "Bee".into();
        assert!(view.apply(&ChangeEvent::updated(renamed.clone())));
        assert!(!view.apply(&ChangeEvent::updated(renamed)));
        assert_eq!(titles(&view), vec!["A", "Bee"]);
    }

    #[test]
    fn updated_for_absent_id_is_noop() {
        let mut view = LocalView::new();
        assert!(!view.apply(&ChangeEvent::updated(bookmark("A", "a.com"))));
        assert!(view.is_empty());
    }

    #[test]
    fn deleted_removes_by_id() {
        let a = bookmark("A", "a.com");
        let mut view = LocalView::from_snapshot(vec![a.clone()]);
        let event = ChangeEvent::deleted(a.id, a.owner);

        assert!(view.apply(&event));
        assert!(!view.apply(&event));
        assert!(view.is_empty());
    }

    #[test]
    fn snapshot_drops_duplicate_ids() {
        let a = bookmark("A", "a.com");
        let view = LocalView::from_snapshot(vec![a.clone(), a.clone()]);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn lookups_ignore_case_and_padding() {
        let view = LocalView::from_snapshot(vec![bookmark("Docs", "Docs.RS")]);
        assert!(view.find_url("  docs.rs ").is_some());
        assert!(view.find_title("DOCS").is_some());
        assert!(view.find_title("Blog").is_none());
    }

    #[test]
    fn remove_all_counts() {
        let a = bookmark("A", "a.com");
        let b = bookmark("B", "b.com");
        let mut view = LocalView::from_snapshot(vec![a.clone(), b.clone()]);

        assert_eq!(view.remove_all(&[a.id, BookmarkId::new()]), 1);
        assert_eq!(titles(&view), vec!["B"]);
    }
}
