//! Text matching rules for bookmark lookups.

use crate::bookmark::{Bookmark, OwnerId};
use serde::{Deserialize, Serialize};

/// Normalizes user-entered text for comparison: trimmed and lowercased.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// How user-entered text is compared against stored titles and urls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchRule {
    /// Byte-for-byte equality with the stored value.
    Exact,
    /// Equality after [`normalize`] on both sides.
    #[default]
    Normalized,
}

impl MatchRule {
    /// Returns true if `input` matches `stored` under this rule.
    ///
    /// Input that is empty after trimming never matches.
    pub fn matches(&self, input: &str, stored: &str) -> bool {
        if input.trim().is_empty() {
            return false;
        }
        match self {
            MatchRule::Exact => input == stored,
            MatchRule::Normalized => normalize(input) == normalize(stored),
        }
    }
}

/// Lookup of an owner's bookmarks by title OR url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkQuery {
    /// Owner whose bookmarks are searched.
    pub owner: OwnerId,
    /// Title to look for; empty never matches.
    pub title: String,
    /// Url to look for; empty never matches.
    pub url: String,
    /// Comparison rule.
    pub rule: MatchRule,
}

impl BookmarkQuery {
    /// Creates a query using the default rule.
    pub fn new(owner: OwnerId, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            owner,
            title: title.into(),
            url: url.into(),
            rule: MatchRule::default(),
        }
    }

    /// Sets the comparison rule.
    pub fn with_rule(mut self, rule: MatchRule) -> Self {
        self.rule = rule;
        self
    }

    /// Returns true if both lookup keys are blank.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.url.trim().is_empty()
    }

    /// Returns true if the bookmark belongs to the owner and matches either key.
    pub fn matches(&self, bookmark: &Bookmark) -> bool {
        bookmark.owner == self.owner
            && (self.rule.matches(&self.title, &bookmark.title)
                || self.rule.matches(&self.url, &bookmark.url))
    }
}
