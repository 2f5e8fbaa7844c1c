//! Local validation rules applied before any store write.

use crate::error::{EngineError, EngineResult};
use crate::view::LocalView;

/// Title and url that passed validation, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFields {
    /// Trimmed title.
    pub title: String,
    /// Trimmed url.
    pub url: String,
}

/// Checks that both fields are non-blank and returns them trimmed.
pub fn required_fields(title: &str, url: &str) -> EngineResult<ValidFields> {
    let title = title.trim();
    let url = url.trim();
    if title.is_empty() || url.is_empty() {
        return Err(EngineError::EmptyField);
    }
    Ok(ValidFields {
        title: title.to_string(),
        url: url.to_string(),
    })
}

/// Validates an add intent against the current view.
///
/// Rules run in order: blank fields, duplicate url, duplicate title. Urls and
/// titles are compared trimmed and case-insensitively.
pub fn new_bookmark(view: &LocalView, title: &str, url: &str) -> EngineResult<ValidFields> {
    let fields = required_fields(title, url)?;

    if let Some(existing) = view.find_url(&fields.url) {
        return Err(EngineError::DuplicateUrl {
            existing_title: existing.title.clone(),
        });
    }

    if let Some(existing) = view.find_title(&fields.title) {
        return Err(EngineError::DuplicateTitle {
            title: existing.title.clone(),
        });
    }

    Ok(fields)
}

/// Validates a delete-by-text intent: at least one lookup key is required.
pub fn lookup_keys(title: &str, url: &str) -> EngineResult<()> {
    if title.trim().is_empty() && url.trim().is_empty() {
        return Err(EngineError::EmptyField);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkshelf_protocol::{Bookmark, BookmarkId, OwnerId};

    fn view_with(title: &str, url: &str) -> LocalView {
        LocalView::from_snapshot(vec![Bookmark {
            id: BookmarkId::new(),
            title: title.into(),
            url: url.into(),
            owner: OwnerId::new(),
            created_at: 0,
        }])
    }

    #[test]
    fn blank_fields_rejected() {
        let view = LocalView::new();
        assert_eq!(new_bookmark(&view, "", "a.com"), Err(EngineError::EmptyField));
        assert_eq!(new_bookmark(&view, "Docs", "   "), Err(EngineError::EmptyField));
    }

    #[test]
    fn fields_are_trimmed() {
        let fields = new_bookmark(&LocalView::new(), "  Docs ", " a.com\n").unwrap();
        assert_eq!(fields.title, "Docs");
        assert_eq!(fields.url, "a.com");
    }

    #[test]
    fn duplicate_url_names_existing_title() {
        let view = view_with("Docs", "https://Docs.rs");
        assert_eq!(
            new_bookmark(&view, "Other", "https://docs.RS"),
            Err(EngineError::DuplicateUrl {
                existing_title: "Docs".into()
            })
        );
    }

    #[test]
    fn duplicate_title_ignores_case() {
        let view = view_with("Docs", "a.com");
        assert!(matches!(
            new_bookmark(&view, "docs", "b.com"),
            Err(EngineError::DuplicateTitle { .. })
        ));
    }

    #[test]
    fn url_checked_before_title() {
        let view = view_with("Docs", "a.com");
        assert!(matches!(
            new_bookmark(&view, "Docs", "A.com"),
            Err(EngineError::DuplicateUrl { .. })
        ));
    }

    #[test]
    fn lookup_needs_one_key() {
        assert_eq!(lookup_keys(" ", ""), Err(EngineError::EmptyField));
        assert!(lookup_keys("Docs", "").is_ok());
        assert!(lookup_keys("", "a.com").is_ok());
    }
}
