//! Backend handles owned by one signed-in session.

use linkshelf_protocol::{BookmarkStore, SessionError, SessionProvider};

/// The store and session handles an engine works against.
///
/// Constructed by the embedding application and handed to the engine, which
/// owns it for the rest of the session.
#[derive(Debug, Clone)]
pub struct SessionContext<S, P> {
    store: S,
    session: P,
}

impl<S: BookmarkStore, P: SessionProvider> SessionContext<S, P> {
    /// Bundles a store and a session provider.
    pub fn new(store: S, session: P) -> Self {
        Self { store, session }
    }

    /// Returns the bookmark store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the session provider.
    pub fn session(&self) -> &P {
        &self.session
    }
}

/// Result of a sign-out intent, for the presentation layer to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The session ended. The view was cleared and the feed released.
    SignedOut,
    /// The provider refused to end the session; the user is still signed in.
    AuthError(SessionError),
}

impl SessionOutcome {
    /// Returns true if the session ended.
    pub fn is_signed_out(&self) -> bool {
        matches!(self, SessionOutcome::SignedOut)
    }
}
