//! Integration tests for the sync engine against the reference backend.

use linkshelf_backend::{BackendClient, MemoryBackend};
use linkshelf_protocol::{BookmarkStore, ChangeEvent, SessionProvider};
use linkshelf_sync_engine::{
    EngineConfig, EngineError, SessionContext, SessionOutcome, SyncEngine,
};

type Engine = SyncEngine<BackendClient, BackendClient>;

fn open_tab(backend: &MemoryBackend, email: &str) -> Engine {
    let client = backend.sign_in(email).unwrap();
    let context = SessionContext::new(client.clone(), client);
    SyncEngine::start(context, EngineConfig::default()).unwrap()
}

fn add(engine: &mut Engine, title: &str, url: &str) -> Result<(), EngineError> {
    engine.set_title_input(title);
    engine.set_url_input(url);
    engine.add_bookmark().map(|_| ())
}

fn titles(engine: &Engine) -> Vec<String> {
    engine.bookmarks().iter().map(|b| b.title.clone()).collect()
}

#[test]
fn two_tabs_stay_in_sync() {
    let backend = MemoryBackend::default();
    let mut first = open_tab(&backend, "ada@example.com");
    let mut second = open_tab(&backend, "ada@example.com");

    // Add in one tab, see it in the other
    add(&mut first, "Docs", "https://docs.rs").unwrap();
    assert_eq!(second.process_events(), 1);
    assert_eq!(titles(&second), vec!["Docs"]);

    // The echo to the writing tab is a no-op
    assert_eq!(first.process_events(), 0);
    assert_eq!(titles(&first), vec!["Docs"]);

    // Edit in the second tab
    let id = second.bookmarks()[0].id;
    second.begin_edit(id).unwrap();
    second.edit_title("Rust docs").unwrap();
    second.save_edit().unwrap();
    first.process_events();
    assert_eq!(titles(&first), vec!["Rust docs"]);

    // Delete in the first tab
    first.set_title_input("rust DOCS");
    first.set_url_input("");
    first.delete_bookmarks().unwrap();
    second.process_events();
    assert!(second.bookmarks().is_empty());
    assert!(backend.table().is_empty());
}

#[test]
fn owners_never_see_each_other() {
    let backend = MemoryBackend::default();
    let mut ada = open_tab(&backend, "ada@example.com");
    let mut bob = open_tab(&backend, "bob@example.com");

    add(&mut ada, "Docs", "a.com").unwrap();
    assert_eq!(bob.process_events(), 0);
    assert!(bob.bookmarks().is_empty());

    // Same url is fine for a different owner
    add(&mut bob, "Docs", "a.com").unwrap();

    // Bob's delete cannot reach Ada's row
    bob.set_title_input("Docs");
    bob.delete_bookmarks().unwrap();
    ada.process_events();
    assert_eq!(titles(&ada), vec!["Docs"]);
    assert_eq!(backend.table().len(), 1);
}

#[test]
fn initial_load_is_newest_first() {
    let backend = MemoryBackend::default();
    let mut writer = open_tab(&backend, "ada@example.com");
    add(&mut writer, "First", "1.com").unwrap();
    add(&mut writer, "Second", "2.com").unwrap();
    add(&mut writer, "Third", "3.com").unwrap();

    let reader = open_tab(&backend, "ada@example.com");
    assert_eq!(titles(&reader), vec!["Third", "Second", "First"]);
    assert_eq!(titles(&reader), titles(&writer));
}

#[test]
fn sign_out_releases_feed() {
    let backend = MemoryBackend::default();
    let mut engine = open_tab(&backend, "ada@example.com");
    let owner = engine.user().unwrap().id;
    add(&mut engine, "Docs", "a.com").unwrap();
    assert_eq!(backend.feed().subscriber_count_for(owner), 1);

    assert_eq!(engine.sign_out(), SessionOutcome::SignedOut);
    assert_eq!(backend.feed().subscriber_count_for(owner), 0);
    assert!(engine.bookmarks().is_empty());
    assert_eq!(engine.welcome_name(), None);

    // Rows survive the session
    assert_eq!(backend.table().len(), 1);
}

#[test]
fn sign_out_during_outage_keeps_session() {
    let backend = MemoryBackend::default();
    let mut engine = open_tab(&backend, "ada@example.com");
    add(&mut engine, "Docs", "a.com").unwrap();

    backend.set_available(false);
    assert!(matches!(engine.sign_out(), SessionOutcome::AuthError(_)));
    assert!(engine.is_subscribed());
    assert_eq!(titles(&engine), vec!["Docs"]);

    backend.set_available(true);
    assert!(engine.sign_out().is_signed_out());
}

#[test]
fn outage_surfaces_store_failures() {
    let backend = MemoryBackend::default();
    let mut engine = open_tab(&backend, "ada@example.com");
    add(&mut engine, "Docs", "a.com").unwrap();
    backend.set_available(false);

    let result = add(&mut engine, "Blog", "b.com");
    assert!(matches!(result, Err(EngineError::StoreWriteFailure(_))));
    assert_eq!(engine.notice().unwrap().text, "Failed to add");

    engine.set_title_input("Docs");
    let result = engine.delete_bookmarks();
    assert!(matches!(result, Err(EngineError::StoreQueryFailure(_))));
    assert_eq!(titles(&engine), vec!["Docs"]);

    let id = engine.bookmarks()[0].id;
    engine.begin_edit(id).unwrap();
    engine.edit_url("c.com").unwrap();
    assert!(engine.save_edit().is_err());
    assert!(engine.edit_state().is_editing());

    // No automatic retry once the backend is back
    backend.set_available(true);
    engine.process_events();
    assert_eq!(engine.bookmarks()[0].url, "a.com");
    assert_eq!(engine.stats().writes_failed, 2);
}

#[test]
fn start_fails_after_sign_out() {
    let backend = MemoryBackend::default();
    let client = backend.sign_in("ada@example.com").unwrap();
    client.sign_out().unwrap();

    let context = SessionContext::new(client.clone(), client);
    let result = SyncEngine::start(context, EngineConfig::default());
    assert!(matches!(result, Err(EngineError::NotSignedIn)));
}

#[test]
fn remote_delete_ends_local_edit() {
    let backend = MemoryBackend::default();
    let mut editor = open_tab(&backend, "ada@example.com");
    let mut other = open_tab(&backend, "ada@example.com");
    add(&mut editor, "Docs", "a.com").unwrap();
    other.process_events();

    editor.begin_edit(editor.bookmarks()[0].id).unwrap();
    other.set_url_input("A.COM");
    other.delete_bookmarks().unwrap();

    assert_eq!(editor.process_events(), 1);
    assert!(!editor.edit_state().is_editing());
    assert!(editor.bookmarks().is_empty());
}

#[test]
fn delete_batch_echo_is_idempotent() {
    let backend = MemoryBackend::default();
    let mut engine = open_tab(&backend, "ada@example.com");
    add(&mut engine, "Docs", "a.com").unwrap();
    add(&mut engine, "Blog", "b.com").unwrap();
    add(&mut engine, "News", "c.com").unwrap();
    engine.process_events();

    engine.set_title_input("Docs");
    engine.set_url_input("b.com");
    let ids = engine.delete_bookmarks().unwrap();
    assert_eq!(ids.len(), 2);

    // Replaying the deletes changes nothing
    let owner = engine.user().unwrap().id;
    for id in &ids {
        assert!(!engine.apply_event(&ChangeEvent::deleted(*id, owner)));
    }
    assert_eq!(engine.process_events(), 0);
    assert_eq!(titles(&engine), vec!["News"]);
}

#[test]
fn dropping_engine_unsubscribes() {
    let backend = MemoryBackend::default();
    let engine = open_tab(&backend, "ada@example.com");
    let owner = engine.user().unwrap().id;
    assert_eq!(backend.feed().subscriber_count_for(owner), 1);

    drop(engine);
    assert_eq!(backend.feed().subscriber_count_for(owner), 0);
}

#[test]
fn store_is_usable_directly() {
    // Writes made outside any engine still reach open engines
    let backend = MemoryBackend::default();
    let mut engine = open_tab(&backend, "ada@example.com");
    let client = backend.sign_in("ada@example.com").unwrap();
    let owner = client.current_user().unwrap().unwrap().id;

    client.create(owner, "Script", "s.com").unwrap();
    assert_eq!(engine.process_events(), 1);
    assert_eq!(titles(&engine), vec!["Script"]);
}
