//! Tests for the command loop's reconciliation discipline: every
//! successful mutation must be followed by a re-fetch and a refreshed
//! row map, and ownership checks must run before mutations dispatch.

use super::*;
use crate::api::{CloudService, NoteStore};
use crate::models::{AnalyticsReport, Note, SearchHit};
use crate::session::Session;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

// ============================================================================
// Fake Service
// ============================================================================

/// In-memory service double with per-account collections and a call log.
#[derive(Default)]
struct FakeService {
    collections: Mutex<HashMap<String, Vec<Note>>>,
    calls: Mutex<Vec<String>>,
    next_id: Mutex<u32>,
}

impl FakeService {
    fn new() -> Self {
        Self {
            next_id: Mutex::new(100),
            ..Self::default()
        }
    }

    fn seed(&self, account: &str, notes: Vec<Note>) {
        self.collections
            .lock()
            .unwrap()
            .insert(account.to_string(), notes);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn fetch_count(&self, account: &str) -> usize {
        let marker = format!("fetch_all({})", account);
        self.calls().iter().filter(|c| **c == marker).count()
    }
}

impl NoteStore for FakeService {
    async fn fetch_all(&self, account: &str) -> Vec<Note> {
        self.calls.lock().unwrap().push(format!("fetch_all({})", account));
        self.collections
            .lock()
            .unwrap()
            .get(account)
            .cloned()
            .unwrap_or_default()
    }

    async fn create(&self, account: &str, title: &str, body: &str) -> Result<(), String> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create({},{},{})", account, title, body));

        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let note = Note {
            id: format!("N{}", *next_id),
            title: title.to_string(),
            body: body.to_string(),
            timestamp: "2024-06-15 10:30:00".to_string(),
        };

        self.collections
            .lock()
            .unwrap()
            .entry(account.to_string())
            .or_default()
            .push(note);
        Ok(())
    }

    async fn edit(
        &self,
        account: &str,
        note_id: &str,
        title: &str,
        body: &str,
    ) -> Result<(), String> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("edit({},{},{},{})", account, note_id, title, body));

        let mut collections = self.collections.lock().unwrap();
        let note = collections
            .get_mut(account)
            .and_then(|notes| notes.iter_mut().find(|n| n.id == note_id))
            .ok_or_else(|| "ERR".to_string())?;
        note.title = title.to_string();
        note.body = body.to_string();
        Ok(())
    }

    async fn delete(&self, account: &str, note_id: &str) -> Result<(), String> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("delete({},{})", account, note_id));

        let mut collections = self.collections.lock().unwrap();
        let notes = collections
            .get_mut(account)
            .ok_or_else(|| "ERR".to_string())?;
        notes.retain(|n| n.id != note_id);
        Ok(())
    }

    async fn search_all(&self, query: &str) -> Vec<SearchHit> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for (user, notes) in self.collections.lock().unwrap().iter() {
            for n in notes {
                let combined = format!("{} {}", n.title, n.body).to_lowercase();
                if combined.contains(&q) {
                    hits.push(SearchHit {
                        user: user.clone(),
                        id: n.id.clone(),
                        title: n.title.clone(),
                        body: n.body.clone(),
                        timestamp: n.timestamp.clone(),
                    });
                }
            }
        }
        hits
    }
}

impl CloudService for FakeService {
    async fn login(&self, _account: &str, _password: &str) -> Result<(), String> {
        Ok(())
    }

    async fn signup(&self, _account: &str, _password: &str) -> Result<(), String> {
        Ok(())
    }

    async fn export_pdf(&self, _account: &str) -> Result<Vec<u8>, String> {
        Ok(b"%PDF-1.4 fake export".to_vec())
    }

    async fn recommendations(&self, _account: &str) -> Option<Vec<String>> {
        Some(Vec::new())
    }

    async fn analytics(&self, _account: &str) -> Option<AnalyticsReport> {
        None
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn note(id: &str, title: &str, body: &str) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        timestamp: "2024-06-15 10:30:00".to_string(),
    }
}

fn session_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("cloud_notes_app_{}_{}", name, std::process::id()));
    path
}

/// An app signed in as alice, with alice's usual two notes seeded.
fn alice_app(name: &str) -> App<FakeService> {
    let store = FakeService::new();
    store.seed(
        "alice",
        vec![note("1", "Shop", "milk"), note("2", "Work", "report")],
    );

    let mut session = Session::load(session_path(name));
    session.sign_in("alice").unwrap();
    App::new(store, session)
}

// ============================================================================
// Reconciliation after mutations
// ============================================================================

#[tokio::test]
async fn test_add_refetches_and_refreshes_rows() {
    let mut app = alice_app("add");

    app.dispatch("add Trip :: pack bags").await;

    let calls = app.store.calls();
    assert!(calls.contains(&"create(alice,Trip,pack bags)".to_string()));
    assert_eq!(app.store.fetch_count("alice"), 1);

    // Row map reflects the post-mutation fetch, newest first.
    let ids = app.list.visible_ids();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], "N101");
    assert_eq!(&ids[1..], ["2", "1"]);
}

#[tokio::test]
async fn test_delete_row_refetches_and_refreshes_rows() {
    let mut app = alice_app("delete");

    app.dispatch("list").await;
    assert_eq!(app.list.visible_ids(), vec!["2", "1"]);

    // Row 1 is the most recent note, id "2".
    app.dispatch("delete 1").await;

    assert!(app.store.calls().contains(&"delete(alice,2)".to_string()));
    assert_eq!(app.store.fetch_count("alice"), 2);
    assert_eq!(app.list.visible_ids(), vec!["1"]);
}

#[tokio::test]
async fn test_save_refetches_and_refreshes_rows() {
    let mut app = alice_app("save");

    app.dispatch("list").await;
    app.dispatch("edit 2").await;
    app.dispatch("body milk, eggs").await;
    app.dispatch("save").await;

    let calls = app.store.calls();
    let edits: Vec<&String> = calls.iter().filter(|c| c.starts_with("edit(")).collect();
    assert_eq!(edits, vec!["edit(alice,1,Shop,milk, eggs)"]);
    assert_eq!(app.store.fetch_count("alice"), 2);

    let row = app.list.row(2).unwrap();
    assert_eq!(row.note.id, "1");
    assert_eq!(row.note.body, "milk, eggs");
}

#[tokio::test]
async fn test_adopt_refetches_and_refreshes_rows() {
    let mut app = alice_app("adopt");
    app.store.seed("bob", vec![note("9", "T", "B")]);

    app.popup.open_foreign(&app.store, "bob", "9").await;
    app.dispatch("adopt").await;

    assert!(app.store.calls().contains(&"create(alice,T,B)".to_string()));
    // The adopt is followed by a reconciliation fetch of alice's own
    // collection, and the adopted copy shows up in the row map.
    assert_eq!(app.store.fetch_count("alice"), 1);
    let ids = app.list.visible_ids();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&"N101".to_string()));
}

#[tokio::test]
async fn test_failed_save_does_not_reconcile() {
    let mut app = alice_app("failed_save");

    app.dispatch("list").await;
    app.dispatch("edit 2").await;
    // Force a rejected edit by pointing the draft at a vanished note.
    app.store.delete("alice", "1").await.unwrap();
    let fetches_before = app.store.fetch_count("alice");

    app.dispatch("save").await;

    // No reconciliation fetch happened and the draft is still open.
    assert_eq!(app.store.fetch_count("alice"), fetches_before);
    assert!(app.popup.is_open());
}

// ============================================================================
// Ownership checks
// ============================================================================

#[tokio::test]
async fn test_delete_of_foreign_row_is_refused() {
    let mut app = alice_app("foreign_delete");
    app.store.seed("bob", vec![note("9", "Bob note", "hello everyone")]);

    // A `find` can put foreign rows in the map.
    app.dispatch("find hello").await;
    assert_eq!(app.list.row(1).unwrap().owner, "bob");

    app.dispatch("delete 1").await;

    assert!(app.store.calls().iter().all(|c| !c.starts_with("delete(")));
}

#[tokio::test]
async fn test_edit_of_foreign_row_is_refused() {
    let mut app = alice_app("foreign_edit");
    app.store.seed("bob", vec![note("9", "Bob note", "hello everyone")]);

    app.dispatch("find hello").await;
    app.dispatch("edit 1").await;

    assert!(!app.popup.is_open());
    assert!(app.store.calls().iter().all(|c| !c.starts_with("edit(")));
}

#[tokio::test]
async fn test_signed_out_edit_opens_nothing() {
    let store = FakeService::new();
    let session = Session::load(session_path("signed_out"));
    let mut app = App::new(store, session);

    app.dispatch("edit 1").await;

    assert!(!app.popup.is_open());
    assert!(app.store.calls().is_empty());
}
