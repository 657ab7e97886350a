//! Popup state machine: the inline edit draft and the read-only foreign
//! note view.
//!
//! At most one popup is open at a time; opening either replaces whatever
//! was open (last-opened wins, no stacking). Every transition goes
//! through the controller's entry points. Mutations are delegated to the
//! store, and the controller only reports success or a user-facing
//! message; reconciliation of the note list is the caller's job.

use crate::api::NoteStore;
use crate::models::Note;

/// Adopt / population failure message when the foreign note has vanished.
const RETRIEVAL_ERROR: &str = "Error retrieving note";

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PopupState {
    Closed,
    /// A mutable draft of an own note, seeded from the last-rendered
    /// snapshot of its values. Saving never re-fetches first, so two
    /// stale clients can silently overwrite each other; the wire
    /// protocol has no concurrency token to check.
    Edit {
        note_id: String,
        title: String,
        body: String,
    },
    /// A read-only reference into another account's collection. Holds no
    /// note data, only the lookup key pair; content is re-fetched on every
    /// use.
    ForeignView { owner: String, note_id: String },
}

// ============================================================================
// Controller
// ============================================================================

#[derive(Default)]
pub struct PopupController {
    state: PopupState,
}

impl Default for PopupState {
    fn default() -> Self {
        PopupState::Closed
    }
}

impl PopupController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PopupState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != PopupState::Closed
    }

    /// Unconditional transition to `Closed`.
    pub fn close(&mut self) {
        self.state = PopupState::Closed;
    }

    // ------------------------------------------------------------------
    // Edit popup
    // ------------------------------------------------------------------

    /// Open the edit popup seeded with the clicked row's rendered values.
    /// No fresh fetch happens here: the draft operates on the snapshot.
    pub fn open_edit(&mut self, note: &Note) {
        self.state = PopupState::Edit {
            note_id: note.id.clone(),
            title: note.title.clone(),
            body: note.body.clone(),
        };
    }

    /// Replace the draft title. Returns false when no edit is open.
    pub fn set_title(&mut self, new_title: &str) -> bool {
        if let PopupState::Edit { title, .. } = &mut self.state {
            *title = new_title.to_string();
            true
        } else {
            false
        }
    }

    /// Replace the draft body. Returns false when no edit is open.
    pub fn set_body(&mut self, new_body: &str) -> bool {
        if let PopupState::Edit { body, .. } = &mut self.state {
            *body = new_body.to_string();
            true
        } else {
            false
        }
    }

    /// Save the draft through the store. On success the popup closes and
    /// the caller must reconcile the list; on failure it stays open with
    /// the draft preserved and the server's message is returned.
    pub async fn save_edit<S: NoteStore>(
        &mut self,
        store: &S,
        account: &str,
    ) -> Result<(), String> {
        let (note_id, title, body) = match &self.state {
            PopupState::Edit {
                note_id,
                title,
                body,
            } => (note_id.clone(), title.clone(), body.clone()),
            _ => return Err("No edit in progress".to_string()),
        };

        store.edit(account, &note_id, &title, &body).await?;
        self.state = PopupState::Closed;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Foreign view popup
    // ------------------------------------------------------------------

    /// Open the read-only view of another account's note. The key pair is
    /// recorded, then the owner's full collection is re-fetched to locate
    /// the note; the caller's cached copy is never trusted. Returns the
    /// note content for display, or `None` when it is absent (deleted
    /// concurrently) with no error surfaced.
    ///
    /// There is no cancellation: closing before this resolves does not
    /// stop the fetch, and a late result is simply applied to whatever
    /// state exists when it lands.
    pub async fn open_foreign<S: NoteStore>(
        &mut self,
        store: &S,
        owner: &str,
        note_id: &str,
    ) -> Option<Note> {
        self.state = PopupState::ForeignView {
            owner: owner.to_string(),
            note_id: note_id.to_string(),
        };

        let notes = store.fetch_all(owner).await;
        notes.into_iter().find(|n| n.id == note_id)
    }

    /// Copy the currently viewed foreign note into `account`'s own
    /// collection. The owner's collection is re-fetched independently of
    /// the population fetch; if the note has vanished in between, a
    /// retrieval error is reported. The copy gets its own server-assigned
    /// id, after which the two notes are unrelated. The popup stays open.
    pub async fn adopt<S: NoteStore>(&mut self, store: &S, account: &str) -> Result<(), String> {
        let (owner, note_id) = match &self.state {
            PopupState::ForeignView { owner, note_id } => (owner.clone(), note_id.clone()),
            _ => return Err(RETRIEVAL_ERROR.to_string()),
        };

        let notes = store.fetch_all(&owner).await;
        let note = notes
            .into_iter()
            .find(|n| n.id == note_id)
            .ok_or_else(|| RETRIEVAL_ERROR.to_string())?;

        store.create(account, &note.title, &note.body).await
    }
}

#[cfg(test)]
#[path = "popup_test.rs"]
mod popup_test;
