//! Cloud Notes client library - re-exports for the binary and for tests.
//!
//! The library carries all the state logic of the terminal client: the
//! remote store boundary, the search filter, the list/dashboard views,
//! the popup state machine, and the session gate. The binary in
//! `main.rs` is only the interactive loop around it.

pub mod api;
pub mod app;
pub mod config;
pub mod models;
pub mod popup;
pub mod search;
pub mod session;
pub mod views;

// Re-export commonly used types
pub use api::{CloudService, HttpStore, NoteStore};
pub use app::App;
pub use config::{api_root, session_file, validate_api_root, DEFAULT_API_ROOT};
pub use models::{AnalyticsReport, ExportStatus, Note, SearchHit};
pub use popup::{PopupController, PopupState};
pub use search::filter_notes;
pub use session::Session;
pub use views::{
    render_dashboard, render_edit_panel, render_note_panel, FormatContext, NoteListView, NoteRow,
    ViewState,
};
