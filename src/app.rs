//! Interactive command loop: one handler per user action.
//!
//! Control flow follows the pages of the original client: the session
//! gate admits a command, the account's notes are fetched, filtered and
//! rendered, and every successful mutation is followed by a full
//! reconciliation (re-fetch + re-render). The client never patches its
//! cached collection; the fetch result is the only truth it holds.
//!
//! All I/O is awaited in-line on one task, so rendering is atomic between
//! suspension points and no two writes to the screen interleave.

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::{CloudService, NoteStore};
use crate::popup::PopupController;
use crate::session::Session;
use crate::views::{
    render_dashboard, render_edit_panel, render_note_panel, FormatContext, NoteListView, ViewState,
};

/// File the exported PDF is written to, mirroring the name the service
/// publishes it under.
const EXPORT_FILE: &str = "exported_notes.pdf";

pub struct App<S: CloudService> {
    store: S,
    session: Session,
    view: ViewState,
    list: NoteListView,
    popup: PopupController,
    ctx: FormatContext,
}

impl<S: CloudService> App<S> {
    pub fn new(store: S, session: Session) -> Self {
        Self {
            store,
            session,
            view: ViewState::default(),
            list: NoteListView::new(),
            popup: PopupController::new(),
            ctx: FormatContext::from_env(),
        }
    }

    /// Read commands until `quit` or end of input.
    pub async fn run(&mut self) {
        println!("{}", self.session.badge());
        println!("Type `help` for commands.");

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            print!("> ");
            std::io::stdout().flush().ok();

            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    log::warn!("stdin error: {}", e);
                    break;
                }
            };

            if !self.dispatch(line.trim()).await {
                break;
            }
        }
    }

    /// Route one command line. Returns false to stop the loop.
    async fn dispatch(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return true;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "help" => self.cmd_help(),
            "quit" | "exit" => return false,

            "login" => self.cmd_login(rest).await,
            "signup" => self.cmd_signup(rest).await,
            "signout" => self.cmd_signout(),

            "list" => self.cmd_list().await,
            "search" => self.cmd_search(rest).await,
            "clear" => self.cmd_clear().await,
            "add" => self.cmd_add(rest).await,
            "edit" => self.cmd_edit(rest).await,
            "delete" => self.cmd_delete(rest).await,
            "open" => self.cmd_open(rest).await,
            "find" => self.cmd_find(rest).await,

            "title" => self.cmd_title(rest),
            "body" => self.cmd_body(rest),
            "save" => self.cmd_save().await,
            "adopt" => self.cmd_adopt().await,
            "close" => self.cmd_close(),

            "dashboard" => self.cmd_dashboard().await,
            "analytics" => self.cmd_analytics().await,
            "export" => self.cmd_export().await,

            _ => println!("Unknown command: {} (try `help`)", command),
        }

        true
    }

    fn cmd_help(&self) {
        println!(
            "\
Accounts:  login <user> <password> | signup <user> <password> | signout
Notes:     list | search <query> | clear | add <title> :: <body>
           edit <row> | delete <row> | open <row> | find <query>
Popups:    title <text> | body <text> | save | adopt | close
Pages:     dashboard | analytics | export
           help | quit"
        );
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    async fn cmd_login(&mut self, rest: &str) {
        let Some((user, password)) = rest.split_once(char::is_whitespace) else {
            println!("Usage: login <user> <password>");
            return;
        };

        match self.store.login(user.trim(), password.trim()).await {
            Ok(()) => {
                if let Err(e) = self.session.sign_in(user.trim()) {
                    println!("{}", e);
                }
                println!("{}", self.session.badge());
            }
            Err(e) => println!("{}", e),
        }
    }

    async fn cmd_signup(&mut self, rest: &str) {
        let Some((user, password)) = rest.split_once(char::is_whitespace) else {
            println!("Usage: signup <user> <password>");
            return;
        };

        match self.store.signup(user.trim(), password.trim()).await {
            Ok(()) => {
                if let Err(e) = self.session.sign_in(user.trim()) {
                    println!("{}", e);
                }
                println!("{}", self.session.badge());
            }
            Err(e) => println!("Signup failed: {}", e),
        }
    }

    fn cmd_signout(&mut self) {
        if let Err(e) = self.session.sign_out() {
            println!("{}", e);
        }
        self.popup.close();
        self.view = ViewState::default();
        println!("{}", self.session.badge());
    }

    // ------------------------------------------------------------------
    // Note list
    // ------------------------------------------------------------------

    /// Discard the cached collection, re-fetch, and re-render the list.
    /// Runs after every successful mutation.
    async fn reconcile(&mut self) {
        let account = match self.session.ensure_auth() {
            Ok(a) => a.to_string(),
            Err(e) => {
                println!("{}", e);
                return;
            }
        };

        self.view.notes = self.store.fetch_all(&account).await;
        let visible = self.view.visible();
        print!("{}", self.list.render_list(&account, &visible, &self.ctx));
    }

    async fn cmd_list(&mut self) {
        self.reconcile().await;
    }

    async fn cmd_search(&mut self, query: &str) {
        self.view.query = query.to_string();
        self.reconcile().await;
    }

    async fn cmd_clear(&mut self) {
        self.view.query.clear();
        self.reconcile().await;
    }

    async fn cmd_add(&mut self, rest: &str) {
        let account = match self.session.ensure_auth() {
            Ok(a) => a.to_string(),
            Err(e) => {
                println!("{}", e);
                return;
            }
        };

        let (title, body) = match rest.split_once("::") {
            Some((t, b)) => (t.trim(), b.trim()),
            None => ("", rest.trim()),
        };
        if body.is_empty() && title.is_empty() {
            println!("Usage: add <title> :: <body>");
            return;
        }

        match self.store.create(&account, title, body).await {
            Ok(()) => self.reconcile().await,
            Err(e) => println!("Error saving note: {}", e),
        }
    }

    async fn cmd_delete(&mut self, rest: &str) {
        let account = match self.session.ensure_auth() {
            Ok(a) => a.to_string(),
            Err(e) => {
                println!("{}", e);
                return;
            }
        };

        let Some(row) = rest.parse().ok().and_then(|n: usize| self.list.row(n)) else {
            println!("No such row: {}", rest);
            return;
        };
        if self.session.is_foreign(&row.owner) {
            println!("Not your note; use `open {}` to view it.", row.ordinal);
            return;
        }
        let note_id = row.note.id.clone();

        match self.store.delete(&account, &note_id).await {
            Ok(()) => self.reconcile().await,
            Err(e) => println!("Delete failed: {}", e),
        }
    }

    async fn cmd_edit(&mut self, rest: &str) {
        if let Err(e) = self.session.ensure_auth() {
            println!("{}", e);
            return;
        }

        let Some(row) = rest.parse().ok().and_then(|n: usize| self.list.row(n)) else {
            println!("No such row: {}", rest);
            return;
        };

        if self.session.is_foreign(&row.owner) {
            println!("Not your note; use `open {}` to view it.", row.ordinal);
            return;
        }

        // The draft is seeded from the rendered snapshot, not a fresh
        // fetch.
        let note = row.note.clone();
        self.popup.open_edit(&note);
        print!("{}", render_edit_panel(&note.title, &note.body, &self.ctx));
    }

    /// Open the full note: foreign rows go to the read-only popup, own
    /// rows straight to the edit popup.
    async fn cmd_open(&mut self, rest: &str) {
        let Some(row) = rest.parse().ok().and_then(|n: usize| self.list.row(n)) else {
            println!("No such row: {}", rest);
            return;
        };
        let (owner, note_id, ordinal) = (row.owner.clone(), row.note.id.clone(), row.ordinal);

        if !self.session.is_foreign(&owner) {
            self.cmd_edit(&ordinal.to_string()).await;
            return;
        }

        // Population silently shows nothing when the note has vanished.
        if let Some(note) = self.popup.open_foreign(&self.store, &owner, &note_id).await {
            print!("{}", render_note_panel(&owner, &note, &self.ctx));
            println!("(`adopt` to save a copy to your notes, `close` to close)");
        }
    }

    async fn cmd_find(&mut self, query: &str) {
        let hits = self.store.search_all(query).await;
        print!("{}", self.list.render_search_results(&hits, &self.ctx));
    }

    // ------------------------------------------------------------------
    // Popup actions
    // ------------------------------------------------------------------

    fn cmd_title(&mut self, text: &str) {
        if !self.popup.set_title(text) {
            println!("No edit in progress");
        }
    }

    fn cmd_body(&mut self, text: &str) {
        if !self.popup.set_body(text) {
            println!("No edit in progress");
        }
    }

    async fn cmd_save(&mut self) {
        let account = match self.session.ensure_auth() {
            Ok(a) => a.to_string(),
            Err(e) => {
                println!("{}", e);
                return;
            }
        };

        match self.popup.save_edit(&self.store, &account).await {
            Ok(()) => self.reconcile().await,
            Err(e) => println!("Edit failed: {}", e),
        }
    }

    async fn cmd_adopt(&mut self) {
        let account = match self.session.ensure_auth() {
            Ok(a) => a.to_string(),
            Err(e) => {
                println!("{}", e);
                return;
            }
        };

        match self.popup.adopt(&self.store, &account).await {
            Ok(()) => {
                println!("Saved to your notes!");
                self.reconcile().await;
            }
            Err(e) => println!("{}", e),
        }
    }

    fn cmd_close(&mut self) {
        self.popup.close();
        println!("(closed)");
    }

    // ------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------

    async fn cmd_dashboard(&mut self) {
        let account = match self.session.ensure_auth() {
            Ok(a) => a.to_string(),
            Err(e) => {
                println!("{}", e);
                return;
            }
        };

        let notes = self.store.fetch_all(&account).await;
        let recommendations = self.store.recommendations(&account).await;
        print!(
            "{}",
            render_dashboard(&notes, recommendations.as_deref(), &self.ctx)
        );
    }

    async fn cmd_analytics(&mut self) {
        let account = match self.session.ensure_auth() {
            Ok(a) => a.to_string(),
            Err(e) => {
                println!("{}", e);
                return;
            }
        };

        match self.store.analytics(&account).await {
            Some(report) => {
                let keywords = if report.keywords.is_empty() {
                    "—".to_string()
                } else {
                    report.keywords.join(", ")
                };
                println!("Keywords: {}", keywords);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report.raw).unwrap_or_default()
                );
            }
            None => println!("Error loading analytics"),
        }
    }

    async fn cmd_export(&mut self) {
        let account = match self.session.ensure_auth() {
            Ok(a) => a.to_string(),
            Err(e) => {
                println!("{}", e);
                return;
            }
        };

        match self.store.export_pdf(&account).await {
            Ok(bytes) => match std::fs::write(EXPORT_FILE, &bytes) {
                Ok(()) => println!("Exported {} bytes to {}", bytes.len(), EXPORT_FILE),
                Err(e) => println!("Could not write {}: {}", EXPORT_FILE, e),
            },
            Err(e) => println!("{}", e),
        }
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;
