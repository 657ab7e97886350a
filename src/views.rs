//! Rendering of note lists, the dashboard, and popup panels.
//!
//! Rendering is stateless between calls: every pass rebuilds the full
//! output string and the row map from scratch, replacing whatever was
//! rendered before. Actions never dispatch on rendered text; they resolve
//! through the row map (ordinal to owner + note) that the most recent
//! render produced.

use terminal_size::{terminal_size, Width};
use yansi::Paint;

use crate::models::{Note, SearchHit};
use crate::search::filter_notes;

/// How many notes the dashboard shows.
const DASHBOARD_NOTE_CAP: usize = 5;

/// Fallback width when the terminal geometry is unknown.
const DEFAULT_WIDTH: usize = 80;

// ============================================================================
// Format Context
// ============================================================================

/// Styling switches threaded through rendering. Color is dropped when
/// `NO_COLOR` is set so output stays byte-stable for tests and pipes.
pub struct FormatContext {
    pub use_color: bool,
    pub width: usize,
}

impl FormatContext {
    pub fn new(use_color: bool, width: usize) -> Self {
        Self { use_color, width }
    }

    pub fn from_env() -> Self {
        let use_color = std::env::var("NO_COLOR").is_err();
        let width = terminal_size()
            .map(|(Width(w), _)| w as usize)
            .unwrap_or(DEFAULT_WIDTH);
        Self::new(use_color, width)
    }

    fn header(&self, text: &str) -> String {
        if self.use_color {
            Paint::cyan(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn muted(&self, text: &str) -> String {
        if self.use_color {
            Paint::new(text).dim().to_string()
        } else {
            text.to_string()
        }
    }

    fn ordinal(&self, text: &str) -> String {
        if self.use_color {
            Paint::yellow(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Truncate a body to a single preview line that fits the terminal.
fn preview(body: &str, width: usize) -> String {
    let first_line = body.lines().next().unwrap_or("");
    let budget = width.saturating_sub(12).max(20);
    if first_line.chars().count() <= budget {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(budget.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Shorten a server timestamp to its date for list rows. Anything that
/// does not parse is shown as-is.
fn short_timestamp(timestamp: &str) -> String {
    chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date().to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

// ============================================================================
// View State
// ============================================================================

/// The client-side view of one account's collection: the most recent
/// fetch result plus the active filter query. Discarded and re-fetched
/// after every mutation; never patched in place.
#[derive(Default)]
pub struct ViewState {
    pub query: String,
    pub notes: Vec<Note>,
}

impl ViewState {
    /// The notes the list should show: filtered when a query is active,
    /// the whole collection otherwise.
    pub fn visible(&self) -> Vec<Note> {
        filter_notes(&self.query, &self.notes)
    }
}

// ============================================================================
// Note List
// ============================================================================

/// One rendered row: a display ordinal bound to an owned note. Actions
/// (`edit 2`, `open 1`, ...) resolve through this binding, never through
/// the rendered text.
#[derive(Debug, Clone)]
pub struct NoteRow {
    pub ordinal: usize,
    pub owner: String,
    pub note: Note,
}

/// Renders ordered note collections most-recent-first and keeps the
/// ordinal-to-note map of the last render for action dispatch.
#[derive(Default)]
pub struct NoteListView {
    rows: Vec<NoteRow>,
}

impl NoteListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a row from the last render by its displayed ordinal.
    pub fn row(&self, ordinal: usize) -> Option<&NoteRow> {
        self.rows.iter().find(|r| r.ordinal == ordinal)
    }

    /// The ids currently bound to rows, in display order.
    pub fn visible_ids(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.note.id.clone()).collect()
    }

    /// Render one account's visible notes, most recent first. Replaces
    /// the previous row map entirely.
    pub fn render_list(&mut self, owner: &str, visible: &[Note], ctx: &FormatContext) -> String {
        // Qualified so this hits `Vec::clear`, not yansi's blanket `Paint::clear`.
        Vec::clear(&mut self.rows);

        if visible.is_empty() {
            return ctx.muted("No notes found.") + "\n";
        }

        let mut out = String::new();
        for (i, note) in visible.iter().rev().enumerate() {
            let ordinal = i + 1;
            self.rows.push(NoteRow {
                ordinal,
                owner: owner.to_string(),
                note: note.clone(),
            });
            out.push_str(&self.format_row(ordinal, owner, note, false, ctx));
        }
        out
    }

    /// Render global-search hits through the same row map, so foreign
    /// hits can be opened with `open <row>`.
    pub fn render_search_results(&mut self, hits: &[SearchHit], ctx: &FormatContext) -> String {
        Vec::clear(&mut self.rows);

        if hits.is_empty() {
            return ctx.muted("No results.") + "\n";
        }

        let mut out = String::new();
        for (i, hit) in hits.iter().enumerate() {
            let ordinal = i + 1;
            self.rows.push(NoteRow {
                ordinal,
                owner: hit.user.clone(),
                note: hit.note(),
            });
            out.push_str(&self.format_row(ordinal, &hit.user, &hit.note(), true, ctx));
        }
        out
    }

    fn format_row(
        &self,
        ordinal: usize,
        owner: &str,
        note: &Note,
        show_owner: bool,
        ctx: &FormatContext,
    ) -> String {
        let title = if note.title.is_empty() {
            ctx.muted("(untitled)")
        } else {
            ctx.header(&note.title)
        };
        let date = ctx.muted(&short_timestamp(&note.timestamp));
        let ord = ctx.ordinal(&format!("[{}]", ordinal));

        let head = if show_owner {
            format!("{} {} {} {}\n", ord, title, ctx.muted(&format!("({})", owner)), date)
        } else {
            format!("{} {} {}\n", ord, title, date)
        };

        format!("{}    {}\n", head, preview(&note.body, ctx.width))
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// Render the dashboard: count, recent summary, the five most recent
/// notes, and a best-effort recommendations block. All derived from the
/// fetch result on every call, never stored.
pub fn render_dashboard(
    notes: &[Note],
    recommendations: Option<&[String]>,
    ctx: &FormatContext,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} {}\n", ctx.header("Total notes:"), notes.len()));

    let recent = notes.last().map(|n| n.body.as_str()).unwrap_or("—");
    out.push_str(&format!(
        "{} {}\n\n",
        ctx.header("Most recent:"),
        preview(recent, ctx.width)
    ));

    for note in notes.iter().rev().take(DASHBOARD_NOTE_CAP) {
        let title = if note.title.is_empty() {
            "(untitled)".to_string()
        } else {
            note.title.clone()
        };
        out.push_str(&format!(
            "  {} {}\n    {}\n",
            ctx.header(&title),
            ctx.muted(&short_timestamp(&note.timestamp)),
            preview(&note.body, ctx.width)
        ));
    }

    out.push_str(&format!("\n{}\n", ctx.header("Recommended for you")));
    match recommendations {
        Some(recs) if !recs.is_empty() => {
            for r in recs {
                out.push_str(&format!("  • {}\n", r));
            }
        }
        Some(_) => out.push_str(&format!("  {}\n", ctx.muted("No recommendations yet"))),
        None => out.push_str(&format!("  {}\n", ctx.muted("Error loading recommendations"))),
    }

    out
}

// ============================================================================
// Popup Panels
// ============================================================================

/// Render a full note for the read-only (foreign view) panel.
pub fn render_note_panel(owner: &str, note: &Note, ctx: &FormatContext) -> String {
    let title = if note.title.is_empty() {
        "(untitled)".to_string()
    } else {
        note.title.clone()
    };

    format!(
        "{}\n{}\n\n{}\n",
        ctx.header(&title),
        ctx.muted(&format!("by {} at {}", owner, note.timestamp)),
        note.body
    )
}

/// Render the edit panel with the current draft values.
pub fn render_edit_panel(title: &str, body: &str, ctx: &FormatContext) -> String {
    format!(
        "{}\n  {} {}\n  {} {}\n{}\n",
        ctx.header("Editing note"),
        ctx.muted("title:"),
        title,
        ctx.muted("body:"),
        preview(body, ctx.width),
        ctx.muted("(`title <text>` / `body <text>` to change, `save` to save, `close` to cancel)")
    )
}
