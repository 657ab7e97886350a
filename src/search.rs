//! In-collection search: a pure, case-insensitive substring filter.
//!
//! This runs against the last-fetched collection only; cross-account search
//! goes through the service's `/api/search` endpoint instead (see `api`).

use crate::models::Note;

/// Return the notes whose title or body contains `query` as a
/// case-insensitive substring. A query that trims to empty means "no
/// filter" and returns the collection unchanged. Input order is preserved;
/// there is no ranking.
pub fn filter_notes(query: &str, notes: &[Note]) -> Vec<Note> {
    if query.trim().is_empty() {
        return notes.to_vec();
    }

    let query_lower = query.to_lowercase();

    notes
        .iter()
        .filter(|n| {
            n.title.to_lowercase().contains(&query_lower)
                || n.body.to_lowercase().contains(&query_lower)
        })
        .cloned()
        .collect()
}
