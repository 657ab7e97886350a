//! Remote note store: the client's only I/O boundary.
//!
//! All access to the Cloud Notes service goes through here. The error
//! policy is deliberately flat: reads collapse any transport or decode
//! failure into an empty result (callers cannot tell the difference from
//! "no data", and must not try), mutations return `Err` with the server's
//! own response text, surfaced verbatim to the user. Every call is a
//! single shot with a 10s timeout; there is no retry and no cancellation.

use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use crate::models::{AnalyticsReport, ExportStatus, Note, SearchHit};

/// Response body the service uses as its generic success marker.
const OK_MARKER: &str = "OK";

/// Response body of a successful signup.
const SIGNUP_OK_MARKER: &str = "Signup OK";

// ============================================================================
// Store Contract
// ============================================================================

/// The note-collection operations the rest of the client is written
/// against. Production code uses [`HttpStore`]; tests substitute an
/// in-memory fake.
#[allow(async_fn_in_trait)]
pub trait NoteStore {
    /// Fetch an account's full collection in insertion order (oldest
    /// first). Empty on any failure.
    async fn fetch_all(&self, account: &str) -> Vec<Note>;

    /// Append a new note to `account`'s collection. The server assigns
    /// the id and timestamp.
    async fn create(&self, account: &str, title: &str, body: &str) -> Result<(), String>;

    /// Overwrite the title and body of `note_id` in `account`'s
    /// collection. Fails (signaled, not raised) when the note does not
    /// belong to the account.
    async fn edit(
        &self,
        account: &str,
        note_id: &str,
        title: &str,
        body: &str,
    ) -> Result<(), String>;

    /// Remove `note_id` from `account`'s collection.
    async fn delete(&self, account: &str, note_id: &str) -> Result<(), String>;

    /// Full-text search across every account. A whitespace-only query
    /// short-circuits to an empty result without a round-trip.
    async fn search_all(&self, query: &str) -> Vec<SearchHit>;
}

/// The full service surface the app drives: the note store plus the
/// collaborator endpoints (identity, export, analytics and
/// recommendations). Kept separate from [`NoteStore`] so the popup and
/// view layers only see the note-collection contract.
#[allow(async_fn_in_trait)]
pub trait CloudService: NoteStore {
    /// Verify credentials with the identity provider.
    async fn login(&self, account: &str, password: &str) -> Result<(), String>;

    /// Create an account.
    async fn signup(&self, account: &str, password: &str) -> Result<(), String>;

    /// Trigger a server-side PDF export, then fetch the rendered
    /// document.
    async fn export_pdf(&self, account: &str) -> Result<Vec<u8>, String>;

    /// Dashboard recommendations. `None` means "render the placeholder";
    /// it never blocks the page.
    async fn recommendations(&self, account: &str) -> Option<Vec<String>>;

    /// Account analytics, best-effort.
    async fn analytics(&self, account: &str) -> Option<AnalyticsReport>;
}

// ============================================================================
// HTTP Implementation
// ============================================================================

/// [`NoteStore`] over the service's HTTP API, plus the collaborator calls
/// (identity, export, analytics, recommendations) the pages need.
#[derive(Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    api_root: String,
}

impl HttpStore {
    pub fn new(api_root: String) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self { client, api_root })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// POST a JSON body, returning the plain-text response. The service
    /// answers mutations with marker strings, not status codes.
    async fn post_text(&self, path: &str, body: serde_json::Value) -> Result<String, String> {
        let url = format!("{}{}", self.api_root, path);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        response
            .text()
            .await
            .map_err(|e| format!("Request failed: {}", e))
    }

    /// GET and decode a JSON response. Any failure is logged and
    /// collapsed to `None`.
    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Option<T> {
        let url = format!("{}{}", self.api_root, path_and_query);

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("GET {} failed: {}", path_and_query, e);
                return None;
            }
        };

        match response.json().await {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("GET {} returned undecodable body: {}", path_and_query, e);
                None
            }
        }
    }

    /// Interpret a mutation response: the exact marker is success,
    /// anything else is the user-facing failure message.
    fn check_marker(result: Result<String, String>, marker: &str) -> Result<(), String> {
        match result {
            Ok(text) if text == marker => Ok(()),
            Ok(text) => Err(text),
            Err(e) => Err(e),
        }
    }
}

impl CloudService for HttpStore {
    /// The service answers `"OK"` or `"ERR"`; the latter is reported as
    /// a fixed message rather than echoed.
    async fn login(&self, account: &str, password: &str) -> Result<(), String> {
        let body = json!({ "userID": account, "password": password });
        match self.post_text("/api/login", body).await {
            Ok(text) if text == OK_MARKER => Ok(()),
            Ok(_) => Err("Invalid username or password".to_string()),
            Err(e) => Err(e),
        }
    }

    /// Failure text (`"User exists"`, ...) is surfaced verbatim.
    async fn signup(&self, account: &str, password: &str) -> Result<(), String> {
        let body = json!({ "userID": account, "password": password });
        Self::check_marker(self.post_text("/api/signup", body).await, SIGNUP_OK_MARKER)
    }

    async fn export_pdf(&self, account: &str) -> Result<Vec<u8>, String> {
        let query = format!("/api/exportPdf?user={}", urlencoding::encode(account));
        let status: ExportStatus = self
            .get_json(&query)
            .await
            .ok_or_else(|| "PDF export failed".to_string())?;

        if !status.is_exported() {
            return Err(format!("PDF export failed: {}", status.status));
        }

        let url = format!("{}/exported_notes.pdf", self.api_root);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("PDF download failed: {}", e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("PDF download failed: {}", e))?;

        Ok(bytes.to_vec())
    }

    async fn recommendations(&self, account: &str) -> Option<Vec<String>> {
        let query = format!("/api/recommend?user={}", urlencoding::encode(account));
        self.get_json(&query).await
    }

    /// The schema is owned by the service; `keywords` is picked out, the
    /// rest kept for raw display.
    async fn analytics(&self, account: &str) -> Option<AnalyticsReport> {
        let query = format!("/api/analytics?user={}", urlencoding::encode(account));
        let raw: serde_json::Value = self.get_json(&query).await?;

        let keywords = raw
            .get("keywords")
            .and_then(|k| k.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Some(AnalyticsReport { keywords, raw })
    }
}

impl NoteStore for HttpStore {
    async fn fetch_all(&self, account: &str) -> Vec<Note> {
        let query = format!("/api/notes?user={}", urlencoding::encode(account));
        self.get_json(&query).await.unwrap_or_default()
    }

    async fn create(&self, account: &str, title: &str, body: &str) -> Result<(), String> {
        let body = json!({ "userID": account, "title": title, "body": body });
        Self::check_marker(self.post_text("/api/addNote", body).await, OK_MARKER)
    }

    async fn edit(
        &self,
        account: &str,
        note_id: &str,
        title: &str,
        body: &str,
    ) -> Result<(), String> {
        let body = json!({
            "userID": account,
            "noteID": note_id,
            "title": title,
            "body": body,
        });
        Self::check_marker(self.post_text("/api/editNote", body).await, OK_MARKER)
    }

    async fn delete(&self, account: &str, note_id: &str) -> Result<(), String> {
        let body = json!({ "userID": account, "noteID": note_id });
        Self::check_marker(self.post_text("/api/deleteNote", body).await, OK_MARKER)
    }

    async fn search_all(&self, query: &str) -> Vec<SearchHit> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let path = format!("/api/search?q={}", urlencoding::encode(trimmed));
        self.get_json(&path).await.unwrap_or_default()
    }
}
