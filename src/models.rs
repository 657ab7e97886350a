//! Data models for the Cloud Notes client.
//!
//! Everything here mirrors the wire shapes the service emits. Notes are
//! server-owned; the client only ever holds the most recent fetch result.

use serde::{Deserialize, Serialize};

// ============================================================================
// Core Note Types
// ============================================================================

/// A single note as returned by `GET /api/notes`.
///
/// `id` is opaque and unique within one account's collection. `timestamp`
/// is server-assigned (`%Y-%m-%d %H:%M:%S`) and display-only: collection
/// order is the server's insertion order, never a sort on this field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
    pub timestamp: String,
}

/// One row of a global (cross-account) search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub user: String,
    pub id: String,
    pub title: String,
    pub body: String,
    pub timestamp: String,
}

impl SearchHit {
    /// The note content of this hit, detached from its owner.
    pub fn note(&self) -> Note {
        Note {
            id: self.id.clone(),
            title: self.title.clone(),
            body: self.body.clone(),
            timestamp: self.timestamp.clone(),
        }
    }
}

// ============================================================================
// Collaborator Payloads
// ============================================================================

/// Analytics payload. The service owns the schema; we pick out `keywords`
/// and keep the rest for raw display.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsReport {
    pub keywords: Vec<String>,
    pub raw: serde_json::Value,
}

/// Response of `GET /api/exportPdf`. Only `status == "exported"` counts as
/// success; any other status string is the failure reason.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportStatus {
    pub status: String,
}

impl ExportStatus {
    pub fn is_exported(&self) -> bool {
        self.status == "exported"
    }
}
