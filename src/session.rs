//! Session gate: which account is signed in.
//!
//! The signed-in account name is persisted to a small session file so it
//! survives restarts (the terminal analog of the original web client's
//! local storage). Credential checking itself is the identity provider's
//! job; this module only records the result.

use std::fs;
use std::path::PathBuf;

pub struct Session {
    path: PathBuf,
    account: Option<String>,
}

impl Session {
    /// Load the persisted session, treating a missing or unreadable file
    /// as signed-out.
    pub fn load(path: PathBuf) -> Self {
        let account = fs::read_to_string(&path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self { path, account }
    }

    /// The signed-in account, if any.
    pub fn current(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Whether `owner` is someone other than the signed-in account.
    pub fn is_foreign(&self, owner: &str) -> bool {
        self.current() != Some(owner)
    }

    /// Record a successful sign-in. A persistence failure is reported but
    /// leaves the in-memory session signed in.
    pub fn sign_in(&mut self, account: &str) -> Result<(), String> {
        self.account = Some(account.to_string());
        fs::write(&self.path, account)
            .map_err(|e| format!("Could not persist session: {}", e))
    }

    /// Clear the session, in memory and on disk.
    pub fn sign_out(&mut self) -> Result<(), String> {
        self.account = None;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("Could not clear session: {}", e)),
        }
    }

    /// The identity badge shown in every page header.
    pub fn badge(&self) -> String {
        match self.current() {
            Some(account) => format!("Signed in as {}", account),
            None => "Not signed in".to_string(),
        }
    }

    /// Gate for pages that need an identity: the signed-in account, or an
    /// error directing the user to sign in.
    pub fn ensure_auth(&self) -> Result<&str, String> {
        self.current()
            .ok_or_else(|| "Not signed in. Use `login <user> <password>` first.".to_string())
    }
}
