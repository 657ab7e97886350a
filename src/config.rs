//! Client configuration: API root and session-file resolution.
//!
//! The API root defaults to the local development server and can be
//! overridden with `CLOUD_NOTES_API`. Overrides are validated before use;
//! a value that is not an http(s) URL with a host falls back to the default
//! rather than producing confusing connection errors later.

use std::path::PathBuf;
use url::Url;

/// Default location of the Cloud Notes service.
pub const DEFAULT_API_ROOT: &str = "http://localhost:5000";

/// Environment variable overriding the API root.
pub const API_ROOT_ENV: &str = "CLOUD_NOTES_API";

/// Environment variable overriding the session-file path.
pub const SESSION_FILE_ENV: &str = "CLOUD_NOTES_SESSION";

/// File name of the persisted session, placed in the home directory.
const SESSION_FILE_NAME: &str = ".cloud_notes_session";

/// Validate an API root override: http or https, a host, nothing else
/// fancy. Returns the root with any trailing slash trimmed (paths are
/// appended as `/api/...`).
pub fn validate_api_root(raw: &str) -> Result<String, String> {
    let url = Url::parse(raw).map_err(|e| format!("Invalid API root: {}", e))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("Unsupported API scheme: {}", other)),
    }

    if url.host_str().is_none() {
        return Err("API root has no host".to_string());
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Resolve the API root from the environment, falling back to
/// [`DEFAULT_API_ROOT`] when unset or invalid.
pub fn api_root() -> String {
    match std::env::var(API_ROOT_ENV) {
        Ok(raw) => match validate_api_root(&raw) {
            Ok(root) => root,
            Err(e) => {
                log::warn!("ignoring {}: {}", API_ROOT_ENV, e);
                DEFAULT_API_ROOT.to_string()
            }
        },
        Err(_) => DEFAULT_API_ROOT.to_string(),
    }
}

/// Resolve where the signed-in account name is persisted.
pub fn session_file() -> PathBuf {
    if let Ok(path) = std::env::var(SESSION_FILE_ENV) {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(SESSION_FILE_NAME)
}
