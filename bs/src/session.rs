//! Signed-in session and its on-disk persistence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::BackstoreError;

/// Authenticated user as returned by the auth endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form metadata; `role` lives here
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl User {
    /// Role stored in the user's metadata, if any
    pub fn role(&self) -> Option<&str> {
        self.user_metadata.get("role").and_then(|r| r.as_str())
    }
}

/// An access token plus the user it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds as reported by the server
    #[serde(default)]
    pub expires_in: i64,
    /// Absolute expiry (unix seconds); stamped locally when the server omits it
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Fill in `expires_at` from `expires_in` relative to `now`
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() && self.expires_in > 0 {
            self.expires_at = Some(now.timestamp() + self.expires_in);
        }
        self
    }

    /// Whether the session is no longer usable at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(at) => now.timestamp() >= at,
            None => false,
        }
    }

    /// Value for an `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// JSON file holding the current session between runs
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session; missing, unreadable or expired files yield `None`
    pub fn load(&self) -> Option<Session> {
        debug!(path = ?self.path, "SessionFile::load: called");
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => {
                debug!("SessionFile::load: no session file");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&content) {
            Ok(session) if session.is_expired_at(Utc::now()) => {
                debug!(user_id = %session.user.id, "SessionFile::load: session expired");
                None
            }
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "SessionFile::load: failed to parse session file");
                None
            }
        }
    }

    /// Persist a session, creating parent directories as needed
    pub fn save(&self, session: &Session) -> Result<(), BackstoreError> {
        debug!(path = ?self.path, user_id = %session.user.id, "SessionFile::save: called");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Remove the stored session; a missing file is not an error
    pub fn clear(&self) -> Result<(), BackstoreError> {
        debug!(path = ?self.path, "SessionFile::clear: called");
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_session(role: Option<&str>) -> Session {
    let metadata = match role {
        Some(r) => serde_json::json!({ "role": r }),
        None => serde_json::json!({}),
    };
    Session {
        access_token: "token-abc".to_string(),
        refresh_token: Some("refresh-abc".to_string()),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        expires_at: None,
        user: User {
            id: "user-1".to_string(),
            email: Some("agent@example.com".to_string()),
            user_metadata: metadata,
        },
    }
}
