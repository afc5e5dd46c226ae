//! Persisted session state.
//!
//! The terminal equivalent of the product's session-scoped storage: a handful
//! of plain string values (session id, company, language mode, duration,
//! serialized CV summary) written as a small JSON document in the user state
//! directory. No versioning; a fresh onboard replaces the file.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Session-scoped values persisted between commands. All plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoredSession {
    pub session_id: Option<String>,
    pub company: Option<String>,
    pub language_mode: Option<String>,
    pub session_duration_minutes: Option<String>,
    pub cv_data: Option<String>,
}

impl StoredSession {
    /// True once an onboard has stored enough to run an interview.
    pub fn is_onboarded(&self) -> bool {
        self.session_id.is_some() && self.company.is_some()
    }
}

/// File-backed store for [`StoredSession`].
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default store location: `~/.local/state/mensetsu/session.json` on
    /// Linux, falling back to the local data dir.
    pub fn default_path() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mensetsu")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session, or an empty one if the file doesn't exist.
    pub fn load(&self) -> Result<StoredSession> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the session, creating parent directories as needed.
    pub fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Remove the stored session. Removing a store that doesn't exist is fine.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
