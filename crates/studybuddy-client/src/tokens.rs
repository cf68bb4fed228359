//! Persisted session token.
//!
//! One JSON file in the platform data directory, so the session manager
//! can restore a session on cold start without re-prompting credentials.
//! The token is opaque to this layer.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, Result};

const TOKEN_FILE: &str = "session_token.json";

/// On-disk shape of the persisted token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedToken {
    pub refresh_token: String,
    pub saved_at: DateTime<Utc>,
}

/// Key-value persistence for the session token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Open the store at the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/studybuddy/session_token.json`
    /// - macOS:   `~/Library/Application Support/com.studybuddy.studybuddy/...`
    /// - Windows: `{FOLDERID_RoamingAppData}\studybuddy\studybuddy\data\...`
    pub fn open_default() -> Result<Self> {
        let project_dirs = ProjectDirs::from("com", "studybuddy", "studybuddy").ok_or_else(
            || {
                ClientError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine application data directory",
                ))
            },
        )?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(Self {
            path: data_dir.join(TOKEN_FILE),
        })
    }

    /// Open the store at an explicit path. Used by tests.
    pub fn at_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the persisted token, if any. A missing file means no session
    /// was persisted; a corrupt file is treated the same way after a log
    /// line, since the worst case is one extra sign-in prompt.
    pub fn load(&self) -> Result<Option<PersistedToken>> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClientError::Io(e)),
        };

        match serde_json::from_str(&json) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Discarding corrupt token file");
                Ok(None)
            }
        }
    }

    /// Persist a refresh token, replacing any previous one.
    pub fn save(&self, refresh_token: &str) -> Result<()> {
        let token = PersistedToken {
            refresh_token: refresh_token.to_string(),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_string(&token).map_err(|e| {
            ClientError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Remove the persisted token. Missing file is fine.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Io(e)),
        }
    }
}
