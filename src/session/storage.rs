//! Durable client-side key/value storage for the session
//!
//! Values live in `~/.local/share/studywat/session.json` with 0600
//! permissions (owner read/write only). Writes go to a temp file first and
//! are renamed into place, so a crash never leaves a half-written session.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

/// A batch of writes: `Some(value)` sets a key, `None` removes it
pub type Changes<'a> = &'a [(&'a str, Option<String>)];

/// Synchronous key/value store. Every `apply` is visible to the next `get`
/// and persisted before it returns.
pub trait DurableStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Apply all changes as one write
    fn apply(&self, changes: Changes<'_>) -> Result<()>;

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.apply(&[(key, Some(value))])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.apply(&[(key, None)])
    }
}

/// On-disk format with version for future migrations
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    version: u32,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

pub struct FileStorage {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Current storage schema version
    const VERSION: u32 = 1;

    /// Open the default session file
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open (or lazily create) a session file at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path).context("Failed to read session file")?;
            let stored: StoredSession = match serde_json::from_str(&content) {
                Ok(stored) => stored,
                Err(e) => {
                    // Corrupt file: treat as signed out rather than refusing to start
                    tracing::warn!("Ignoring unreadable session file {:?}: {}", path, e);
                    StoredSession::default()
                }
            };
            if stored.version > Self::VERSION {
                anyhow::bail!(
                    "Session file version {} is newer than supported version {}",
                    stored.version,
                    Self::VERSION
                );
            }
            stored.values
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Get the default session file path
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .context("Failed to determine data directory")?;

        Ok(data_dir.join("studywat").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if values.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to delete session file")?;
                tracing::debug!("Deleted session file {:?}", self.path);
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let stored = StoredSession {
            version: Self::VERSION,
            values: values.clone(),
        };
        let content = serde_json::to_string_pretty(&stored)?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content).context("Failed to write temp session file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&temp_path, perms)
                .context("Failed to set session file permissions")?;
        }

        std::fs::rename(&temp_path, &self.path).context("Failed to save session file")?;
        tracing::debug!("Saved session to {:?}", self.path);
        Ok(())
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn apply(&self, changes: Changes<'_>) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = values.clone();
        for (key, value) in changes {
            match value {
                Some(v) => next.insert((*key).to_string(), v.clone()),
                None => next.remove(*key),
            };
        }
        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn apply(&self, changes: Changes<'_>) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in changes {
            match value {
                Some(v) => values.insert((*key).to_string(), v.clone()),
                None => values.remove(*key),
            };
        }
        Ok(())
    }
}
