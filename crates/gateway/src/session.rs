//! Operator session storage.
//!
//! The session is a token plus the operator profile, persisted under two
//! fixed keys. It is written on login, and cleared on logout or when the
//! gateway answers 401. Stores are injected into the client rather than
//! held globally.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use reviewdesk_core::types::AuthUser;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "reviewerToken";

/// Key holding the JSON-encoded operator profile.
pub const USER_KEY: &str = "reviewerUser";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persisted operator credentials.
pub trait SessionStore: Send + Sync {
    fn set(&self, token: &str, user: &AuthUser) -> Result<(), SessionError>;

    fn token(&self) -> Option<String>;

    /// Stored profile, or `None` when absent or unreadable.
    fn user(&self) -> Option<AuthUser>;

    fn clear(&self) -> Result<(), SessionError>;

    fn get(&self) -> Option<Session> {
        Some(Session {
            token: self.token()?,
            user: self.user()?,
        })
    }

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

type Entries = BTreeMap<String, String>;

fn decode_user(entries: &Entries) -> Option<AuthUser> {
    let raw = entries.get(USER_KEY)?;
    match serde_json::from_str(raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(error = %e, "Stored operator profile is unreadable");
            None
        }
    }
}

fn encode(entries: &mut Entries, token: &str, user: &AuthUser) -> Result<(), SessionError> {
    entries.insert(TOKEN_KEY.to_string(), token.to_string());
    entries.insert(USER_KEY.to_string(), serde_json::to_string(user)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local session store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<Entries>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a raw key, bypassing encoding.
    #[cfg(test)]
    fn insert_raw(&self, key: &str, value: &str) {
        self.write().insert(key.to_string(), value.to_string());
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn set(&self, token: &str, user: &AuthUser) -> Result<(), SessionError> {
        encode(&mut self.write(), token, user)
    }

    fn token(&self) -> Option<String> {
        self.read().get(TOKEN_KEY).cloned()
    }

    fn user(&self) -> Option<AuthUser> {
        decode_user(&self.read())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut entries = self.write();
        entries.remove(TOKEN_KEY);
        entries.remove(USER_KEY);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Session store persisted as a flat JSON object of string keys.
///
/// The file is re-read on every access so several processes (e.g. two
/// CLI invocations) observe each other's login and logout.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or corrupt file reads as an empty store.
    fn load(&self) -> Entries {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Entries::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                return Entries::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Session file is corrupt, ignoring");
            Entries::new()
        })
    }

    fn save(&self, entries: &Entries) -> Result<(), SessionError> {
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }
        // Owner-only (0600 on unix) temp file, renamed over the target.
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(&serde_json::to_vec_pretty(entries)?)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn set(&self, token: &str, user: &AuthUser) -> Result<(), SessionError> {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load();
        encode(&mut entries, token, user)?;
        self.save(&entries)
    }

    fn token(&self) -> Option<String> {
        let _guard = self.lock.read().unwrap_or_else(|e| e.into_inner());
        self.load().remove(TOKEN_KEY)
    }

    fn user(&self) -> Option<AuthUser> {
        let _guard = self.lock.read().unwrap_or_else(|e| e.into_inner());
        decode_user(&self.load())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load();
        entries.remove(TOKEN_KEY);
        entries.remove(USER_KEY);
        self.save(&entries)
    }
}
