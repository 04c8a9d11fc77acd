//! Durable storage for the session token.
//!
//! One slot holding the raw token string. An empty slot means logged out.
//! Writes replace the whole value.

use hrdesk_core::error::{HrdeskError, HrdeskResult};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub trait TokenStorage: Send + Sync {
    fn load(&self) -> HrdeskResult<Option<String>>;
    fn save(&self, token: &str) -> HrdeskResult<()>;
    /// Removing an absent token is not an error.
    fn clear(&self) -> HrdeskResult<()>;
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// Token kept in a single file, written via a temp file and rename.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_err(&self, action: &str, e: std::io::Error) -> HrdeskError {
        HrdeskError::Storage(format!("{action} {}: {e}", self.path.display()))
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> HrdeskResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.storage_err("reading", e)),
        }
    }

    fn save(&self, token: &str) -> HrdeskResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.storage_err("creating directory for", e))?;
        }

        let tmp = self.path.with_extension("tmp");
        match fs::remove_file(&tmp) {
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(self.storage_err("removing stale", e)),
            _ => {}
        }
        let mut file = private_options()
            .open(&tmp)
            .map_err(|e| self.storage_err("creating", e))?;
        file.write_all(token.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| self.storage_err("writing", e))?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(|e| self.storage_err("replacing", e))?;

        tracing::debug!(path = %self.path.display(), "session token stored");
        Ok(())
    }

    fn clear(&self) -> HrdeskResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session token removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_err("removing", e)),
        }
    }
}

/// Fresh file, owner read/write only from the moment it exists.
fn private_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Process-local storage, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }

    /// What is stored right now.
    pub fn current(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> HrdeskResult<Option<String>> {
        Ok(self.current())
    }

    fn save(&self, token: &str) -> HrdeskResult<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> HrdeskResult<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
