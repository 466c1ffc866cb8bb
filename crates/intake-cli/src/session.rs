//! File-backed session storage.
//!
//! The CLI equivalent of browser session storage: each key lives in its own
//! file under the data directory, and `--new-session` clears the token file
//! so the next access mints a fresh one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use intake_core::error::{IntakeError, Result};
use intake_core::session::SessionStorage;

pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Remove a stored key, ending the session it identified.
    pub fn clear(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IntakeError::SessionUnavailable(e.to_string())),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.session"))
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(IntakeError::SessionUnavailable(e.to_string())),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| IntakeError::SessionUnavailable(e.to_string()))?;
        std::fs::write(self.path_for(key), value)
            .map_err(|e| IntakeError::SessionUnavailable(e.to_string()))
    }
}

/// Paths used by the CLI inside the data directory.
pub fn draft_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("register.db")
}
