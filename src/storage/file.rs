//! File-backed token storage.
//!
//! The file is a flat JSON object of string keys to string values, so the
//! token key can share the file with other client-side settings.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::{TokenStorage, DEFAULT_TOKEN_KEY};
use crate::error::SessionError;
use crate::Result;

/// Durable storage in a JSON key/value file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    key: String,
}

impl FileStorage {
    /// Storage at `path` using the default token key.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_key(path, DEFAULT_TOKEN_KEY)
    }

    /// Storage at `path` using a custom key.
    pub fn with_key(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(unavailable(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| unavailable(&self.path, e))
    }

    /// Write to a sibling temp file, then rename it over the original, so a
    /// crash mid-write leaves the previous contents intact.
    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| unavailable(dir, e))?;

        let content = serde_json::to_string_pretty(entries)?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| unavailable(dir, e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| unavailable(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| unavailable(&self.path, e))?;
        Ok(())
    }
}

fn unavailable(path: &Path, err: impl std::fmt::Display) -> SessionError {
    SessionError::StorageUnavailable(format!("{}: {}", path.display(), err))
}

impl TokenStorage for FileStorage {
    fn save(&self, token: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(self.key.clone(), token.to_string());
        self.write_entries(&entries)?;
        debug!(path = %self.path.display(), "session token saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        let mut entries = self.read_entries()?;
        Ok(entries.remove(&self.key))
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(&self.key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)?;
        debug!(path = %self.path.display(), "session token cleared");
        Ok(())
    }
}
