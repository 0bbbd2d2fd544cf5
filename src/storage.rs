//! Tiny persistent key-value store: a flat JSON object in one file.
//!
//! Every `set` rewrites the whole file. It holds UI preferences only.

use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("{path} is not a JSON object: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|source| StorageError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(source) => return Err(StorageError::Read { path, source }),
        };
        debug!(path = %path.display(), keys = entries.len(), "opened store");
        Ok(Self { path, entries })
    }

    /// An empty store that will write to `path` on the first `set`.
    pub fn empty(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            entries: Map::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// String value under `key`; non-string values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .insert(key.to_string(), Value::String(value.to_string()));
        self.flush()
    }

    fn flush(&self) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| write_err(io::Error::other(e)))?;
        std::fs::write(&self.path, json).map_err(write_err)?;
        debug!(path = %self.path.display(), "store written");
        Ok(())
    }
}
