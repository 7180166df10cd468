//! File-backed storage.
//!
//! Entries live in a single JSON document. Writes land in a sibling
//! temporary file first and are renamed over the document, so a crash
//! mid-write leaves the previous document intact. An unreadable or
//! malformed document reads as empty: the session layer treats missing
//! entries as logged-out, never as logged-in.

use crate::{SessionStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSON-document store, durable across process restarts.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open a store at the given path, loading any existing document.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let entries = Self::load(&path);
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Default document location under the user data directory.
    pub fn default_path() -> StorageResult<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| StorageError::Medium("no user data directory".to_string()))?;
        Ok(base.join("admin-console").join("session.json"))
    }

    fn load(path: &Path) -> HashMap<String, String> {
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Session document is malformed, starting empty"
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) -> StorageResult<()> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            StorageError::Medium(format!(
                "failed replacing {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl SessionStore for FileStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let mut entries = self.entries.lock().unwrap();
        let removed = entries.remove(key).is_some();
        if removed {
            self.persist(&entries)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_delete() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("session.json")).unwrap();

        store.set("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap(), Some("value".to_string()));

        assert!(store.delete("key").unwrap());
        assert!(!store.delete("key").unwrap());
        assert_eq!(store.get("key").unwrap(), None);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set("credential", "bearer-token").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("credential").unwrap(),
            Some("bearer-token".to_string())
        );
    }

    #[test]
    fn test_malformed_document_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{this is not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("credential").unwrap(), None);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("session.json")).unwrap();

        store.set("credential", "old").unwrap();
        store.set("credential", "new").unwrap();
        assert_eq!(store.get("credential").unwrap(), Some("new".to_string()));
    }
}
