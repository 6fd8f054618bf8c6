#![forbid(unsafe_code)]

//! String-keyed persistence substrate.
//!
//! Model state is saved as JSON documents under fixed keys in a
//! [`KeyValueStore`]. Two backends are provided:
//!
//! - [`MemoryStore`]: a map held in memory, for tests and ephemeral runs
//! - [`JsonFileStore`]: the whole store as one JSON object on disk,
//!   written on [`flush`](JsonFileStore::flush)
//!
//! # Failure Modes
//!
//! - **Corrupt document**: a value that does not parse as the requested
//!   type surfaces as [`PersistError::Json`] naming the key; the store
//!   itself is left untouched.
//! - **Crash before flush**: `JsonFileStore` writes to a sibling temp file
//!   and renames it, so the file on disk is either the old or the new
//!   document.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Errors raised while saving or loading model state.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Reading or writing the backing file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A stored value could not be encoded or decoded.
    #[error("invalid JSON under key {key:?}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// The backing file is not a JSON object of strings.
    #[error("malformed store document {path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A synchronous string-to-string store.
pub trait KeyValueStore {
    /// Value under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String);

    /// Remove `key`. Returns the previous value.
    fn remove(&mut self, key: &str) -> Option<String>;

    /// Whether `key` holds a value.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Serialize `value` as JSON under `key`.
pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistError> {
    let json = serde_json::to_string(value).map_err(|source| PersistError::Json {
        key: key.to_owned(),
        source,
    })?;
    store.set(key, json);
    Ok(())
}

/// Deserialize the JSON under `key`. `Ok(None)` if the key is absent.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, PersistError> {
    let Some(json) = store.get(key) else {
        return Ok(None);
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|source| PersistError::Json {
            key: key.to_owned(),
            source,
        })
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

// ============================================================================
// JsonFileStore
// ============================================================================

/// A store persisted as one JSON object in a file.
///
/// Changes are held in memory until [`flush`](Self::flush).
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|source| PersistError::Document {
                    path: path.clone(),
                    source,
                })?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PersistError::Io { path, source }),
        };
        debug!(path = %path.display(), "opened store");
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are changes not yet flushed.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the store to disk if it changed.
    pub fn flush(&mut self) -> Result<(), PersistError> {
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            PersistError::Document {
                path: self.path.clone(),
                source,
            }
        })?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|source| PersistError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| PersistError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.dirty = false;
        debug!(path = %self.path.display(), keys = self.entries.len(), "flushed store");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        if self.entries.get(key) != Some(&value) {
            self.entries.insert(key.to_owned(), value);
            self.dirty = true;
        }
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        let old = self.entries.remove(key);
        if old.is_some() {
            self.dirty = true;
        }
        old
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        a: u32,
        b: Vec<String>,
    }

    #[test]
    fn memory_store_basic() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("k", "v".into());
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert!(store.contains("k"));
        assert_eq!(store.remove("k").as_deref(), Some("v"));
        assert!(!store.contains("k"));
    }

    #[test]
    fn json_helpers() {
        let mut store = MemoryStore::new();
        let sample = Sample {
            a: 3,
            b: vec!["x".into()],
        };
        save_json(&mut store, "sample", &sample).unwrap();
        let back: Option<Sample> = load_json(&store, "sample").unwrap();
        assert_eq!(back, Some(sample));
        let missing: Option<Sample> = load_json(&store, "nope").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn corrupt_value_names_key() {
        let mut store = MemoryStore::new();
        store.set("sample", "{not json".into());
        let err = load_json::<Sample>(&store, "sample").unwrap_err();
        assert!(matches!(err, PersistError::Json { ref key, .. } if key == "sample"));
        assert!(err.to_string().contains("\"sample\""));
    }

    #[test]
    fn file_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(!store.is_dirty());
        store.set("stock", "{}".into());
        assert!(store.is_dirty());
        store.flush().unwrap();
        assert!(!store.is_dirty());

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("stock").as_deref(), Some("{}"));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn file_store_setting_same_value_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path().join("s.json")).unwrap();
        store.set("k", "1".into());
        store.flush().unwrap();
        store.set("k", "1".into());
        assert!(!store.is_dirty());
        store.remove("missing");
        assert!(!store.is_dirty());
    }

    #[test]
    fn file_store_rejects_malformed_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[1,2,3]").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, PersistError::Document { .. }));
    }
}
