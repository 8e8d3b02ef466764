//! Client-local preference storage

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;
use tracing::debug;

/// Failure of the preference storage layer
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("preference storage is unavailable")]
    Unavailable,
    #[error("failed to access preference file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preference file {path} is not a JSON object: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key-value store for small user preferences
pub trait PreferenceStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Preferences kept as a flat JSON object in a file
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Unavailable)?;

        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());

        let body = serde_json::to_string_pretty(&entries).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, body).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!("Saved preference {}={} to {}", key, value, self.path.display());
        Ok(())
    }
}

/// In-process preference store, optionally simulating disabled storage
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    entries: Mutex<HashMap<String, String>>,
    unavailable: bool,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every access fails
    pub fn unavailable() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            unavailable: true,
        }
    }

    /// Create a store pre-populated with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        let entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        let mut entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FilePreferenceStore::new(dir.path().join("prefs.json"));
        assert_eq!(store.load("theme").expect("load"), None);
    }

    #[test]
    fn file_store_keeps_other_keys_on_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        let store = FilePreferenceStore::new(&path);

        store.save("lang", "en").expect("save lang");
        store.save("theme", "light").expect("save theme");
        store.save("theme", "dark").expect("save theme again");

        let reopened = FilePreferenceStore::new(&path);
        assert_eq!(reopened.load("theme").expect("load").as_deref(), Some("dark"));
        assert_eq!(reopened.load("lang").expect("load").as_deref(), Some("en"));
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").expect("write");

        let err = FilePreferenceStore::new(&path).load("theme").expect_err("should fail");
        assert!(matches!(err, StorageError::Parse { .. }));
    }

    #[test]
    fn unavailable_memory_store_rejects_everything() {
        let store = MemoryPreferenceStore::unavailable();
        assert!(matches!(store.load("theme"), Err(StorageError::Unavailable)));
        assert!(matches!(store.save("theme", "dark"), Err(StorageError::Unavailable)));
    }
}
