//! Local key/value storage
//!
//! The tracker persists everything as string values under a handful of
//! fixed keys, the way a browser's local storage would. Two backends are
//! provided: a JSON object file and an in-memory map with an optional
//! byte quota.

pub mod preferences;
pub mod reports;

pub use preferences::Preferences;
pub use reports::LocalReportStore;

use crate::error::{Result, TripError};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Key holding the JSON array of report records
pub const REPORTS_KEY: &str = "missionReports";
/// Key holding the remembered team selection
pub const SELECTED_TEAM_KEY: &str = "selectedTeamId";
/// Key holding the locked team
pub const LOCKED_TEAM_KEY: &str = "lockedTeamId";
/// Key holding the GitHub access token
pub const TOKEN_KEY: &str = "github_token";

/// String key/value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store, optionally bounded by a byte quota over all values
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would push the total value size past `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota_bytes: Some(bytes),
        }
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();

        if let Some(limit) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > limit {
                return Err(TripError::QuotaExceeded { needed, limit });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file
///
/// The file is re-read on every access so several processes sharing it see
/// each other's writes; concurrent writers race and the last one wins.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole map; a missing, unreadable or corrupt file reads as empty
    fn read_all(&self) -> BTreeMap<String, String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Storage file is unreadable, treating as empty");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Storage file is corrupt, treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    TripError::Storage(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let content = serde_json::to_string(entries)?;
        std::fs::write(&self.path, content).map_err(|e| {
            TripError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all().remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.read_all();
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.read_all();
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Shared handle to a key/value backend
pub type SharedStore = Arc<dyn KeyValueStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryKeyValueStore::new();

        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_memory_quota_counts_replacement_not_old_value() {
        let store = MemoryKeyValueStore::with_quota(10);

        store.set("a", "12345").unwrap();
        store.set("a", "1234567890").unwrap();
        let err = store.set("b", "x").unwrap_err();

        assert!(matches!(err, TripError::QuotaExceeded { needed: 11, limit: 10 }));
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        FileKeyValueStore::new(&path).set("k", "v").unwrap();
        let reopened = FileKeyValueStore::new(&path);

        assert_eq!(reopened.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_file_store_unreadable_path_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        assert_eq!(store.get("missionReports").unwrap(), None);
        assert!(matches!(store.set("a", "1"), Err(TripError::Storage(_))));
    }

    #[test]
    fn test_file_store_corrupt_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileKeyValueStore::new(&path);
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
    }
}
