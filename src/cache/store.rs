//! Key-value storage backends for the report cache
//!
//! The cache manager only needs a tiny get/set capability, so durable storage
//! is abstracted behind the `KvStore` trait. `FileStore` persists blobs to an
//! XDG-compliant cache directory; `MemoryStore` backs tests with the same
//! contract.

use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// Minimal durable key-value capability used by the report cache
pub trait KvStore {
    /// Reads the blob stored under `key`
    ///
    /// Returns `None` if the key is absent or the blob cannot be read.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Writes `bytes` under `key`, replacing any previous value
    fn set(&self, key: &str, bytes: &[u8]) -> io::Result<()>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        (**self).set(key, bytes)
    }
}

/// File-backed store keeping each key as a `<key>.json` file
///
/// Files live in an XDG-compliant cache directory (`~/.cache/tickerdesk/` on
/// Linux, or the equivalent path on other platforms).
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where blobs are stored
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "tickerdesk")?;
        let dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { dir })
    }

    /// Creates a store rooted at a custom directory
    ///
    /// Useful for testing or when a specific storage location is needed.
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Returns the path of the file backing the given key
    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.path(key)).ok()
    }

    fn set(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), bytes)
    }
}

/// In-memory store implementing the same capability, for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "store lock poisoned"))?;
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_set_creates_file_in_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_dir(temp_dir.path().to_path_buf());

        store.set("reports", b"[]").expect("Set should succeed");

        let expected_path = temp_dir.path().join("reports.json");
        assert!(expected_path.exists(), "Blob file should exist");
    }

    #[test]
    fn test_file_store_get_returns_none_for_missing_key() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_dir(temp_dir.path().to_path_buf());

        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_dir(temp_dir.path().to_path_buf());

        store.set("reports", b"{\"a\":1}").expect("Set should succeed");

        assert_eq!(store.get("reports"), Some(b"{\"a\":1}".to_vec()));
    }

    #[test]
    fn test_file_store_set_creates_nested_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("nested").join("cache").join("dir");
        let store = FileStore::with_dir(nested.clone());

        store.set("reports", b"[]").expect("Set should succeed");

        assert!(nested.exists(), "Nested directory should be created");
        assert!(nested.join("reports.json").exists());
    }

    #[test]
    fn test_file_store_set_overwrites_previous_value() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_dir(temp_dir.path().to_path_buf());

        store.set("reports", b"first").expect("First set should succeed");
        store.set("reports", b"second").expect("Second set should succeed");

        assert_eq!(store.get("reports"), Some(b"second".to_vec()));
    }

    #[test]
    fn test_file_store_new_uses_project_path() {
        if let Some(store) = FileStore::new() {
            let path_str = store.dir.to_string_lossy().to_string();
            assert!(
                path_str.contains("tickerdesk"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::default();

        store.set("reports", b"[1,2,3]").expect("Set should succeed");

        assert_eq!(store.get("reports"), Some(b"[1,2,3]".to_vec()));
        assert!(store.get("other").is_none());
    }
}
