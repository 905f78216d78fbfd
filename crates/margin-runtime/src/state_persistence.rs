//! Key/value storage port for dashboard state.
//!
//! The dashboard keeps its documents (layout, hidden set, widget registry,
//! content) under string keys, each holding one JSON text. A
//! [`StorageBackend`] decides where those strings live.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      DashboardStore                           │
//! │   - In-memory layout is authoritative                         │
//! │   - Writes every document after each mutation                 │
//! └──────────────────────────────────────────────────────────────┘
//!                              │ PagePersistence (typed JSON)
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     StorageBackend                            │
//! │   - MemoryStorage: in-memory (tests, embedding)               │
//! │   - FileStorage: one JSON state file, atomic rename           │
//! │   - NullStorage: no durable storage in this context           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: backends never panic; every operation
//!    returns [`StorageResult`].
//! 2. **Atomic writes**: `FileStorage` writes a temp file and renames it
//!    over the state file.
//! 3. **Missing is not an error**: an absent key or state file reads as
//!    `Ok(None)`.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returned; caller logs and continues |
//! | `StorageError::Serialization` | Invalid JSON in state file or value | Returned; caller treats value as absent |
//! | `StorageError::Corruption` | Poisoned lock | Returned |
//! | `StorageError::Unavailable` | `NullStorage`, unwritable location | Returned on write |

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    Serialization(String),
    /// Stored data or internal state is unusable.
    Corruption(String),
    /// No durable storage is available.
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(_)
            | StorageError::Corruption(_)
            | StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Pluggable string key/value store.
///
/// Implementations must be `Send + Sync` so one backend can be shared by
/// several pages through an `Arc`.
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`. Deleting a missing key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Check if the backend is available and functional.
    fn is_available(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory backend. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create memory storage pre-populated with values.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        let mut keys: Vec<String> = guard.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("entries", &self.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Null Storage
// ─────────────────────────────────────────────────────────────────────────────

/// Backend for contexts without durable storage.
///
/// Reads find nothing; writes fail with [`StorageError::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStorage;

impl StorageBackend for NullStorage {
    fn name(&self) -> &str {
        "NullStorage"
    }

    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable(format!("cannot store {key}")))
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn is_available(&self) -> bool {
        false
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage
// ─────────────────────────────────────────────────────────────────────────────

/// Environment variable overriding the state directory.
pub const STATE_DIR_ENV: &str = "MARGIN_STATE_DIR";

const STATE_FILE_NAME: &str = "dashboard-state.json";

/// On-disk format.
#[derive(Serialize, Deserialize)]
struct StateFile {
    /// Format version for future migrations.
    format_version: u32,
    /// Key -> stored JSON text.
    entries: BTreeMap<String, String>,
}

impl StateFile {
    const FORMAT_VERSION: u32 = 1;

    fn new(entries: BTreeMap<String, String>) -> Self {
        Self {
            format_version: Self::FORMAT_VERSION,
            entries,
        }
    }
}

/// File-backed storage: every key lives in one JSON state file.
///
/// # File Format
///
/// ```json
/// {
///   "format_version": 1,
///   "entries": {
///     "margin-grid-layout": "{\"greeting\":{\"col\":0,\"row\":0,\"colSpan\":5,\"rowSpan\":2,\"zIndex\":0}}"
///   }
/// }
/// ```
///
/// # Atomic Writes
///
/// Each `set`/`remove` reads the file, applies the change, writes
/// `{path}.tmp`, syncs it and renames it over `{path}`. A process-local
/// mutex serializes these read-modify-write cycles.
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Storage at an explicit file path. The file is created on first write.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Storage at `$XDG_STATE_HOME/margin/{app_name}/dashboard-state.json`,
    /// falling back to `~/.local/state`, then the current directory.
    #[must_use]
    pub fn default_for_app(app_name: &str) -> Self {
        Self::new(
            state_dir_or_fallback()
                .join("margin")
                .join(app_name)
                .join(STATE_FILE_NAME),
        )
    }

    /// Like [`default_for_app`](Self::default_for_app), but a non-empty
    /// `MARGIN_STATE_DIR` names the directory holding the state file.
    #[must_use]
    pub fn from_env(app_name: &str) -> Self {
        match std::env::var(STATE_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => Self::new(PathBuf::from(dir).join(STATE_FILE_NAME)),
            _ => Self::default_for_app(app_name),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }

    fn read_entries(&self) -> StorageResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let state_file: StateFile = serde_json::from_reader(reader).map_err(|e| {
            StorageError::Serialization(format!("failed to parse state file: {e}"))
        })?;
        if state_file.format_version != StateFile::FORMAT_VERSION {
            tracing::warn!(
                stored = state_file.format_version,
                expected = StateFile::FORMAT_VERSION,
                path = %self.path.display(),
                "state file format version mismatch, ignoring stored state"
            );
            return Ok(BTreeMap::new());
        }
        Ok(state_file.entries)
    }

    fn write_entries(&self, entries: BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let count = entries.len();
        let tmp_path = self.temp_path();
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, &StateFile::new(entries)).map_err(|e| {
                StorageError::Serialization(format!("failed to serialize state: {e}"))
            })?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), entries = count, "saved state file");
        Ok(())
    }

    fn modify(&self, change: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> StorageResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Corruption("write lock poisoned".into()))?;
        let mut entries = self.read_entries()?;
        if change(&mut entries) {
            self.write_entries(entries)?;
        }
        Ok(())
    }
}

fn state_dir_or_fallback() -> PathBuf {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(state_home);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("state");
    }
    PathBuf::from(".")
}

impl StorageBackend for FileStorage {
    fn name(&self) -> &str {
        "FileStorage"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.modify(|entries| {
            let unchanged = entries.get(key).is_some_and(|old| old == value);
            if !unchanged {
                entries.insert(key.to_string(), value.to_string());
            }
            !unchanged
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.modify(|entries| entries.remove(key).is_some())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.read_entries()?.into_keys().collect())
    }

    fn is_available(&self) -> bool {
        let Some(parent) = self.path.parent() else {
            return false;
        };
        if !parent.exists() && fs::create_dir_all(parent).is_err() {
            return false;
        }
        let probe = parent.join(".margin_test_write");
        if fs::write(&probe, b"probe").is_ok() {
            let _ = fs::remove_file(&probe);
            return true;
        }
        false
    }
}

impl fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_storage_basic_operations() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        assert_eq!(storage.get("a").unwrap(), None);

        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        storage.set("a", "3").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("3"));
        assert_eq!(storage.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        storage.remove("a").unwrap();
        storage.remove("missing").unwrap();
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn memory_storage_with_entries() {
        let storage = MemoryStorage::with_entries([("margin-grid-layout", "{}")]);
        assert_eq!(storage.get("margin-grid-layout").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn null_storage_refuses_writes() {
        let storage = NullStorage;
        assert!(!storage.is_available());
        assert_eq!(storage.get("k").unwrap(), None);
        assert!(matches!(storage.set("k", "v"), Err(StorageError::Unavailable(_))));
        storage.remove("k").unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }

    #[test]
    fn storage_error_display() {
        let io = StorageError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io.to_string().starts_with("I/O error"));
        assert!(std::error::Error::source(&io).is_some());
        let ser = StorageError::Serialization("bad".into());
        assert_eq!(ser.to_string(), "serialization error: bad");
        assert_eq!(
            StorageError::Unavailable("x".into()).to_string(),
            "storage unavailable: x"
        );
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let storage = FileStorage::new(&path);

        storage.set("margin-grid-layout", r#"{"a":1}"#).unwrap();
        storage.set("margin-hidden-widgets", "[]").unwrap();
        assert!(path.exists());

        let reopened = FileStorage::new(&path);
        assert_eq!(
            reopened.get("margin-grid-layout").unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert_eq!(
            reopened.keys().unwrap(),
            vec!["margin-grid-layout".to_string(), "margin-hidden-widgets".to_string()]
        );
        reopened.remove("margin-grid-layout").unwrap();
        assert_eq!(storage.get("margin-grid-layout").unwrap(), None);
    }

    #[test]
    fn file_storage_load_nonexistent() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("missing.json"));
        assert_eq!(storage.get("any").unwrap(), None);
        assert!(storage.keys().unwrap().is_empty());
        storage.remove("any").unwrap();
        assert!(!dir.path().join("missing.json").exists());
    }

    #[test]
    fn file_storage_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("state.json");
        let storage = FileStorage::new(&path);
        assert!(storage.is_available());
        storage.set("k", "v").unwrap();
        assert!(path.exists());
        assert!(!storage.temp_path().exists());
    }

    #[test]
    fn file_storage_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        let storage = FileStorage::new(&path);
        assert!(matches!(storage.get("k"), Err(StorageError::Serialization(_))));
        assert!(matches!(storage.set("k", "v"), Err(StorageError::Serialization(_))));
    }

    #[test]
    fn file_storage_ignores_future_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"format_version":99,"entries":{"k":"v"}}"#).unwrap();
        let storage = FileStorage::new(&path);
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn default_for_app_path_shape() {
        let storage = FileStorage::default_for_app("demo");
        let path = storage.path();
        assert!(path.ends_with("margin/demo/dashboard-state.json"));
    }
}
