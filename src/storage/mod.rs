/// Client-side key/value persistence.
///
/// Holds the three pieces of state that survive between runs: the bearer
/// token, the theme preference and the preferred module. Values are plain
/// strings with no schema versioning.
///
/// [`FileStore`] keeps everything in a single JSON object at
/// `~/.xpdash/storage.json`. Reads are best-effort (a missing or corrupt
/// file behaves as empty); writes report failures to the caller.
/// [`MemoryStore`] is used by tests and by callers that should not touch
/// the user's home directory.
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "jwt_token";

/// Storage key for the theme preference (`dark` / `light`).
pub const THEME_KEY: &str = "theme";

/// Storage key for the preferred module id.
pub const PREFERRED_MODULE_KEY: &str = "preferred_module";

/// String key/value persistence shared across services.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// Store persisted as a JSON object on disk.
///
/// The file is re-read on every access so that separate `xpdash`
/// invocations (CLI login, then the web dashboard) observe each other's
/// writes. The mutex serializes access within one process.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `~/.xpdash/storage.json`.
    ///
    /// Falls back to a relative `.xpdash/storage.json` when the home
    /// directory cannot be determined.
    pub fn default_location() -> Self {
        let path = storage_path().unwrap_or_else(|| PathBuf::from(".xpdash").join("storage.json"));
        Self::at(path)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(entries).context("failed to serialize storage")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all();
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all();
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&entries)
    }
}

/// Return the path to the storage file.
pub fn storage_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".xpdash").join("storage.json"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
