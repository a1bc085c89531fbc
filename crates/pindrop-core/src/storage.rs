//! Durable slot holding the serialized pin collection.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize pins: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A single named slot of text. Reads return `None` when nothing was ever written.
pub trait PinStorage: Send {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&self, payload: &str) -> Result<(), StorageError>;
}

/// Slot backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location of the slot.
    ///
    /// - Linux: ~/.local/share/pindrop/pins.json
    /// - macOS: ~/Library/Application Support/pindrop/pins.json
    /// - Windows: %APPDATA%\pindrop\pins.json
    pub fn default_path() -> Result<PathBuf, StorageError> {
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Unavailable("could not determine data directory".into()))?;

        Ok(data_dir.join("pindrop").join("pins.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl PinStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        // Write beside the slot, then rename over it
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, payload).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

/// In-process slot. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing slot contents.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(contents.into())),
            fail_writes: false,
        }
    }

    /// A slot that rejects every write.
    pub fn read_only() -> Self {
        Self {
            slot: Mutex::new(None),
            fail_writes: true,
        }
    }

    /// Current slot contents.
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl PinStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .map_err(|_| StorageError::Unavailable("memory slot poisoned".into()))
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("slot is read-only".into()));
        }

        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::Unavailable("memory slot poisoned".into()))?;
        *slot = Some(payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("pins.json"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_save_creates_parent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pins.json");
        let storage = JsonFileStorage::new(&path);

        storage.save("[1]").unwrap();
        storage.save("[]").unwrap();

        assert_eq!(storage.load().unwrap().as_deref(), Some("[]"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::with_contents("old");
        assert_eq!(storage.load().unwrap().as_deref(), Some("old"));
        storage.save("new").unwrap();
        assert_eq!(storage.contents().as_deref(), Some("new"));

        let storage = MemoryStorage::read_only();
        assert!(storage.save("x").is_err());
        assert!(storage.contents().is_none());
    }
}
