//! # String key-value areas
//!
//! [`StorageArea`] is the synchronous namespace the simple backend writes its
//! serialized note set through. It has the shape of the browser's
//! `localStorage`: string keys, string values, whole-value reads and writes,
//! no suspension.
//!
//! Implementations:
//!
//! | Type | Backing | Used for |
//! |------|---------|----------|
//! | [`MemoryArea`] | `HashMap` behind a mutex | tests, ephemeral fallback |
//! | [`FileArea`] | one file per key under a base dir | desktop persistence |
//! | `LocalStorageArea` | `window.localStorage` | web builds (feature `web`) |

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// A synchronous string namespace.
///
/// Reads return `None` both for missing keys and for unreadable backends;
/// writes fail silently. The simple backend treats either as "start from an
/// empty note set" rather than an error.
pub trait StorageArea {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory area for testing and ephemeral fallback.
#[derive(Clone, Debug, Default)]
pub struct MemoryArea {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageArea for MemoryArea {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// File-backed area: each key is a file under `base`.
///
/// Retains values across restarts on native targets. The caller picks the
/// base directory, normally next to the database file.
#[derive(Clone, Debug)]
pub struct FileArea {
    base: PathBuf,
}

impl FileArea {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base.join(key)
    }
}

impl StorageArea for FileArea {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.key_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if std::fs::create_dir_all(&self.base).is_err() {
            return;
        }
        let _ = std::fs::write(self.key_path(key), value);
    }

    fn remove(&self, key: &str) {
        let _ = std::fs::remove_file(self.key_path(key));
    }
}

/// `window.localStorage` on web builds.
#[cfg(all(target_arch = "wasm32", feature = "web"))]
#[derive(Clone, Debug, Default)]
pub struct LocalStorageArea;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl LocalStorageArea {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl StorageArea for LocalStorageArea {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(key, value);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_area_roundtrip() {
        let area = MemoryArea::new();
        assert_eq!(area.get("k"), None);

        area.set("k", "v");
        assert_eq!(area.get("k"), Some("v".to_string()));

        area.remove("k");
        assert_eq!(area.get("k"), None);
    }

    #[test]
    fn test_memory_area_clones_share_entries() {
        let area = MemoryArea::new();
        let alias = area.clone();

        area.set("k", "v");
        assert_eq!(alias.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_file_area_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let area = FileArea::new(dir.path());

        assert_eq!(area.get("slot"), None);
        area.set("slot", "{\"a\":\"1\"}");
        assert_eq!(area.get("slot"), Some("{\"a\":\"1\"}".to_string()));

        area.remove("slot");
        assert_eq!(area.get("slot"), None);
    }

    #[test]
    fn test_file_area_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        FileArea::new(dir.path()).set("slot", "kept");

        let reopened = FileArea::new(dir.path());
        assert_eq!(reopened.get("slot"), Some("kept".to_string()));
    }
}
