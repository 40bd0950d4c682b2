//! Key-value fallback backend.
//!
//! The whole note set lives under a single key in a [`StorageArea`]
//! namespace, serialized as one JSON object whose keys are the note texts
//! and whose values are the literal marker `"1"`. Every write decodes the
//! blob, mutates the map, and writes the whole object back; nothing is
//! additive at the wire level. An absent or malformed blob decodes to an
//! empty map, so a corrupt entry costs the list, never the UI.

use std::collections::BTreeMap;

use crate::area::StorageArea;
use crate::error::StoreError;
use crate::manager::NoteStore;

/// Value stored against every note key in the serialized object.
const MARKER: &str = "1";

/// Note storage over a synchronous key-value namespace.
///
/// Generic over the [`StorageArea`] so the same codec serves an in-memory
/// map, a directory of files, or the browser's `localStorage`.
#[derive(Clone, Debug)]
pub struct SimpleStore<A> {
    area: A,
    key: String,
}

impl<A: StorageArea> SimpleStore<A> {
    pub fn new(area: A, key: &str) -> Self {
        Self {
            area,
            key: key.to_string(),
        }
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        let Some(blob) = self.area.get(&self.key) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&blob) {
            Ok(map) => map,
            Err(error) => {
                tracing::warn!(%error, "stored note blob is not valid JSON, starting empty");
                BTreeMap::new()
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) {
        if let Ok(blob) = serde_json::to_string(map) {
            self.area.set(&self.key, &blob);
        }
    }
}

impl<A: StorageArea> NoteStore for SimpleStore<A> {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_map().into_keys().collect())
    }

    async fn save(&self, text: &str) -> Result<(), StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::Validation);
        }
        let mut map = self.read_map();
        map.insert(text.to_string(), MARKER.to_string());
        self.write_map(&map);
        Ok(())
    }

    async fn exists(&self, text: &str) -> Result<bool, StoreError> {
        Ok(self.read_map().contains_key(text.trim()))
    }

    async fn delete_one(&self, text: &str) -> Result<(), StoreError> {
        let mut map = self.read_map();
        map.remove(text.trim());
        self.write_map(&map);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.area.remove(&self.key);
        Ok(())
    }

    /// Rename decodes the map and moves the entry, so sibling notes that
    /// contain `old_text` as a substring are untouched. Renaming onto an
    /// existing note merges the two entries into one.
    async fn rename(&self, old_text: &str, new_text: &str) -> Result<(), StoreError> {
        let old_text = old_text.trim();
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return Err(StoreError::Validation);
        }
        let mut map = self.read_map();
        if map.remove(old_text).is_none() {
            return Ok(());
        }
        map.insert(new_text.to_string(), MARKER.to_string());
        self.write_map(&map);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::MemoryArea;

    fn store() -> SimpleStore<MemoryArea> {
        SimpleStore::new(MemoryArea::new(), "notelist")
    }

    #[tokio::test]
    async fn test_save_then_list_contains_the_text_once() {
        let store = store();
        store.save("buy milk").await.unwrap();

        let texts = store.list().await.unwrap();
        assert_eq!(texts, vec!["buy milk"]);
    }

    #[tokio::test]
    async fn test_exists_tracks_save_and_delete() {
        let store = store();
        store.save("buy milk").await.unwrap();
        assert!(store.exists("buy milk").await.unwrap());

        store.delete_one("buy milk").await.unwrap();
        assert!(!store.exists("buy milk").await.unwrap());
    }

    #[tokio::test]
    async fn test_inputs_are_trimmed() {
        let store = store();
        store.save("  buy milk  ").await.unwrap();

        assert!(store.exists("buy milk").await.unwrap());
        assert!(store.exists("  buy milk").await.unwrap());
        assert_eq!(store.list().await.unwrap(), vec!["buy milk"]);
    }

    #[tokio::test]
    async fn test_empty_and_whitespace_saves_are_rejected() {
        let store = store();
        assert!(matches!(
            store.save("").await,
            Err(StoreError::Validation)
        ));
        assert!(matches!(
            store.save("   ").await,
            Err(StoreError::Validation)
        ));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_one_on_absent_text_is_a_no_op() {
        let store = store();
        store.save("buy milk").await.unwrap();

        store.delete_one("buy bread").await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["buy milk"]);
    }

    #[tokio::test]
    async fn test_delete_all_removes_the_backing_key() {
        let area = MemoryArea::new();
        let store = SimpleStore::new(area.clone(), "notelist");
        store.save("buy milk").await.unwrap();
        store.save("buy bread").await.unwrap();

        store.delete_all().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(area.get("notelist").is_none());
    }

    #[tokio::test]
    async fn test_rename_moves_the_text() {
        let store = store();
        store.save("buy milk").await.unwrap();
        store.save("call mom").await.unwrap();

        store.rename("buy milk", "buy bread").await.unwrap();

        assert!(!store.exists("buy milk").await.unwrap());
        assert!(store.exists("buy bread").await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rename_on_absent_text_is_a_no_op() {
        let store = store();
        store.save("buy milk").await.unwrap();

        store.rename("buy bread", "buy rye").await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["buy milk"]);
    }

    #[tokio::test]
    async fn test_rename_to_empty_is_rejected() {
        let store = store();
        store.save("buy milk").await.unwrap();

        assert!(matches!(
            store.rename("buy milk", "   ").await,
            Err(StoreError::Validation)
        ));
        assert!(store.exists("buy milk").await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_onto_an_existing_text_merges() {
        let store = store();
        store.save("buy milk").await.unwrap();
        store.save("buy bread").await.unwrap();

        store.rename("buy milk", "buy bread").await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["buy bread"]);
    }

    #[tokio::test]
    async fn test_rename_leaves_substring_siblings_intact() {
        let store = store();
        store.save("milk").await.unwrap();
        store.save("buy milk").await.unwrap();

        store.rename("milk", "oat milk").await.unwrap();

        let texts = store.list().await.unwrap();
        assert_eq!(texts, vec!["buy milk", "oat milk"]);
    }

    #[tokio::test]
    async fn test_malformed_blob_decodes_to_an_empty_list() {
        let area = MemoryArea::new();
        area.set("notelist", "{not json");

        let store = SimpleStore::new(area, "notelist");
        assert!(store.list().await.unwrap().is_empty());

        // A save from the clean slate works and replaces the bad blob.
        store.save("buy milk").await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["buy milk"]);
    }

    #[tokio::test]
    async fn test_blob_is_one_json_object_with_marker_values() {
        let area = MemoryArea::new();
        let store = SimpleStore::new(area.clone(), "notelist");
        store.save("buy milk").await.unwrap();

        let blob = area.get("notelist").unwrap();
        let map: BTreeMap<String, String> = serde_json::from_str(&blob).unwrap();
        assert_eq!(map.get("buy milk").map(String::as_str), Some("1"));
    }
}
