//! # Browser-side note persistence over IndexedDB
//!
//! [`IdbStore`] is the structured [`NoteStore`] implementation used on the
//! **web platform**. It persists the note list into the browser's IndexedDB
//! via the [`rexie`] crate (a Rust wrapper around the IndexedDB API), so the
//! list survives reloads without any server.
//!
//! ## Database schema
//!
//! A single IndexedDB database (version 1) with one object store:
//!
//! | IndexedDB store | Key | Value | Index |
//! |-----------------|-----|-------|-------|
//! | `"notes"` | auto-increment surrogate | `{ text: String }` (serialised via `serde_wasm_bindgen`) | unique index `"text"` on the `text` field |
//!
//! The unique index serves `exists` lookups and rejects inserts of a text
//! that is already stored, so two racing save interactions still leave one
//! record.
//!
//! ## Connection management
//!
//! `IdbStore` holds only the configured names (`Clone`-friendly) and opens a
//! fresh [`Rexie`] connection on every operation. `Rexie` does not implement
//! `Clone`, and reopening is cheap because the browser caches IndexedDB
//! connections internally.
//!
//! ## Error handling
//!
//! A database that cannot be opened rejects the operation with
//! [`StoreError::Connection`]. Once a connection is open, failures are
//! silently swallowed (empty list for reads, `false` for lookups, nothing
//! for writes), so a corrupted IndexedDB degrades to "no notes" rather than
//! crashing the page.

use rexie::{Index, ObjectStore as RexieObjectStore, Rexie, TransactionMode};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::manager::NoteStore;

const DB_VERSION: u32 = 1;

/// Shape of one stored record.
#[derive(Serialize, Deserialize)]
struct NoteRecord {
    text: String,
}

fn open_error(error: rexie::Error) -> StoreError {
    StoreError::Connection(error.to_string())
}

fn record_text(value: &JsValue) -> Option<String> {
    let record: NoteRecord = serde_wasm_bindgen::from_value(value.clone()).ok()?;
    Some(record.text)
}

/// Surrogate key of the entry holding `text`, if any.
fn key_for(entries: Vec<(JsValue, JsValue)>, text: &str) -> Option<JsValue> {
    entries
        .into_iter()
        .find_map(|(key, value)| (record_text(&value)? == text).then_some(key))
}

/// IndexedDB-backed note store for the web platform.
#[derive(Clone)]
pub struct IdbStore {
    db_name: String,
    store: String,
}

impl IdbStore {
    /// Store under the default database and object-store names.
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        Self {
            db_name: config.database.name.clone(),
            store: config.database.table.clone(),
        }
    }

    async fn open_db(&self) -> Result<Rexie, rexie::Error> {
        Rexie::builder(&self.db_name)
            .version(DB_VERSION)
            .add_object_store(
                RexieObjectStore::new(&self.store)
                    .auto_increment(true)
                    .add_index(Index::new("text", "text").unique(true)),
            )
            .build()
            .await
    }

    /// Membership through the unique index; any in-flight failure reads as
    /// absent.
    async fn lookup(&self, db: &Rexie, text: &str) -> Option<JsValue> {
        let tx = db
            .transaction(&[self.store.as_str()], TransactionMode::ReadOnly)
            .ok()?;
        let store = tx.store(&self.store).ok()?;
        let index = store.index("text").ok()?;
        index.get(JsValue::from_str(text)).await.ok()?
    }
}

impl NoteStore for IdbStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let db = self.open_db().await.map_err(open_error)?;
        let Ok(tx) = db.transaction(&[self.store.as_str()], TransactionMode::ReadOnly) else {
            return Ok(Vec::new());
        };
        let Ok(store) = tx.store(&self.store) else {
            return Ok(Vec::new());
        };
        let Ok(entries) = store.get_all(None, None, None, None).await else {
            return Ok(Vec::new());
        };
        Ok(entries
            .iter()
            .filter_map(|(_, value)| record_text(value))
            .collect())
    }

    async fn save(&self, text: &str) -> Result<(), StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::Validation);
        }
        let db = self.open_db().await.map_err(open_error)?;
        let Ok(tx) = db.transaction(&[self.store.as_str()], TransactionMode::ReadWrite) else {
            return Ok(());
        };
        let Ok(store) = tx.store(&self.store) else {
            return Ok(());
        };
        let record = NoteRecord {
            text: text.to_string(),
        };
        let Ok(value) = serde_wasm_bindgen::to_value(&record) else {
            return Ok(());
        };
        // A text already behind the unique index makes the add fail; the
        // existing record stays.
        let _ = store.add(&value, None).await;
        let _ = tx.done().await;
        Ok(())
    }

    async fn exists(&self, text: &str) -> Result<bool, StoreError> {
        let db = self.open_db().await.map_err(open_error)?;
        Ok(self.lookup(&db, text.trim()).await.is_some())
    }

    async fn delete_one(&self, text: &str) -> Result<(), StoreError> {
        let text = text.trim();
        let db = self.open_db().await.map_err(open_error)?;
        let Ok(tx) = db.transaction(&[self.store.as_str()], TransactionMode::ReadWrite) else {
            return Ok(());
        };
        let Ok(store) = tx.store(&self.store) else {
            return Ok(());
        };
        let Ok(entries) = store.get_all(None, None, None, None).await else {
            return Ok(());
        };
        if let Some(key) = key_for(entries, text) {
            let _ = store.delete(key).await;
        }
        let _ = tx.done().await;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let db = self.open_db().await.map_err(open_error)?;
        let Ok(tx) = db.transaction(&[self.store.as_str()], TransactionMode::ReadWrite) else {
            return Ok(());
        };
        let Ok(store) = tx.store(&self.store) else {
            return Ok(());
        };
        let _ = store.clear().await;
        let _ = tx.done().await;
        Ok(())
    }

    async fn rename(&self, old_text: &str, new_text: &str) -> Result<(), StoreError> {
        let old_text = old_text.trim();
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return Err(StoreError::Validation);
        }
        let db = self.open_db().await.map_err(open_error)?;
        let Ok(tx) = db.transaction(&[self.store.as_str()], TransactionMode::ReadWrite) else {
            return Ok(());
        };
        let Ok(store) = tx.store(&self.store) else {
            return Ok(());
        };
        let Ok(entries) = store.get_all(None, None, None, None).await else {
            return Ok(());
        };
        let Some(key) = key_for(entries, old_text) else {
            let _ = tx.done().await;
            return Ok(());
        };
        let record = NoteRecord {
            text: new_text.to_string(),
        };
        let Ok(value) = serde_wasm_bindgen::to_value(&record) else {
            return Ok(());
        };
        // Overwrite in place; a new text already stored elsewhere makes the
        // unique index reject the put, leaving both records as they are.
        let _ = store.put(&value, Some(&key)).await;
        let _ = tx.done().await;
        Ok(())
    }

    async fn available(&self) -> bool {
        self.open_db().await.is_ok()
    }
}
