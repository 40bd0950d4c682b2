//! # The storage contract and its dispatcher
//!
//! This module is the core of the storage layer. [`NoteStore`] is the uniform
//! contract every backend implements; [`StorageManager`] is the single entry
//! point UI code calls, forwarding each operation verbatim to whichever
//! backend the platform actually has. All reads and writes go through the
//! trait, so the calling code never needs to know which backend it reached.
//!
//! ## [`NoteStore`] trait
//!
//! Six async operations over plain strings. Implementations live in sibling
//! modules ([`crate::sqlite`], [`crate::simple`], and `crate::idb` on web
//! builds).
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | `list` | Every stored text, in the backend's natural iteration order. In-flight read failures resolve to an empty list. |
//! | `save` | Trim, reject empty, insert. No duplicate pre-check; callers sequence `exists` → `save`, and the backend's own uniqueness (index / object key) keeps a collision from producing a second record. |
//! | `exists` | Trimmed lookup via the backend's uniqueness structure. Lookup failures resolve `false`. |
//! | `delete_one` | `exists` first; absent is a silent no-op; present deletes by the backend's internal key. |
//! | `delete_all` | Unconditionally clears the backend. |
//! | `rename` | Overwrite `old` in place with trimmed `new`; absent `old` is a no-op; empty `new` is rejected. |
//!
//! Every operation trims its text arguments before matching or writing.
//! Structural failures (the backend cannot be opened) are the only errors
//! that propagate; see [`crate::error`].
//!
//! ## Backend selection
//!
//! [`StorageManager`] probes [`NoteStore::available`] on the structured
//! backend the first time it is needed and remembers the answer;
//! human-paced callers do not need a capability check per keystroke. The
//! memo is dropped again when a forwarded operation fails with
//! [`StoreError::Connection`], so the next call re-probes and can fall back
//! mid-session. The failing call itself is never retried; every operation is
//! attempted exactly once.

use std::sync::Mutex;

use crate::error::StoreError;

/// Async contract implemented by every note backend.
///
/// Backends store trimmed, non-empty, unique texts; callers get plain
/// strings and booleans back. Whether an operation actually suspends is the
/// backend's business (the browser database does, the others complete
/// inline).
pub trait NoteStore {
    /// Every stored text, in this backend's natural iteration order.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<String>, StoreError>>;

    /// Insert the trimmed text as a new note.
    fn save(&self, text: &str) -> impl std::future::Future<Output = Result<(), StoreError>>;

    /// Whether the trimmed text is currently stored.
    fn exists(&self, text: &str) -> impl std::future::Future<Output = Result<bool, StoreError>>;

    /// Delete the note with the trimmed text; absent text is a no-op.
    fn delete_one(&self, text: &str) -> impl std::future::Future<Output = Result<(), StoreError>>;

    /// Delete every note.
    fn delete_all(&self) -> impl std::future::Future<Output = Result<(), StoreError>>;

    /// Overwrite `old_text` with trimmed `new_text`; absent `old_text` is a
    /// no-op.
    fn rename(
        &self,
        old_text: &str,
        new_text: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>>;

    /// Capability probe: can this backend be opened right now?
    fn available(&self) -> impl std::future::Future<Output = bool> {
        async { true }
    }
}

/// Which of the manager's two backends is serving calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    Structured,
    Simple,
}

/// Single entry point over a structured and a simple backend.
///
/// Holds no note data of its own; it is a dispatch seam that keeps the UI
/// backend-agnostic. The only state is the memoized probe result.
pub struct StorageManager<S, K> {
    structured: S,
    simple: K,
    selected: Mutex<Option<Backend>>,
}

impl<S: NoteStore, K: NoteStore> StorageManager<S, K> {
    pub fn new(structured: S, simple: K) -> Self {
        Self {
            structured,
            simple,
            selected: Mutex::new(None),
        }
    }

    /// The memoized backend choice, probing on first use.
    async fn backend(&self) -> Backend {
        if let Some(backend) = *self.selected.lock().unwrap() {
            return backend;
        }

        let picked = if self.structured.available().await {
            Backend::Structured
        } else {
            tracing::warn!("structured backend unavailable, serving from the simple backend");
            Backend::Simple
        };
        *self.selected.lock().unwrap() = Some(picked);
        picked
    }

    /// Drop the memoized choice when a backend reports it went away, so the
    /// next call re-probes. The failed call is not retried.
    fn record_outcome<T>(&self, result: &Result<T, StoreError>) {
        if matches!(result, Err(StoreError::Connection(_))) {
            self.selected.lock().unwrap().take();
            tracing::warn!("backend connection lost, re-probing on the next call");
        }
    }

    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let result = match self.backend().await {
            Backend::Structured => self.structured.list().await,
            Backend::Simple => self.simple.list().await,
        };
        self.record_outcome(&result);
        result
    }

    pub async fn save(&self, text: &str) -> Result<(), StoreError> {
        let result = match self.backend().await {
            Backend::Structured => self.structured.save(text).await,
            Backend::Simple => self.simple.save(text).await,
        };
        self.record_outcome(&result);
        result
    }

    pub async fn exists(&self, text: &str) -> Result<bool, StoreError> {
        let result = match self.backend().await {
            Backend::Structured => self.structured.exists(text).await,
            Backend::Simple => self.simple.exists(text).await,
        };
        self.record_outcome(&result);
        result
    }

    pub async fn delete_one(&self, text: &str) -> Result<(), StoreError> {
        let result = match self.backend().await {
            Backend::Structured => self.structured.delete_one(text).await,
            Backend::Simple => self.simple.delete_one(text).await,
        };
        self.record_outcome(&result);
        result
    }

    pub async fn delete_all(&self) -> Result<(), StoreError> {
        let result = match self.backend().await {
            Backend::Structured => self.structured.delete_all().await,
            Backend::Simple => self.simple.delete_all().await,
        };
        self.record_outcome(&result);
        result
    }

    pub async fn rename(&self, old_text: &str, new_text: &str) -> Result<(), StoreError> {
        let result = match self.backend().await {
            Backend::Structured => self.structured.rename(old_text, new_text).await,
            Backend::Simple => self.simple.rename(old_text, new_text).await,
        };
        self.record_outcome(&result);
        result
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl StorageManager<crate::sqlite::SqliteStore, crate::simple::SimpleStore<crate::area::FileArea>> {
    /// Wire the native default pair under one data directory, honoring a
    /// `notelist.toml` in that directory and falling back to the default
    /// [`crate::StoreConfig`] names.
    pub fn open_default(base: impl Into<std::path::PathBuf>) -> Self {
        let base = base.into();
        let config = std::fs::read_to_string(base.join(crate::config::StoreConfig::filename()))
            .ok()
            .and_then(|text| crate::config::StoreConfig::from_toml(&text).ok())
            .unwrap_or_default();
        Self::with_config(base, &config)
    }

    /// Wire the native default pair (a SQLite database file plus a
    /// file-backed key-value area) with explicit names.
    pub fn with_config(
        base: impl Into<std::path::PathBuf>,
        config: &crate::config::StoreConfig,
    ) -> Self {
        let base = base.into();
        let db_path = base.join(format!("{}.db", config.database.name));
        let structured = crate::sqlite::SqliteStore::with_table(db_path, &config.database.table);
        let simple = crate::simple::SimpleStore::new(
            crate::area::FileArea::new(base.join("simple")),
            &config.simple.key,
        );
        Self::new(structured, simple)
    }
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl
    StorageManager<crate::idb::IdbStore, crate::simple::SimpleStore<crate::area::LocalStorageArea>>
{
    /// Wire the browser pair: IndexedDB plus `localStorage`.
    pub fn browser(config: &crate::config::StoreConfig) -> Self {
        let structured = crate::idb::IdbStore::with_config(config);
        let simple = crate::simple::SimpleStore::new(
            crate::area::LocalStorageArea::new(),
            &config.simple.key,
        );
        Self::new(structured, simple)
    }
}
