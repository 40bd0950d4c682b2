pub mod area;
pub mod config;
pub mod cookie;
pub mod error;
pub mod manager;
pub mod models;
pub mod simple;

#[cfg(not(target_arch = "wasm32"))]
pub mod sqlite;
#[cfg(not(target_arch = "wasm32"))]
pub use sqlite::SqliteStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod idb;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use idb::IdbStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use area::LocalStorageArea;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use cookie::DocumentJar;

pub use area::{FileArea, MemoryArea, StorageArea};
pub use config::StoreConfig;
pub use cookie::{CookieAttributes, CookieJar, CookieStore, MemoryJar};
pub use error::StoreError;
pub use manager::{NoteStore, StorageManager};
pub use models::EditState;
pub use simple::SimpleStore;
