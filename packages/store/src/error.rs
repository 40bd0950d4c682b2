//! Error types for the storage layer.
//!
//! Only *structural* failures are represented here: the caller is told when a
//! backend cannot be opened or its schema cannot be set up, and when it is
//! about to persist an empty note. Transient read and lookup failures are not
//! errors at this layer: they degrade to an empty list / `false` / a no-op at
//! the call site so a flaky backend never blocks the note list.

use thiserror::Error;

/// Failures the storage contract can reject with.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend is unreachable or the platform does not provide it.
    /// Surfaced once, when an operation opens its handle.
    #[error("storage backend unavailable: {0}")]
    Connection(String),

    /// Creating the table or its unique index failed while establishing the
    /// schema version.
    #[error("schema upgrade failed: {0}")]
    Upgrade(String),

    /// The note text was empty after trimming. Rejected before any write.
    #[error("note text is empty after trimming")]
    Validation,
}
