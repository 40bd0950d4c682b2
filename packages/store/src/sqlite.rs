//! Structured backend over an embedded SQLite database.
//!
//! One table holds the notes: an auto-incrementing surrogate `id` plus the
//! `text` column, with a unique index on `text`. The index is what `exists`
//! and the delete/rename lookups go through, and it is also the last line of
//! defense against duplicate inserts when two interactions race past the
//! caller-side `exists` check.
//!
//! Every operation opens a fresh connection, converges the schema, performs
//! its statements, and drops the handle; nothing is pooled or reused. A
//! failed open rejects the call with [`StoreError::Connection`] (or
//! [`StoreError::Upgrade`] when the schema cannot be created); failures of
//! statements on an already-open handle are logged and swallowed into
//! "empty" / "false" / no-op results instead.

use std::path::PathBuf;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;
use crate::manager::NoteStore;

const SCHEMA_VERSION: u32 = 1;

/// Note storage in a SQLite database file.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    path: PathBuf,
    table: String,
}

impl SqliteStore {
    /// Store notes in the database file at `path`, in the default table.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_table(path, "notes")
    }

    pub fn with_table(path: impl Into<PathBuf>, table: &str) -> Self {
        Self {
            path: path.into(),
            table: table.to_string(),
        }
    }

    /// Open a fresh handle and converge the schema. Open failures are
    /// connection errors; schema failures are upgrade errors.
    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)
            .map_err(|error| StoreError::Connection(error.to_string()))?;
        self.ensure_schema(&conn)?;
        Ok(conn)
    }

    fn ensure_schema(&self, conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_text ON {table} (text);
            PRAGMA user_version = {version};",
            table = self.table,
            version = SCHEMA_VERSION,
        ))
        .map_err(|error| StoreError::Upgrade(error.to_string()))
    }

    /// Surrogate key for a stored text, resolved through the unique index.
    fn find_id(&self, conn: &Connection, text: &str) -> rusqlite::Result<Option<i64>> {
        conn.query_row(
            &format!("SELECT id FROM {} WHERE text = ?1", self.table),
            params![text],
            |row| row.get(0),
        )
        .optional()
    }
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl NoteStore for SqliteStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.connect()?;
        let result = conn
            .prepare(&format!("SELECT text FROM {} ORDER BY id", self.table))
            .and_then(|mut statement| {
                statement
                    .query_map([], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<String>>>()
            });
        match result {
            Ok(texts) => Ok(texts),
            Err(error) => {
                tracing::warn!(%error, "note query failed, returning an empty list");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, text: &str) -> Result<(), StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::Validation);
        }
        let conn = self.connect()?;
        match conn.execute(
            &format!("INSERT INTO {} (text) VALUES (?1)", self.table),
            params![text],
        ) {
            Ok(_) => {}
            Err(error) if is_unique_violation(&error) => {
                tracing::debug!(text, "note already stored, keeping the existing record");
            }
            Err(error) => tracing::warn!(%error, "note insert failed"),
        }
        Ok(())
    }

    async fn exists(&self, text: &str) -> Result<bool, StoreError> {
        let conn = self.connect()?;
        match self.find_id(&conn, text.trim()) {
            Ok(found) => Ok(found.is_some()),
            Err(error) => {
                tracing::debug!(%error, "note lookup failed, treating as absent");
                Ok(false)
            }
        }
    }

    async fn delete_one(&self, text: &str) -> Result<(), StoreError> {
        let conn = self.connect()?;
        match self.find_id(&conn, text.trim()) {
            Ok(Some(id)) => {
                if let Err(error) = conn.execute(
                    &format!("DELETE FROM {} WHERE id = ?1", self.table),
                    params![id],
                ) {
                    tracing::warn!(%error, "note delete failed");
                }
            }
            Ok(None) => {}
            Err(error) => tracing::debug!(%error, "note lookup failed, nothing deleted"),
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        if let Err(error) = conn.execute(&format!("DELETE FROM {}", self.table), []) {
            tracing::warn!(%error, "note clear failed");
        }
        Ok(())
    }

    async fn rename(&self, old_text: &str, new_text: &str) -> Result<(), StoreError> {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return Err(StoreError::Validation);
        }
        let conn = self.connect()?;
        match self.find_id(&conn, old_text.trim()) {
            Ok(Some(id)) => {
                match conn.execute(
                    &format!("UPDATE {} SET text = ?1 WHERE id = ?2", self.table),
                    params![new_text, id],
                ) {
                    Ok(_) => {}
                    // The target text is already stored; the unique index
                    // keeps both records as they are.
                    Err(error) if is_unique_violation(&error) => {
                        tracing::debug!(
                            new_text,
                            "rename target already stored, leaving notes unchanged"
                        );
                    }
                    Err(error) => tracing::warn!(%error, "note rename failed"),
                }
            }
            Ok(None) => {}
            Err(error) => tracing::debug!(%error, "note lookup failed, nothing renamed"),
        }
        Ok(())
    }

    async fn available(&self) -> bool {
        self.connect().is_ok()
    }
}
