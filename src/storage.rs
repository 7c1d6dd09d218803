use crate::error::StoreError;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Key under which the progress snapshot is stored.
pub const SNAPSHOT_KEY: &str = "study_state";

/// Durable home of the single progress snapshot.
pub trait SnapshotStore {
    fn read(&self) -> Result<Option<String>, StoreError>;
    fn write(&mut self, value: &str) -> Result<(), StoreError>;
}

// ============================================================
// SQLite
// ============================================================

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(SqliteStore { conn })
    }
}

impl SnapshotStore for SqliteStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![SNAPSHOT_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![SNAPSHOT_KEY, value],
        )?;
        Ok(())
    }
}

// ============================================================
// In-memory
// ============================================================

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    value: Option<String>,
    pub writes: usize,
}

impl MemoryStore {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            writes: 0,
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.value.clone())
    }

    fn write(&mut self, value: &str) -> Result<(), StoreError> {
        self.value = Some(value.to_string());
        self.writes += 1;
        Ok(())
    }
}
