//! SQLite-based blob storage.

use std::path::Path;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::backend::{BlobStore, PersistenceResult};

/// SQLite backend storing one row per store name.
pub struct SqliteBlobStore {
    conn: Mutex<Connection>,
}

impl SqliteBlobStore {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> PersistenceResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> PersistenceResult<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                name TEXT PRIMARY KEY,
                blob TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl BlobStore for SqliteBlobStore {
    fn load(&self, name: &str) -> PersistenceResult<Option<String>> {
        let blob = self
            .conn
            .lock()
            .query_row(
                "SELECT blob FROM kv_store WHERE name = ?1",
                params![name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(blob)
    }

    fn save(&self, name: &str, blob: &str) -> PersistenceResult<()> {
        let now = Utc::now().timestamp_millis();
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO kv_store (name, blob, updated_at) VALUES (?1, ?2, ?3)",
            params![name, blob, now],
        )?;
        tracing::debug!("Saved store {} ({} bytes)", name, blob.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_round_trip() {
        let store = SqliteBlobStore::in_memory().unwrap();
        assert!(store.load("weather-storage").unwrap().is_none());

        store.save("weather-storage", "one").unwrap();
        store.save("weather-storage", "two").unwrap();
        assert_eq!(store.load("weather-storage").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habitdash.db");

        {
            let store = SqliteBlobStore::open(&path).unwrap();
            store.save("habits-storage", "{}").unwrap();
        }

        let reopened = SqliteBlobStore::open(&path).unwrap();
        assert_eq!(reopened.load("habits-storage").unwrap().as_deref(), Some("{}"));
    }
}
