//! SQLite-backed preference store.

use super::{PreferenceError, PreferenceStore};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS preferences (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

pub struct SqlitePreferences {
    db: Mutex<Connection>,
}

impl SqlitePreferences {
    /// Opens (or creates) the preference database at `path` and initializes the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreferenceError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Opening preference database");
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database
    pub fn open_in_memory() -> Result<Self, PreferenceError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, PreferenceError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, PreferenceError> {
        self.db.lock().map_err(|_| PreferenceError::Poisoned)
    }
}

impl PreferenceStore for SqlitePreferences {
    fn get_raw(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let db = self.lock()?;
        let value = db
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_raw(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let db = self.lock()?;
        db.execute(
            "INSERT INTO preferences (key, value, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value),
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        let db = self.lock()?;
        db.execute("DELETE FROM preferences WHERE key = ?1", [key])?;
        Ok(())
    }

    fn clear(&self) -> Result<(), PreferenceError> {
        let db = self.lock()?;
        db.execute("DELETE FROM preferences", [])?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, PreferenceError> {
        let db = self.lock()?;
        let mut stmt = db.prepare("SELECT key FROM preferences ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}
