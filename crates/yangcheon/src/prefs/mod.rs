//! Key-value preference storage.
//!
//! Values are kept as strings and parsed by the typed accessors, matching the
//! primitive-valued settings the phone apps persist. Writes are last-write-wins.

mod memory;
mod settings;
mod sqlite;

pub use memory::MemoryPreferences;
pub use settings::{keys, Settings, TeacherSelection};
pub use sqlite::SqlitePreferences;

use thiserror::Error;

/// Errors raised by a preference backend.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The SQLite backend failed
    #[error("Preference database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A writer panicked while holding the store lock
    #[error("Preference store lock poisoned")]
    Poisoned,
}

/// A process-wide settings store.
///
/// Implementors only provide raw string access; the typed getters fall back
/// to the caller's default when a key is missing or holds something that
/// does not parse.
pub trait PreferenceStore: Send + Sync {
    fn get_raw(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    fn put_raw(&self, key: &str, value: &str) -> Result<(), PreferenceError>;

    fn remove(&self, key: &str) -> Result<(), PreferenceError>;

    /// Removes every key.
    fn clear(&self) -> Result<(), PreferenceError>;

    fn keys(&self) -> Result<Vec<String>, PreferenceError>;

    fn get_string(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        self.get_raw(key)
    }

    fn put_string(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.put_raw(key, value)
    }

    fn get_int(&self, key: &str, default: i64) -> Result<i64, PreferenceError> {
        Ok(self
            .get_raw(key)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(default))
    }

    fn put_int(&self, key: &str, value: i64) -> Result<(), PreferenceError> {
        self.put_raw(key, &value.to_string())
    }

    fn get_bool(&self, key: &str, default: bool) -> Result<bool, PreferenceError> {
        Ok(self
            .get_raw(key)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(default))
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<(), PreferenceError> {
        self.put_raw(key, if value { "true" } else { "false" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors_fall_back_on_garbage() {
        let store = MemoryPreferences::new();
        store.put_raw("defaultGrade", "two").unwrap();
        store.put_raw("notificationsEnabled", "maybe").unwrap();

        assert_eq!(store.get_int("defaultGrade", 1).unwrap(), 1);
        assert!(store.get_bool("notificationsEnabled", true).unwrap());
        assert_eq!(store.get_int("missing", 7).unwrap(), 7);
    }

    #[test]
    fn test_typed_round_trip() {
        let store = MemoryPreferences::new();
        store.put_int("cellBackgroundColor", 0xFFBBDEFB).unwrap();
        store.put_bool("initialSetupCompleted", true).unwrap();

        assert_eq!(store.get_int("cellBackgroundColor", 0).unwrap(), 0xFFBBDEFB);
        assert!(store.get_bool("initialSetupCompleted", false).unwrap());
    }
}
