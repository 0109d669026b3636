//! In-memory preference store.

use super::{PreferenceError, PreferenceStore};
use dashmap::DashMap;

/// Thread-safe preference store that lives only as long as the process.
///
/// Uses DashMap for concurrent access without external locking.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    entries: DashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_raw(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn put_raw(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), PreferenceError> {
        self.entries.clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, PreferenceError> {
        Ok(self.entries.iter().map(|entry| entry.key().clone()).collect())
    }
}
