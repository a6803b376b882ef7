//! In-memory storage

use rustc_hash::FxHashMap;

use super::{KeyValueStore, StorageError, check_quota};

/// Key-value area held in process memory.
///
/// Contents do not survive the process; used for tests and ephemeral carts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: FxHashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Create an empty, unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store holding at most `quota` bytes of keys and values.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: FxHashMap::default(),
            quota: Some(quota),
        }
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.slots
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let replaced = self
            .slots
            .get(key)
            .map_or(0, |previous| key.len() + previous.len());

        let needed = self.used_bytes() - replaced + key.len() + value.len();

        check_quota(key, needed, self.quota)?;

        self.slots.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);

        Ok(())
    }
}
