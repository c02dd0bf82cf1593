//! Persistence for the task list.
//!
//! The list is stored as one entry in a key-value slot, holding the complete
//! JSON snapshot. Every write replaces the whole entry.

pub mod json_store;

use crate::error::AppError;
use std::collections::HashMap;

/// A durable string slot addressed by key.
pub trait KeyValueStore {
    /// Returns `Ok(None)` when nothing has been stored under `key` yet.
    fn read(&self, key: &str) -> Result<Option<String>, AppError>;

    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}

/// In-process store used by tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
