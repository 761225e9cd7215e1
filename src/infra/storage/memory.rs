//! In-memory storage backend.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::Storage;
use crate::core::WorkloadResult;

/// Simple in-memory storage for development/testing.
#[derive(Default)]
pub struct InMemoryStorage {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no key is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create(&self, key: &str, value: Vec<u8>) -> WorkloadResult<bool> {
        let mut entries = self.entries.lock();
        if entries.contains_key(key) {
            return Ok(false);
        }
        if !value.is_empty() {
            entries.insert(key.to_string(), value);
        }
        Ok(true)
    }

    async fn read(&self, key: &str) -> WorkloadResult<Option<Vec<u8>>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn update(&self, key: &str, value: Vec<u8>) -> WorkloadResult<bool> {
        let mut entries = self.entries.lock();
        if !entries.contains_key(key) {
            return Ok(false);
        }
        if value.is_empty() {
            entries.remove(key);
        } else {
            entries.insert(key.to_string(), value);
        }
        Ok(true)
    }

    async fn delete(&self, key: &str) -> WorkloadResult<bool> {
        Ok(self.entries.lock().remove(key).is_some())
    }
}
