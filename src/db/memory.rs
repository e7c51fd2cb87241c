use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{KeyValueStore, StorageKey};
use crate::error::AppResult;

/// Process-local key-value store
///
/// Used when no Redis URL is configured. Contents live as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &StorageKey) -> AppResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&key.to_string()).cloned())
    }

    async fn set(&self, key: &StorageKey, value: String) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &StorageKey) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        entries.remove(&key.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
