//! In-memory store backend for tests and ephemeral runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::store::keys::Key;
use crate::store::traits::KeyValueStore;

/// HashMap-backed store. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &Key) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key.as_str()).cloned())
    }

    async fn set(&self, key: &Key, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.as_str().to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &Key) -> Result<(), StorageError> {
        self.entries.write().await.remove(key.as_str());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = MemoryStore::new();
        let key = Key::profile("a@x.com");

        assert!(store.get(&key).await.unwrap().is_none());

        store.set(&key, "{}").await.unwrap();
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("{}"));

        store.set(&key, "[1]").await.unwrap();
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("[1]"));

        store.remove(&key).await.unwrap();
        assert!(store.get(&key).await.unwrap().is_none());

        // Removing again is a no-op
        store.remove(&key).await.unwrap();
    }

    #[tokio::test]
    async fn clear_wipes_everything() {
        let store = MemoryStore::new();
        store.set(&Key::identity(), "{}").await.unwrap();
        store.set(&Key::profile("a@x.com"), "{}").await.unwrap();
        store.clear().await.unwrap();
        assert!(store.get(&Key::identity()).await.unwrap().is_none());
        assert!(store.get(&Key::profile("a@x.com")).await.unwrap().is_none());
    }
}
