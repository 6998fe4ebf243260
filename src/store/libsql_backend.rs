//! libSQL store backend — async `KeyValueStore` over a single `kv` table.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Connection, Database, params};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::store::keys::Key;
use crate::store::traits::KeyValueStore;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<Database>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Open(format!("Failed to create store directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StorageError::Open(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StorageError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        info!(path = %path.display(), "Store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StorageError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StorageError::Open(format!("Failed to create in-memory store: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StorageError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| StorageError::Open(format!("Failed to create kv table: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for LibSqlStore {
    async fn get(&self, key: &Key) -> Result<Option<String>, StorageError> {
        let mut rows = self
            .conn
            .query(
                "SELECT value FROM kv WHERE key = ?1",
                params![key.as_str()],
            )
            .await
            .map_err(|e| StorageError::Query(format!("get {key}: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value: String = row
                    .get(0)
                    .map_err(|e| StorageError::Query(format!("get {key} row: {e}")))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::Query(format!("get {key}: {e}"))),
        }
    }

    async fn set(&self, key: &Key, value: &str) -> Result<(), StorageError> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
                params![key.as_str(), value, now],
            )
            .await
            .map_err(|e| StorageError::Query(format!("set {key}: {e}")))?;
        debug!(%key, "Store value written");
        Ok(())
    }

    async fn remove(&self, key: &Key) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key.as_str()])
            .await
            .map_err(|e| StorageError::Query(format!("remove {key}: {e}")))?;
        debug!(%key, "Store value removed");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv", ())
            .await
            .map_err(|e| StorageError::Query(format!("clear: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = LibSqlStore::new_memory().await.unwrap();
        let key = Key::profile("a@x.com");

        assert!(store.get(&key).await.unwrap().is_none());
        store.set(&key, "{\"summary\":\"s\"}").await.unwrap();
        assert_eq!(
            store.get(&key).await.unwrap().as_deref(),
            Some("{\"summary\":\"s\"}")
        );

        // Upsert replaces
        store.set(&key, "{}").await.unwrap();
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("{}"));

        store.remove(&key).await.unwrap();
        assert!(store.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn local_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");
        let key = Key::identity();

        {
            let store = LibSqlStore::new_local(&path).await.unwrap();
            store.set(&key, "{\"email\":\"a@x.com\"}").await.unwrap();
        }

        let store = LibSqlStore::new_local(&path).await.unwrap();
        assert_eq!(
            store.get(&key).await.unwrap().as_deref(),
            Some("{\"email\":\"a@x.com\"}")
        );
    }

    #[tokio::test]
    async fn clear_removes_all_keys() {
        let store = LibSqlStore::new_memory().await.unwrap();
        store.set(&Key::identity(), "{}").await.unwrap();
        store
            .set(&Key::scheduled_posts("a@x.com"), "[]")
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert!(store.get(&Key::identity()).await.unwrap().is_none());
        assert!(
            store
                .get(&Key::scheduled_posts("a@x.com"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
