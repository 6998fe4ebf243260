//! `KeyValueStore` trait — single async interface for durable storage.
//!
//! Values are opaque strings (JSON blobs in practice). Interpretation and
//! schema validation happen in [`crate::store::codec`]; a backend never
//! fails on malformed content, only on I/O.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::store::keys::Key;

/// Backend-agnostic durable key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value under `key`, if present.
    async fn get(&self, key: &Key) -> Result<Option<String>, StorageError>;

    /// Write (or replace) the value under `key`.
    async fn set(&self, key: &Key, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Deleting an absent key is a no-op.
    async fn remove(&self, key: &Key) -> Result<(), StorageError>;

    /// Delete everything.
    async fn clear(&self) -> Result<(), StorageError>;
}
