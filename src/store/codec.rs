//! Schema-validating storage reads.
//!
//! Every typed read goes through [`read_json`]; a bare `serde_json` parse
//! of a stored blob is never allowed elsewhere. Malformed entries degrade
//! to `Corrupt`, which callers treat as absent — a corrupt store entry
//! must never crash the session.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::StorageError;
use crate::store::keys::Key;
use crate::store::traits::KeyValueStore;

/// Outcome of a typed storage read.
#[derive(Debug)]
pub enum Loaded<T> {
    /// The key held a value of the expected shape.
    Value(T),
    /// The key was not present.
    Absent,
    /// The key held data that failed to parse. The caller decides whether
    /// to discard the entry.
    Corrupt,
}

impl<T> Loaded<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Loaded::Value(v) => Some(v),
            Loaded::Absent | Loaded::Corrupt => None,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Loaded::Corrupt)
    }
}

/// Read and deserialize the value under `key`.
///
/// Only I/O failures are errors; shape mismatches come back as
/// `Loaded::Corrupt` with a warning logged.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &Key,
) -> Result<Loaded<T>, StorageError> {
    match store.get(key).await? {
        None => Ok(Loaded::Absent),
        Some(raw) => match serde_json::from_str::<T>(&raw) {
            Ok(value) => Ok(Loaded::Value(value)),
            Err(e) => {
                warn!(%key, error = %e, "Discarding corrupt store entry");
                Ok(Loaded::Corrupt)
            }
        },
    }
}

/// Serialize and write `value` under `key`.
pub async fn write_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &Key,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key, &raw).await
}
