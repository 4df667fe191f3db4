//! On-device key-value storage.
//!
//! The app persists tokens, the cart, saved addresses and search history
//! through a small async string-keyed store. [`MemoryStore`] backs tests;
//! [`FileStore`] keeps a JSON document on disk so data survives restarts.

mod file;
mod memory;

use std::future::Future;
use std::sync::Arc;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized.
    #[error("Corrupt data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Async string key-value store with process-wide lifetime.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete a value. Missing keys are not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Write several values in one operation.
    fn multi_set(
        &self,
        entries: &[(&str, &str)],
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}

impl<S: KeyValueStore> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).remove(key)
    }

    fn multi_set(
        &self,
        entries: &[(&str, &str)],
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).multi_set(entries)
    }
}

/// Read a JSON value stored under `key`.
///
/// # Errors
///
/// Returns `StorageError::Corrupt` if the stored text is not valid JSON for `T`.
pub async fn get_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: serde::de::DeserializeOwned,
    S: KeyValueStore,
{
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Store `value` as JSON under `key`.
///
/// # Errors
///
/// Returns a `StorageError` if serialization or the write fails.
pub async fn set_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: serde::Serialize + Sync,
    S: KeyValueStore,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}
