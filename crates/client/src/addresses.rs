//! Per-user saved shipping addresses.
//!
//! Stored on the device as a JSON array under `addresses_<userId>`, in the
//! order they were added.

use std::sync::Arc;

use milk_delivery_core::{SavedAddress, UserId, address_book_key};
use tracing::instrument;

use crate::error::ApiError;
use crate::storage::{KeyValueStore, StorageError, get_json, set_json};

/// Address book for every user on this device.
#[derive(Debug)]
pub struct AddressBook<S> {
    storage: Arc<S>,
}

impl<S> Clone for AddressBook<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: KeyValueStore> AddressBook<S> {
    pub const fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Saved addresses of `user`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the list cannot be read or decoded.
    pub async fn list(&self, user: &UserId) -> Result<Vec<SavedAddress>, StorageError> {
        Ok(get_json(&*self.storage, &address_book_key(user))
            .await?
            .unwrap_or_default())
    }

    /// Validate and append an address. Returns the updated list.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if any field is blank (nothing is
    /// written), or `ApiError::Storage` if the write fails.
    #[instrument(skip(self, address), fields(user_id = %user))]
    pub async fn add(
        &self,
        user: &UserId,
        address: SavedAddress,
    ) -> Result<Vec<SavedAddress>, ApiError> {
        let address = address.validated()?;
        let mut addresses = self.list(user).await?;
        addresses.push(address);
        set_json(&*self.storage, &address_book_key(user), &addresses).await?;
        tracing::debug!(count = addresses.len(), "Address saved");
        Ok(addresses)
    }

    /// Remove the address at `index`. Out-of-range indices are a no-op.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the list cannot be read or written.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn remove(
        &self,
        user: &UserId,
        index: usize,
    ) -> Result<Vec<SavedAddress>, StorageError> {
        let mut addresses = self.list(user).await?;
        if index >= addresses.len() {
            return Ok(addresses);
        }
        addresses.remove(index);
        set_json(&*self.storage, &address_book_key(user), &addresses).await?;
        Ok(addresses)
    }
}
