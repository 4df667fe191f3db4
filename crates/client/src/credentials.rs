//! Credential persistence.
//!
//! Thin typed layer over [`KeyValueStore`] for the access/refresh token
//! pair. Tokens are written at sign-in, the access token is read before
//! every request, and both are removed at logout.

use std::sync::Arc;

use milk_delivery_core::{CredentialKey, TokenPair};
use secrecy::{ExposeSecret, SecretString};

use crate::storage::{KeyValueStore, StorageError};

/// Shared handle to the stored session tokens.
#[derive(Debug)]
pub struct CredentialStore<S> {
    store: Arc<S>,
}

impl<S> Clone for CredentialStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> CredentialStore<S> {
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying key-value store.
    #[must_use]
    pub fn storage(&self) -> &Arc<S> {
        &self.store
    }

    /// Current access token, if signed in.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the backend read fails.
    pub async fn access_token(&self) -> Result<Option<SecretString>, StorageError> {
        self.read(CredentialKey::AccessToken).await
    }

    /// Current refresh token, if signed in.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the backend read fails.
    pub async fn refresh_token(&self) -> Result<Option<SecretString>, StorageError> {
        self.read(CredentialKey::RefreshToken).await
    }

    /// Whether both tokens are present.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the backend read fails.
    pub async fn has_session(&self) -> Result<bool, StorageError> {
        Ok(self.access_token().await?.is_some() && self.refresh_token().await?.is_some())
    }

    /// Persist both tokens in a single write.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the backend write fails.
    pub async fn store_pair(&self, pair: &TokenPair) -> Result<(), StorageError> {
        let entries = pair.storage_entries();
        let borrowed: Vec<(&str, &str)> = entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        self.store.multi_set(&borrowed).await
    }

    /// Replace the access token after a refresh.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the backend write fails.
    pub async fn set_access_token(&self, token: &SecretString) -> Result<(), StorageError> {
        self.store
            .set(CredentialKey::AccessToken.as_str(), token.expose_secret())
            .await
    }

    /// Remove both tokens.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the backend write fails.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(CredentialKey::AccessToken.as_str()).await?;
        self.store.remove(CredentialKey::RefreshToken.as_str()).await
    }

    async fn read(&self, key: CredentialKey) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .store
            .get(key.as_str())
            .await?
            .filter(|value| !value.is_empty())
            .map(SecretString::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_store_and_clear_pair() {
        let creds = CredentialStore::new(Arc::new(MemoryStore::new()));
        assert!(!creds.has_session().await.unwrap());

        creds.store_pair(&TokenPair::new("a1", "r1")).await.unwrap();
        assert!(creds.has_session().await.unwrap());
        assert_eq!(
            creds.access_token().await.unwrap().unwrap().expose_secret(),
            "a1"
        );

        creds.set_access_token(&SecretString::from("a2")).await.unwrap();
        assert_eq!(
            creds.access_token().await.unwrap().unwrap().expose_secret(),
            "a2"
        );
        assert_eq!(
            creds.refresh_token().await.unwrap().unwrap().expose_secret(),
            "r1"
        );

        creds.clear().await.unwrap();
        assert!(creds.access_token().await.unwrap().is_none());
        assert!(creds.refresh_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_token_counts_as_absent() {
        let store = MemoryStore::with_entries([("accessToken", ""), ("refreshToken", "r1")]);
        let creds = CredentialStore::new(Arc::new(store));
        assert!(creds.access_token().await.unwrap().is_none());
        assert!(!creds.has_session().await.unwrap());
    }
}
