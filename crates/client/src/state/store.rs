//! Owner of [`AppState`] with write-through cart persistence.

use std::sync::Arc;

use milk_delivery_core::{Cart, UserProfile};
use tracing::instrument;

use super::{Action, AppState, Effect, reduce};
use crate::storage::{KeyValueStore, StorageError, get_json, set_json};

/// Storage key of the persisted cart.
pub const CART_KEY: &str = "cart";

/// Holds the application state and persists the cart after every change.
#[derive(Debug)]
pub struct AppStore<S> {
    state: AppState,
    storage: Arc<S>,
}

impl<S: KeyValueStore> AppStore<S> {
    /// Empty state backed by `storage`. Nothing is read.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            state: AppState::default(),
            storage,
        }
    }

    /// State with the cart restored from `storage`.
    ///
    /// A snapshot that cannot be decoded is discarded with a warning so a bad
    /// write never locks the user out of the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the backend read fails.
    #[instrument(skip(storage))]
    pub async fn load(storage: Arc<S>) -> Result<Self, StorageError> {
        let mut store = Self::new(storage);
        match get_json::<Cart, _>(&*store.storage, CART_KEY).await {
            Ok(Some(cart)) => {
                let _ = reduce(&mut store.state, Action::RestoreCart(cart));
                tracing::debug!(
                    lines = store.state.cart.lines().len(),
                    "Cart restored from storage"
                );
            }
            Ok(None) => {}
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable cart snapshot");
            }
            Err(e) => return Err(e),
        }
        Ok(store)
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.state.cart
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.state.user.as_ref()
    }

    /// Apply `action` and persist the result if the cart changed.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the cart cannot be written. The in-memory
    /// state has already changed at that point.
    pub async fn dispatch(&mut self, action: Action) -> Result<(), StorageError> {
        match reduce(&mut self.state, action) {
            Effect::None => Ok(()),
            Effect::PersistCart => set_json(&*self.storage, CART_KEY, &self.state.cart).await,
            Effect::RemoveCart => self.storage.remove(CART_KEY).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use milk_delivery_core::{CartItem, CartItemId, Price};

    use super::*;
    use crate::storage::MemoryStore;

    fn item(id: &str, price: i64) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            name: format!("Item {id}"),
            unit_price: Price::from_dong(price),
            image: None,
            brand_name: None,
        }
    }

    #[tokio::test]
    async fn test_cart_survives_reload() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = AppStore::new(Arc::clone(&storage));
        store
            .dispatch(Action::AddToCart {
                item: item("p1", 10_000),
                quantity: 2,
            })
            .await
            .unwrap();
        store
            .dispatch(Action::AddToCart {
                item: item("pk1", 150_000),
                quantity: 1,
            })
            .await
            .unwrap();

        let reloaded = AppStore::load(storage).await.unwrap();
        assert_eq!(reloaded.cart(), store.cart());
        assert_eq!(reloaded.cart().total_quantity(), 3);
        assert_eq!(reloaded.cart().total_price(), Price::from_dong(170_000));
    }

    #[tokio::test]
    async fn test_clear_removes_key() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = AppStore::new(Arc::clone(&storage));
        store
            .dispatch(Action::AddToCart {
                item: item("p1", 10_000),
                quantity: 1,
            })
            .await
            .unwrap();
        assert!(storage.get(CART_KEY).await.unwrap().is_some());

        store.dispatch(Action::ClearCart).await.unwrap();
        assert!(storage.get(CART_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_totals_are_rederived_on_load() {
        let snapshot = serde_json::json!({
            "items": [
                {"id": "p1", "name": "Milk", "price": "10000", "quantity": 3}
            ],
            "totalQuantity": 99,
            "totalPrice": "1"
        });
        let storage = Arc::new(MemoryStore::with_entries([(CART_KEY, snapshot.to_string())]));

        let store = AppStore::load(storage).await.unwrap();
        assert_eq!(store.cart().total_quantity(), 3);
        assert_eq!(store.cart().total_price(), Price::from_dong(30_000));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_discarded() {
        let storage = Arc::new(MemoryStore::with_entries([(CART_KEY, "{not json")]));
        let store = AppStore::load(storage).await.unwrap();
        assert!(store.cart().is_empty());
    }
}
