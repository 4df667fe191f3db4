//! The application: one owned value wiring the client, local stores and
//! state together.

use std::sync::Arc;

use chrono::NaiveDate;
use milk_delivery_core::{
    OrderForm, Package, ProfileUpdate, UserProfile, ValidationError, packages_matching,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::addresses::AddressBook;
use crate::api::Catalog;
use crate::checkout::{CheckoutOutcome, PaymentBrowser};
use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::http::{ApiClient, ReqwestTransport, Transport};
use crate::search_history::SearchHistory;
use crate::state::{Action, AppState, AppStore};
use crate::storage::{FileStore, KeyValueStore, StorageError};

/// Client-side application.
pub struct App<T = ReqwestTransport, S = FileStore> {
    client: ApiClient<T, S>,
    catalog: Catalog<T, S>,
    store: AppStore<S>,
    addresses: AddressBook<S>,
    search_history: SearchHistory<S>,
}

impl<T, S> std::fmt::Debug for App<T, S>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("client", &self.client)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl App<ReqwestTransport, FileStore> {
    /// Open the on-device store and build an app for the configured API.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store cannot be opened, or
    /// `ApiError::Network` if the HTTP client cannot be built.
    #[instrument(skip(config), fields(base_url = %config.base_url))]
    pub async fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let storage = Arc::new(FileStore::open(config.store_path()).await?);
        let client = ApiClient::from_config(config, CredentialStore::new(Arc::clone(&storage)))?;
        Ok(Self::load(client, storage, config).await?)
    }
}

impl<T, S> App<T, S>
where
    T: Transport + 'static,
    S: KeyValueStore + 'static,
{
    /// Build an app around `client`, restoring the persisted cart.
    ///
    /// `storage` must be the store the client's credentials live in.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the cart cannot be read.
    pub async fn load(
        client: ApiClient<T, S>,
        storage: Arc<S>,
        config: &ClientConfig,
    ) -> Result<Self, StorageError> {
        let store = AppStore::load(Arc::clone(&storage)).await?;
        Ok(Self {
            catalog: Catalog::new(client.clone(), config.catalog_ttl),
            addresses: AddressBook::new(Arc::clone(&storage)),
            search_history: SearchHistory::new(storage),
            client,
            store,
        })
    }

    #[must_use]
    pub const fn client(&self) -> &ApiClient<T, S> {
        &self.client
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog<T, S> {
        &self.catalog
    }

    #[must_use]
    pub const fn addresses(&self) -> &AddressBook<S> {
        &self.addresses
    }

    #[must_use]
    pub const fn search_history(&self) -> &SearchHistory<S> {
        &self.search_history
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        self.store.state()
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.store.user()
    }

    /// Apply a state action, persisting the cart if it changed.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the cart cannot be written.
    pub async fn dispatch(&mut self, action: Action) -> Result<(), StorageError> {
        self.store.dispatch(action).await
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sign in, store the tokens and load the profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Server` if the credentials are rejected, or any
    /// error from storing the tokens or fetching the profile.
    #[instrument(skip(self, password), fields(user_name = %user_name))]
    pub async fn sign_in(
        &mut self,
        user_name: &str,
        password: &SecretString,
    ) -> Result<UserProfile, ApiError> {
        self.client.sign_in(user_name, password).await?;
        let profile = self.client.me().await?;
        self.dispatch(Action::SetUser(profile.clone())).await?;
        Ok(profile)
    }

    /// Restore the session at startup.
    ///
    /// With both tokens stored, the profile is fetched. A failed fetch is
    /// logged and leaves the app signed out; tokens are kept.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the tokens cannot be read.
    #[instrument(skip(self))]
    pub async fn bootstrap(&mut self) -> Result<Option<UserProfile>, ApiError> {
        if !self.client.credentials().has_session().await? {
            tracing::debug!("No stored session");
            return Ok(None);
        }
        match self.client.me().await {
            Ok(profile) => {
                self.dispatch(Action::SetUser(profile.clone())).await?;
                tracing::info!(user_id = %profile.id, "Session restored");
                Ok(Some(profile))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore session");
                Ok(None)
            }
        }
    }

    /// Remove the stored tokens and forget the user.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the tokens cannot be removed.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<(), StorageError> {
        self.client.credentials().clear().await?;
        self.dispatch(Action::ClearUser).await?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Change the password of the signed-in user, then sign out.
    ///
    /// The current password is verified with a sign-in call first.
    ///
    /// # Errors
    ///
    /// - `ApiError::Validation` if nobody is signed in, a field is blank or
    ///   the new password and its confirmation differ (nothing is sent)
    /// - `ApiError::Server` if the current password is wrong
    #[instrument(skip_all)]
    pub async fn change_password(
        &mut self,
        current: &SecretString,
        new: &SecretString,
        confirm: &SecretString,
    ) -> Result<(), ApiError> {
        let user = self
            .user()
            .ok_or(ValidationError::MissingField("signed-in user"))?;
        let user_id = user.id.clone();
        let user_name = user
            .user_name
            .clone()
            .ok_or(ValidationError::MissingField("user name"))?;

        if current.expose_secret().is_empty() {
            return Err(ValidationError::MissingField("current password").into());
        }
        if new.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingField("new password").into());
        }
        if new.expose_secret() != confirm.expose_secret() {
            return Err(ValidationError::PasswordMismatch.into());
        }

        self.client.request_tokens(&user_name, current).await?;
        self.client.set_password(&user_id, new).await?;
        self.logout().await?;
        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Update profile fields of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if nobody is signed in, otherwise any
    /// error from the request.
    #[instrument(skip_all)]
    pub async fn edit_profile(&mut self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let user = self
            .user()
            .cloned()
            .ok_or(ValidationError::MissingField("signed-in user"))?;
        if update.is_empty() {
            return Ok(user);
        }

        let profile = match self.client.edit_profile(&user.id, update).await? {
            Some(profile) => profile,
            None => self.client.me().await?,
        };
        self.dispatch(Action::SetUser(profile.clone())).await?;
        Ok(profile)
    }

    // =========================================================================
    // Catalog & checkout
    // =========================================================================

    /// Record `query` in the search history and return the packages that
    /// contain a matching product.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be written or the packages
    /// cannot be fetched.
    #[instrument(skip(self))]
    pub async fn search_packages(&self, query: &str) -> Result<Vec<Package>, ApiError> {
        self.search_history.record(query).await?;
        let packages = self.catalog.packages().await?;
        Ok(packages_matching(&packages, query)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Validate the checkout form for `package` and submit the order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if nobody is signed in or the form is
    /// invalid (nothing is sent), otherwise see [`ApiClient::submit_order`].
    #[instrument(skip(self, form, package, browser), fields(package_id = %package.id))]
    pub async fn checkout<B: PaymentBrowser>(
        &self,
        form: &OrderForm,
        package: &Package,
        today: NaiveDate,
        browser: &B,
    ) -> Result<CheckoutOutcome, ApiError> {
        let user = self
            .user()
            .ok_or(ValidationError::MissingField("signed-in user"))?;
        let order = form.validate(&package.id, &user.id, today)?;
        self.client
            .submit_order(&order, package.effective_price(), browser)
            .await
    }
}
