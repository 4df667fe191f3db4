//! Typed API client.
//!
//! `ApiClient` is a cheap-to-clone handle over the [`AuthMiddleware`]. The
//! endpoint methods themselves live next to their domain types in
//! [`crate::api`].

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::auth::AuthMiddleware;
use super::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::storage::{FileStore, KeyValueStore};

/// Authenticated API client.
///
/// Every request is sent with the stored bearer token and gets one refresh
/// attempt on 401.
pub struct ApiClient<T = ReqwestTransport, S = FileStore> {
    inner: Arc<AuthMiddleware<T, S>>,
}

impl<T, S> Clone for ApiClient<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, S> std::fmt::Debug for ApiClient<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("middleware", &self.inner)
            .finish()
    }
}

impl<S: KeyValueStore> ApiClient<ReqwestTransport, S> {
    /// Client for the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be created.
    pub fn from_config(
        config: &ClientConfig,
        credentials: CredentialStore<S>,
    ) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(AuthMiddleware::with_refresh_path(
            transport,
            credentials,
            config.refresh_path.clone(),
        )))
    }
}

impl<T: Transport, S: KeyValueStore> ApiClient<T, S> {
    #[must_use]
    pub fn new(middleware: AuthMiddleware<T, S>) -> Self {
        Self {
            inner: Arc::new(middleware),
        }
    }

    /// Client over `transport` using the default refresh endpoint.
    #[must_use]
    pub fn with_transport(transport: T, credentials: CredentialStore<S>) -> Self {
        Self::new(AuthMiddleware::new(transport, credentials))
    }

    /// Stored session tokens.
    #[must_use]
    pub fn credentials(&self) -> &CredentialStore<S> {
        self.inner.credentials()
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        self.inner.transport()
    }

    /// Send a request through the auth middleware.
    ///
    /// # Errors
    ///
    /// See [`AuthMiddleware::send`].
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.inner.send(request).await
    }

    /// Send a request and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns the transport/auth error, or `ApiError::Decode` if the body
    /// does not match `R`.
    pub async fn call<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        self.send(request).await?.decode()
    }

    /// `GET path`, decoding the response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::call`].
    pub async fn get<R: DeserializeOwned>(&self, path: impl Into<String>) -> Result<R, ApiError> {
        self.call(ApiRequest::get(path)).await
    }

    /// `POST path` with a JSON body, decoding the response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::call`].
    pub async fn post<B, R>(&self, path: impl Into<String>, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.call(ApiRequest::post(path).with_body(body)).await
    }

    /// `PATCH path` with a JSON body, decoding the response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::call`].
    pub async fn patch<B, R>(&self, path: impl Into<String>, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.call(ApiRequest::patch(path).with_body(body)).await
    }
}
