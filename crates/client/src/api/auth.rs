//! Sign-in and the current-user endpoint.

use milk_delivery_core::{TokenPair, UserProfile};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::http::{ApiClient, ApiRequest, Transport};
use crate::storage::KeyValueStore;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    user_name: &'a str,
    password: &'a str,
}

impl<T: Transport, S: KeyValueStore> ApiClient<T, S> {
    /// Exchange credentials for a token pair without storing it.
    ///
    /// Sent without a bearer token and outside the refresh cycle, so a wrong
    /// password comes back as `ApiError::Server` with status 401.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Server` if the credentials are rejected.
    #[instrument(skip(self, password), fields(user_name = %user_name))]
    pub async fn request_tokens(
        &self,
        user_name: &str,
        password: &SecretString,
    ) -> Result<TokenPair, ApiError> {
        let body = serde_json::to_value(SignInRequest {
            user_name,
            password: password.expose_secret(),
        })?;
        let request = ApiRequest::post("/api/auth/signin").with_body(body);
        self.send_unauthenticated(request).await?.decode()
    }

    /// Sign in and persist both tokens in a single storage write.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Server` if the credentials are rejected, or
    /// `ApiError::Storage` if the tokens cannot be saved.
    #[instrument(skip(self, password), fields(user_name = %user_name))]
    pub async fn sign_in(&self, user_name: &str, password: &SecretString) -> Result<(), ApiError> {
        let tokens = self.request_tokens(user_name, password).await?;
        self.credentials().store_pair(&tokens).await?;
        tracing::info!("Signed in");
        Ok(())
    }

    /// Profile of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the session cannot be recovered.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get("/api/auth/me").await
    }

    /// Send a request straight to the transport, bypassing bearer injection
    /// and refresh.
    ///
    /// # Errors
    ///
    /// Returns the transport error, or `ApiError::Server` for any non-2xx
    /// status (including 401).
    pub async fn send_unauthenticated(
        &self,
        request: ApiRequest,
    ) -> Result<crate::http::ApiResponse, ApiError> {
        self.transport().send(&request).await?.error_for_status()
    }
}
