//! Bearer-token middleware with one-shot refresh.
//!
//! Every request goes through [`AuthMiddleware::send`]:
//!
//! 1. Attach the stored access token (if any) and send.
//! 2. Anything but 401 is final: 2xx passes through, other statuses become
//!    `ApiError::Server`, transport errors propagate untouched.
//! 3. On the first 401, obtain a new access token from the refresh endpoint,
//!    persist it, swap the `Authorization` header and replay once.
//! 4. A 401 on the replay is final.
//!
//! Refreshes are single-flight. A gate records an epoch that advances with
//! every refresh attempt. A request remembers the epoch it saw when it read
//! its token; if the epoch moved by the time its 401 arrives, another request
//! already refreshed and the recorded outcome is reused instead of calling
//! the endpoint again. N concurrent 401s therefore cost one refresh call.
//! If the stored access token is no longer the one the request was sent
//! with (a refresh or a new sign-in landed meanwhile), the request is
//! replayed with the stored token and no recorded failure is reused.
//!
//! When recovery fails the caller gets the original 401 (with the failure
//! cause attached); the refresh error itself is logged.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::instrument;

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::credentials::CredentialStore;
use crate::error::{ApiError, AuthFailure};
use crate::storage::KeyValueStore;

/// Default refresh endpoint path.
pub const REFRESH_PATH: &str = "/api/auth/refreshToken";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

#[derive(Default)]
struct RefreshGate {
    epoch: u64,
    last: Option<Result<SecretString, AuthFailure>>,
}

/// Wraps a [`Transport`] with bearer-token injection and 401 recovery.
pub struct AuthMiddleware<T, S> {
    transport: T,
    credentials: CredentialStore<S>,
    refresh_path: String,
    gate: Mutex<RefreshGate>,
}

impl<T, S> std::fmt::Debug for AuthMiddleware<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMiddleware")
            .field("refresh_path", &self.refresh_path)
            .finish_non_exhaustive()
    }
}

impl<T: Transport, S: KeyValueStore> AuthMiddleware<T, S> {
    /// Wrap `transport`, reading tokens from `credentials`.
    pub fn new(transport: T, credentials: CredentialStore<S>) -> Self {
        Self::with_refresh_path(transport, credentials, REFRESH_PATH)
    }

    /// Same as [`AuthMiddleware::new`] with a custom refresh endpoint.
    pub fn with_refresh_path(
        transport: T,
        credentials: CredentialStore<S>,
        refresh_path: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            credentials,
            refresh_path: refresh_path.into(),
            gate: Mutex::new(RefreshGate::default()),
        }
    }

    /// Credential store used by this middleware.
    pub const fn credentials(&self) -> &CredentialStore<S> {
        &self.credentials
    }

    /// The wrapped transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request` with authentication and one-shot refresh.
    ///
    /// # Errors
    ///
    /// - `ApiError::Network` if the transport fails (no retry)
    /// - `ApiError::Server` for non-2xx, non-401 responses
    /// - `ApiError::Unauthorized` if a 401 could not be recovered
    /// - `ApiError::Storage` if the access token cannot be read
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let observed_epoch = self.gate.lock().await.epoch;
        request.set_bearer(self.credentials.access_token().await?);

        let response = self.transport.send(&request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return response.error_for_status();
        }

        let original_message = response.message();
        tracing::debug!("Received 401, attempting token refresh");

        let token = match self.refresh(observed_epoch, request.bearer()).await {
            Ok(token) => token,
            Err(cause) => {
                return Err(ApiError::Unauthorized {
                    message: original_message,
                    cause,
                });
            }
        };

        request.set_bearer(Some(token));
        let replay = self.transport.send(&request).await?;
        if replay.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("Request rejected again after token refresh");
            return Err(ApiError::Unauthorized {
                message: replay.message(),
                cause: AuthFailure::RejectedAfterRefresh,
            });
        }
        replay.error_for_status()
    }

    /// Obtain a fresh access token, coalescing with any refresh that
    /// happened after `observed_epoch`. `sent` is the token the rejected
    /// request carried.
    async fn refresh(
        &self,
        observed_epoch: u64,
        sent: Option<&SecretString>,
    ) -> Result<SecretString, AuthFailure> {
        let mut gate = self.gate.lock().await;

        match self.credentials.access_token().await {
            Ok(Some(current))
                if sent.is_none_or(|s| s.expose_secret() != current.expose_secret()) =>
            {
                tracing::debug!("Access token changed since the request was sent");
                return Ok(current);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to re-read access token"),
        }

        if gate.epoch != observed_epoch
            && let Some(outcome) = &gate.last
        {
            tracing::debug!("Reusing concurrent refresh outcome");
            return outcome.clone();
        }

        let outcome = self.refresh_once().await;
        gate.epoch += 1;
        gate.last = Some(outcome.clone());
        outcome
    }

    #[instrument(skip(self))]
    async fn refresh_once(&self) -> Result<SecretString, AuthFailure> {
        let refresh_token = match self.credentials.refresh_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::info!("No refresh token available, skipping token refresh");
                return Err(AuthFailure::NoRefreshToken);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read refresh token");
                return Err(AuthFailure::RefreshFailed(e.to_string()));
            }
        };

        let body = serde_json::to_value(RefreshRequest {
            refresh_token: refresh_token.expose_secret(),
        })
        .map_err(|e| AuthFailure::RefreshFailed(e.to_string()))?;
        let request = ApiRequest::post(self.refresh_path.clone()).with_body(body);

        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh access token");
                return Err(AuthFailure::RefreshFailed(e.to_string()));
            }
        };

        if !response.status().is_success() {
            let reason = format!(
                "HTTP {}: {}",
                response.status(),
                response.message().unwrap_or_else(|| "no message".to_owned())
            );
            tracing::warn!(%reason, "Failed to refresh access token");
            return Err(AuthFailure::RefreshFailed(reason));
        }

        let refreshed: RefreshResponse = response.decode().map_err(|e| {
            tracing::warn!(error = %e, "Refresh response missing access token");
            AuthFailure::RefreshFailed(e.to_string())
        })?;
        let token = SecretString::from(refreshed.access_token);

        if let Err(e) = self.credentials.set_access_token(&token).await {
            // The replay can still use the new token; later requests refresh again.
            tracing::error!(error = %e, "Failed to persist refreshed access token");
        }
        tracing::info!("Access token refreshed");

        Ok(token)
    }
}
