//! Profile and password updates.

use milk_delivery_core::{ProfileUpdate, UserId, UserProfile};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ApiError;
use crate::http::{ApiClient, Transport};
use crate::storage::KeyValueStore;

#[derive(Deserialize)]
struct EditUserResponse {
    #[serde(default)]
    user: Option<UserProfile>,
}

#[derive(Serialize)]
struct PasswordUpdate<'a> {
    password: &'a str,
}

impl<T: Transport, S: KeyValueStore> ApiClient<T, S> {
    /// `PATCH /api/users/edit/:id` with the changed profile fields.
    ///
    /// Returns the updated profile when the server echoes it back.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn edit_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<UserProfile>, ApiError> {
        let response: Option<EditUserResponse> =
            self.patch(format!("/api/users/edit/{id}"), update).await?;
        Ok(response.and_then(|r| r.user))
    }

    /// `PATCH /api/users/edit/:id` with a new password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, password), fields(user_id = %id))]
    pub async fn set_password(&self, id: &UserId, password: &SecretString) -> Result<(), ApiError> {
        let body = PasswordUpdate {
            password: password.expose_secret(),
        };
        let _: serde::de::IgnoredAny = self.patch(format!("/api/users/edit/{id}"), &body).await?;
        Ok(())
    }
}
