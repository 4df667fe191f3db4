//! Credential types.
//!
//! The API issues an access/refresh token pair at sign-in. Both are opaque to
//! the client and never logged.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Storage keys under which session data is persisted on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    /// Short-lived bearer token.
    AccessToken,
    /// Long-lived token exchanged for a new access token.
    RefreshToken,
}

impl CredentialKey {
    /// The storage key string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "accessToken",
            Self::RefreshToken => "refreshToken",
        }
    }
}

impl std::fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access/refresh token pair returned by `POST /api/auth/signin`.
///
/// Implements `Debug` manually to redact both tokens.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Bearer token attached to authenticated requests.
    pub access_token: SecretString,
    /// Token exchanged for a new access token after a 401.
    pub refresh_token: SecretString,
}

impl TokenPair {
    /// Create a token pair from raw strings.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: SecretString::from(refresh_token.into()),
        }
    }

    /// Key/value entries for a single multi-set write.
    #[must_use]
    pub fn storage_entries(&self) -> Vec<(CredentialKey, String)> {
        vec![
            (
                CredentialKey::AccessToken,
                self.access_token.expose_secret().to_owned(),
            ),
            (
                CredentialKey::RefreshToken,
                self.refresh_token.expose_secret().to_owned(),
            ),
        ]
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}
