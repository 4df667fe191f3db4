//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MILK_API_BASE_URL` - Base URL of the delivery API (e.g., `https://api.example.com`)
//!
//! ## Optional
//! - `MILK_API_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `MILK_API_REFRESH_PATH` - Token refresh endpoint (default: `/api/auth/refreshToken`)
//! - `MILK_CATALOG_TTL_SECS` - How long catalog reads are cached (default: 60)
//! - `MILK_DATA_DIR` - Directory for on-device storage (default: `.milk-delivery`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::http::REFRESH_PATH;

const DEFAULT_TIMEOUT_SECS: &str = "30";
const DEFAULT_CATALOG_TTL_SECS: &str = "60";
const DEFAULT_DATA_DIR: &str = ".milk-delivery";
const STORE_FILE_NAME: &str = "store.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all API paths are resolved against
    pub base_url: Url,
    /// Transport timeout for a single request
    pub timeout: Duration,
    /// Path of the token refresh endpoint
    pub refresh_path: String,
    /// Time-to-live for cached catalog reads
    pub catalog_ttl: Duration,
    /// Directory holding the on-device store
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(lookup);

        let base_url = vars.required("MILK_API_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("MILK_API_BASE_URL".to_string(), e.to_string())
        })?;

        let timeout = vars.seconds("MILK_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let catalog_ttl = vars.seconds("MILK_CATALOG_TTL_SECS", DEFAULT_CATALOG_TTL_SECS)?;
        let refresh_path = vars.or_default("MILK_API_REFRESH_PATH", REFRESH_PATH);
        let data_dir = PathBuf::from(vars.or_default("MILK_DATA_DIR", DEFAULT_DATA_DIR));

        Ok(Self {
            base_url,
            timeout,
            refresh_path,
            catalog_ttl,
            data_dir,
        })
    }

    /// Configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            refresh_path: REFRESH_PATH.to_string(),
            catalog_ttl: Duration::from_secs(60),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }

    /// Path of the JSON file backing the on-device store.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn seconds(&self, key: &str, default: &str) -> Result<Duration, ConfigError> {
        let secs = self
            .or_default(key, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        if secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            ClientConfig::from_lookup(lookup(&[("MILK_API_BASE_URL", "https://api.example.com")]))
                .unwrap();
        assert_eq!(config.base_url.as_str(), "https://api.example.com/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.catalog_ttl, Duration::from_secs(60));
        assert_eq!(config.refresh_path, "/api/auth/refreshToken");
        assert_eq!(
            config.store_path(),
            PathBuf::from(".milk-delivery").join("store.json")
        );
    }

    #[test]
    fn test_missing_base_url() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "MILK_API_BASE_URL"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err =
            ClientConfig::from_lookup(lookup(&[("MILK_API_BASE_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "MILK_API_BASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("MILK_API_BASE_URL", "http://localhost:5000"),
            ("MILK_API_TIMEOUT_SECS", "5"),
            ("MILK_CATALOG_TTL_SECS", "10"),
            ("MILK_DATA_DIR", "/tmp/milk"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.catalog_ttl, Duration::from_secs(10));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/milk"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("MILK_API_BASE_URL", "http://localhost:5000"),
            ("MILK_API_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "MILK_API_TIMEOUT_SECS"));
    }
}
