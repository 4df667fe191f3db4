//! Command implementations.
//!
//! Listings are written to stdout; progress and errors go through `tracing`
//! on stderr.

pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod session;

use std::io::Write;

use milk_delivery_client::{ApiError, App, ClientConfig, ConfigError, PaymentBrowser};
use milk_delivery_core::UserProfile;
use secrecy::SecretString;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

/// Errors raised by the CLI itself.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// API or local storage failure.
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    /// The command needs a signed-in user.
    #[error("Not signed in. Run `milk-cli login` first.")]
    NotSignedIn,

    /// Saved address index out of range.
    #[error("No saved address at index {0}")]
    NoSuchAddress(usize),

    /// Terminal input or output failed.
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<milk_delivery_client::StorageError> for CliError {
    fn from(err: milk_delivery_client::StorageError) -> Self {
        Self::Api(err.into())
    }
}

/// Load configuration, open the store and restore the session.
///
/// # Errors
///
/// Returns `CliError::Config` if configuration is missing, or `CliError::Api`
/// if the store cannot be opened.
pub async fn open_app() -> Result<App, CliError> {
    let config = ClientConfig::from_env()?;
    let mut app = App::from_config(&config).await?;
    app.bootstrap().await?;
    Ok(app)
}

/// The signed-in user, or `CliError::NotSignedIn`.
pub fn require_user(app: &App) -> Result<UserProfile, CliError> {
    app.user().cloned().ok_or(CliError::NotSignedIn)
}

/// Write lines to stdout.
pub fn print_lines<I, L>(lines: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = L>,
    L: std::fmt::Display,
{
    let mut out = std::io::stdout().lock();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Read one line from stdin after showing `label` on stderr.
pub async fn prompt(label: &str) -> Result<String, CliError> {
    {
        let mut err = std::io::stderr().lock();
        write!(err, "{label}: ")?;
        err.flush()?;
    }
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// Read a secret line from stdin.
pub async fn prompt_secret(label: &str) -> Result<SecretString, CliError> {
    Ok(SecretString::from(prompt(label).await?))
}

/// Shows the payment URL and waits for the user to confirm they are done.
pub struct TerminalBrowser;

impl PaymentBrowser for TerminalBrowser {
    async fn open(&self, url: &Url) -> Result<(), ApiError> {
        tracing::info!(%url, "Open this URL to pay");
        prompt("Press Enter once the payment is finished")
            .await
            .map_err(|e| ApiError::Payment(e.to_string()))?;
        Ok(())
    }
}
