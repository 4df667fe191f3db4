//! Sign-in, sign-out and profile commands.

use milk_delivery_client::App;
use milk_delivery_core::{ProfileUpdate, UserProfile};
use tracing::info;

use super::{CliError, print_lines, prompt_secret, require_user};

/// Sign in as `user`, prompting for the password.
pub async fn login(app: &mut App, user: &str) -> Result<(), CliError> {
    let password = prompt_secret("Password").await?;
    let profile = app.sign_in(user, &password).await?;
    info!(user_id = %profile.id, "Signed in as {}", profile.display_name());
    Ok(())
}

pub async fn logout(app: &mut App) -> Result<(), CliError> {
    app.logout().await?;
    Ok(())
}

/// Print the signed-in user's profile.
pub fn me(app: &App) -> Result<(), CliError> {
    let profile = require_user(app)?;
    print_profile(&profile)
}

/// Prompt for the current and new passwords, change it, sign out.
pub async fn change_password(app: &mut App) -> Result<(), CliError> {
    require_user(app)?;
    let current = prompt_secret("Current password").await?;
    let new = prompt_secret("New password").await?;
    let confirm = prompt_secret("Confirm new password").await?;

    app.change_password(&current, &new, &confirm).await?;
    info!("Password changed. Please sign in again.");
    Ok(())
}

pub async fn edit_profile(app: &mut App, update: &ProfileUpdate) -> Result<(), CliError> {
    let profile = app.edit_profile(update).await?;
    print_profile(&profile)
}

fn print_profile(profile: &UserProfile) -> Result<(), CliError> {
    let role = if profile.is_shipper() {
        "shipper".to_owned()
    } else {
        profile.role.clone().unwrap_or_else(|| "customer".to_owned())
    };
    print_lines([
        format!("{} ({})", profile.display_name(), profile.id),
        format!("Role:    {role}"),
        format!("Email:   {}", profile.email.as_deref().unwrap_or("-")),
        format!("Phone:   {}", profile.phone_number.as_deref().unwrap_or("-")),
        format!("Address: {}", profile.address.as_deref().unwrap_or("-")),
    ])
}
