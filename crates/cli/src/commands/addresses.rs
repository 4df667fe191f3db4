//! Saved address commands.

use milk_delivery_client::App;
use milk_delivery_core::SavedAddress;

use super::{CliError, print_lines, require_user};

pub async fn list(app: &mut App) -> Result<(), CliError> {
    let user = require_user(app)?;
    let addresses = app.addresses().list(&user.id).await?;
    if addresses.is_empty() {
        return print_lines(["No saved addresses"]);
    }
    print_lines(
        addresses
            .iter()
            .enumerate()
            .map(|(index, a)| format!("{index}: {}", address_line(a))),
    )
}

pub async fn add(
    app: &mut App,
    name: &str,
    phone: &str,
    address: &str,
    city: &str,
    country: &str,
) -> Result<(), CliError> {
    let user = require_user(app)?;
    let address = SavedAddress {
        full_name: name.to_owned(),
        phone: phone.to_owned(),
        address: address.to_owned(),
        city: city.to_owned(),
        country: country.to_owned(),
    };
    app.addresses().add(&user.id, address).await?;
    list(app).await
}

pub async fn remove(app: &mut App, index: usize) -> Result<(), CliError> {
    let user = require_user(app)?;
    let before = app.addresses().list(&user.id).await?.len();
    if index >= before {
        return Err(CliError::NoSuchAddress(index));
    }
    app.addresses().remove(&user.id, index).await?;
    list(app).await
}

pub fn address_line(a: &SavedAddress) -> String {
    format!(
        "{}, {} - {}, {}, {}",
        a.full_name, a.phone, a.address, a.city, a.country
    )
}
