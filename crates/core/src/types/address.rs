//! Shipping addresses.

use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::validation::{ValidationError, require};

/// Country pre-filled on new addresses.
pub const DEFAULT_COUNTRY: &str = "Vietnam";

/// A shipping address, as saved on the device and sent with orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAddress {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

impl SavedAddress {
    /// Build an address, trimming every field and requiring all of them.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for the first blank field.
    pub fn new(
        full_name: &str,
        phone: &str,
        address: &str,
        city: &str,
        country: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            full_name: require("full name", full_name)?,
            phone: require("phone", phone)?,
            address: require("address", address)?,
            city: require("city", city)?,
            country: require("country", country)?,
        })
    }

    /// Re-check a value that did not come through [`SavedAddress::new`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for the first blank field.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Self::new(
            &self.full_name,
            &self.phone,
            &self.address,
            &self.city,
            &self.country,
        )
    }
}

/// Storage key of a user's address list.
#[must_use]
pub fn address_book_key(user: &UserId) -> String {
    format!("addresses_{user}")
}
