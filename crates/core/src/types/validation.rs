//! Client-side validation errors.
//!
//! These are raised before anything is sent to the server and are reported
//! inline by the caller.

use chrono::NaiveDate;
use thiserror::Error;

use super::order::TransitionError;
use super::status::DeliveryCombo;

/// A form or action failed a client-side check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The chosen start date is not a delivery day for the combo.
    #[error("{date} is not a delivery day for combo {combo}")]
    DeliveryDayMismatch {
        /// Selected weekly combo.
        combo: DeliveryCombo,
        /// Selected start date.
        date: NaiveDate,
    },

    /// Number of shipments is not a positive integer.
    #[error("number of shipments must be a positive number, got {0:?}")]
    InvalidShipmentCount(String),

    /// New password and its confirmation differ.
    #[error("new passwords do not match")]
    PasswordMismatch,

    /// Order status change not allowed from the current state.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Return the trimmed value or a `MissingField` error.
///
/// # Errors
///
/// Returns `ValidationError::MissingField` if `value` is empty after trimming.
pub fn require(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_trims_and_rejects_blank() {
        assert_eq!(require("city", "  Hanoi ").unwrap(), "Hanoi");
        assert_eq!(require("city", "   "), Err(ValidationError::MissingField("city")));
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::MissingField("phone").to_string(),
            "phone is required"
        );
        assert_eq!(
            ValidationError::PasswordMismatch.to_string(),
            "new passwords do not match"
        );
    }
}
