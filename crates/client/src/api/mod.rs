//! Typed API endpoints.
//!
//! Each submodule adds an `impl ApiClient` block for one area of the API,
//! together with the request/response shapes only that area uses.

mod auth;
mod catalog;
mod orders;
mod payments;
mod users;

pub use catalog::Catalog;
pub use orders::PlacedOrder;
pub use payments::{PaymentResult, TRACKING_RETURN_PATH, VNPAY_RETURN_PATH};
