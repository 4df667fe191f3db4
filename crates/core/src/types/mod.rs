//! Core types for Milk Delivery.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod credential;
pub mod id;
pub mod order;
pub mod price;
pub mod status;
pub mod user;
pub mod validation;

pub use address::{DEFAULT_COUNTRY, SavedAddress, address_book_key};
pub use cart::{Cart, CartItem, CartLine};
pub use catalog::{
    BrandRef, Package, PackageProduct, Product, packages_matching, products_by_brand,
};
pub use checkout::{NewOrder, OrderForm};
pub use credential::{CredentialKey, TokenPair};
pub use id::*;
pub use order::{
    OrderDetail, OrderHeader, OrderItem, OrderSummary, StatusUpdate, TransitionError,
    format_api_date, parse_api_date, plan_transition,
};
pub use price::{CurrencyCode, Price};
pub use status::*;
pub use user::{ProfileUpdate, UserProfile};
pub use validation::ValidationError;
