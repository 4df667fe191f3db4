//! Milk Delivery Core - Shared domain types.
//!
//! This crate provides the domain types used by every Milk Delivery component:
//! - `client` - Authenticated API client, local stores and checkout
//! - `cli` - Command-line front end over the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. Reducers (cart) and transition rules (order status)
//! live here so they can be tested without any runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, statuses, cart, orders, catalog and
//!   validation types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
