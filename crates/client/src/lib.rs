//! Milk Delivery Client - authenticated API access and local app state.
//!
//! # Architecture
//!
//! - [`http`] - `Transport` abstraction over `reqwest`, the `AuthMiddleware`
//!   that attaches bearer tokens and performs the 401 → refresh → replay
//!   cycle, and the typed `ApiClient`
//! - [`api`] - typed endpoint methods (auth, catalog, orders, users, payments)
//! - [`storage`] - on-device key-value storage capability (`KeyValueStore`)
//!   with in-memory and file-backed implementations
//! - [`credentials`] - access/refresh token persistence on top of storage
//! - [`state`] - application state container with pure reducers and
//!   write-through cart persistence
//! - [`addresses`], [`search_history`] - small per-device stores
//! - [`checkout`] - order placement and the payment redirect flow
//! - [`app`] - the single owned `App` wiring everything together
//!
//! # Security
//!
//! Tokens and passwords are held as `SecretString` and never logged.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod addresses;
pub mod api;
pub mod app;
pub mod checkout;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod search_history;
pub mod state;
pub mod storage;

pub use addresses::AddressBook;
pub use api::{Catalog, PaymentResult, PlacedOrder};
pub use app::App;
pub use checkout::{CheckoutOutcome, PaymentBrowser};
pub use config::{ClientConfig, ConfigError};
pub use credentials::CredentialStore;
pub use error::{ApiError, AuthFailure};
pub use http::{ApiClient, ApiRequest, ApiResponse, AuthMiddleware, ReqwestTransport, Transport};
pub use search_history::SearchHistory;
pub use state::{Action, AppState, AppStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
