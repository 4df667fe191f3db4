//! HTTP layer: raw transport, auth middleware and the typed client.

mod auth;
mod client;
mod transport;

pub use auth::{AuthMiddleware, REFRESH_PATH};
pub use client::ApiClient;
pub use reqwest::{Method, StatusCode};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
