//! Integration test harness for the Milk Delivery client.
//!
//! Tests run the real `ApiClient`, `AuthMiddleware` and stores against a
//! [`ScriptedTransport`] that answers from per-route scripts and records
//! every request, so call counts and headers can be asserted exactly.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p milk-delivery-integration-tests
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use milk_delivery_client::http::{Method, StatusCode};
use milk_delivery_client::{
    ApiClient, ApiError, ApiRequest, ApiResponse, CredentialStore, MemoryStore, PaymentBrowser,
    Transport,
};
use milk_delivery_core::TokenPair;
use secrecy::ExposeSecret;
use serde_json::Value;
use url::Url;

/// Refresh endpoint path used by the client.
pub const REFRESH: &str = "/api/auth/refreshToken";

/// A request as seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

type Handler = Box<dyn Fn(&Recorded) -> Reply + Send + Sync>;

/// Scripted answer for one request.
pub enum Reply {
    Json(StatusCode, Value),
    /// Transport-level failure.
    NetworkError(&'static str),
}

enum Route {
    /// Answers used once each, in order.
    Queue(VecDeque<Reply>),
    /// Computed answer for every call.
    Handler(Handler),
}

/// In-memory [`Transport`] driven by per-route scripts.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    log: Mutex<Vec<Recorded>>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every answer, to let concurrent requests overlap.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a JSON answer for `method path`.
    pub fn reply(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.push(method, path, Reply::Json(status, body));
    }

    /// Queue a transport failure for `method path`.
    pub fn fail(&self, method: Method, path: &str, reason: &'static str) {
        self.push(method, path, Reply::NetworkError(reason));
    }

    /// Answer every call to `method path` with `handler`.
    pub fn route(
        &self,
        method: Method,
        path: &str,
        handler: impl Fn(&Recorded) -> Reply + Send + Sync + 'static,
    ) {
        self.lock_routes()
            .insert((method, path.to_owned()), Route::Handler(Box::new(handler)));
    }

    /// Every request, in the order it was sent.
    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Requests sent to `path`, any method.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Number of requests sent to `path`.
    #[must_use]
    pub fn calls(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }

    /// Number of refresh calls.
    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.calls(REFRESH)
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        let mut routes = self.lock_routes();
        let route = routes
            .entry((method, path.to_owned()))
            .or_insert_with(|| Route::Queue(VecDeque::new()));
        if let Route::Queue(queue) = route {
            queue.push_back(reply);
        }
    }

    fn lock_routes(&self) -> std::sync::MutexGuard<'_, HashMap<(Method, String), Route>> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer(&self, recorded: &Recorded) -> Reply {
        let mut routes = self.lock_routes();
        match routes.get_mut(&(recorded.method.clone(), recorded.path.clone())) {
            Some(Route::Queue(queue)) => queue.pop_front().unwrap_or_else(|| unscripted(recorded)),
            Some(Route::Handler(handler)) => handler(recorded),
            None => unscripted(recorded),
        }
    }
}

fn unscripted(recorded: &Recorded) -> Reply {
    Reply::Json(
        StatusCode::NOT_IMPLEMENTED,
        serde_json::json!({"message": format!("unscripted {} {}", recorded.method, recorded.path)}),
    )
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let recorded = Recorded {
            method: request.method.clone(),
            path: request.path.clone(),
            bearer: request.bearer().map(|t| t.expose_secret().to_owned()),
            body: request.body.clone(),
        };
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(recorded.clone());

        let reply = self.answer(&recorded);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match reply {
            Reply::Json(status, body) => Ok(ApiResponse::json(status, &body)),
            Reply::NetworkError(reason) => Err(ApiError::Network(reason.into())),
        }
    }
}

/// Client wired to a scripted transport and an in-memory store.
pub struct Harness {
    pub client: ApiClient<ScriptedTransport, MemoryStore>,
    pub storage: Arc<MemoryStore>,
}

impl Harness {
    /// Signed-out harness.
    #[must_use]
    pub fn new(transport: ScriptedTransport) -> Self {
        let storage = Arc::new(MemoryStore::new());
        let client =
            ApiClient::with_transport(transport, CredentialStore::new(Arc::clone(&storage)));
        Self { client, storage }
    }

    /// Harness with `access`/`refresh` tokens already stored.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory store rejects the write.
    pub async fn signed_in(transport: ScriptedTransport, access: &str, refresh: &str) -> Self {
        let harness = Self::new(transport);
        harness
            .client
            .credentials()
            .store_pair(&TokenPair::new(access, refresh))
            .await
            .expect("memory store write");
        harness
    }

    #[must_use]
    pub fn transport(&self) -> &ScriptedTransport {
        self.client.transport()
    }

    /// Stored access token.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory store read fails.
    pub async fn access_token(&self) -> Option<String> {
        self.client
            .credentials()
            .access_token()
            .await
            .expect("memory store read")
            .map(|t| t.expose_secret().to_owned())
    }
}

/// [`PaymentBrowser`] that records opened URLs instead of showing them.
#[derive(Default)]
pub struct RecordingBrowser {
    opened: Mutex<Vec<Url>>,
}

impl RecordingBrowser {
    #[must_use]
    pub fn opened(&self) -> Vec<Url> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PaymentBrowser for RecordingBrowser {
    async fn open(&self, url: &Url) -> Result<(), ApiError> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
        Ok(())
    }
}
