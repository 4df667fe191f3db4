//! Integration tests for the 401 -> refresh -> replay cycle.
//!
//! Every test drives real endpoint methods through the auth middleware and
//! asserts exact request counts on the scripted transport.

use std::time::Duration;

use milk_delivery_client::http::{Method, StatusCode};
use milk_delivery_client::{ApiError, AuthFailure};
use milk_delivery_integration_tests::{Harness, REFRESH, Reply, ScriptedTransport};
use serde_json::json;

const ME: &str = "/api/auth/me";

fn profile() -> serde_json::Value {
    json!({"_id": "u1", "userName": "lan", "firstName": "Lan", "lastName": "Nguyen"})
}

// =============================================================================
// Single request
// =============================================================================

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_replayed() {
    let transport = ScriptedTransport::new();
    transport.reply(Method::GET, ME, StatusCode::UNAUTHORIZED, json!({"message": "jwt expired"}));
    transport.reply(Method::POST, REFRESH, StatusCode::OK, json!({"accessToken": "a2"}));
    transport.reply(Method::GET, ME, StatusCode::OK, profile());
    let harness = Harness::signed_in(transport, "a1", "r1").await;

    let user = harness.client.me().await.unwrap();

    assert_eq!(user.first_name, "Lan");
    assert_eq!(harness.transport().calls(ME), 2);
    assert_eq!(harness.transport().refresh_calls(), 1);

    let calls = harness.transport().requests_to(ME);
    assert_eq!(calls[0].bearer.as_deref(), Some("a1"));
    assert_eq!(calls[1].bearer.as_deref(), Some("a2"));

    let refresh = &harness.transport().requests_to(REFRESH)[0];
    assert_eq!(refresh.bearer, None);
    assert_eq!(refresh.body, Some(json!({"refreshToken": "r1"})));

    assert_eq!(harness.access_token().await.as_deref(), Some("a2"));
}

#[tokio::test]
async fn test_second_401_is_surfaced_after_one_refresh() {
    let transport = ScriptedTransport::new();
    transport.reply(Method::GET, ME, StatusCode::UNAUTHORIZED, json!({}));
    transport.reply(Method::POST, REFRESH, StatusCode::OK, json!({"accessToken": "a2"}));
    transport.reply(Method::GET, ME, StatusCode::UNAUTHORIZED, json!({"message": "user disabled"}));
    let harness = Harness::signed_in(transport, "a1", "r1").await;

    let err = harness.client.me().await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Unauthorized {
            cause: AuthFailure::RejectedAfterRefresh,
            ..
        }
    ));
    assert_eq!(harness.transport().calls(ME), 2);
    assert_eq!(harness.transport().refresh_calls(), 1);
}

#[tokio::test]
async fn test_no_refresh_token_means_no_refresh_call() {
    let transport = ScriptedTransport::new();
    transport.reply(Method::GET, ME, StatusCode::UNAUTHORIZED, json!({"message": "jwt expired"}));
    let harness = Harness::new(transport);

    let err = harness.client.me().await.unwrap_err();

    match err {
        ApiError::Unauthorized { message, cause } => {
            assert_eq!(cause, AuthFailure::NoRefreshToken);
            assert_eq!(message.as_deref(), Some("jwt expired"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(harness.transport().refresh_calls(), 0);
    assert_eq!(harness.transport().calls(ME), 1);
}

#[tokio::test]
async fn test_failed_refresh_returns_original_401_and_keeps_tokens() {
    let transport = ScriptedTransport::new();
    transport.reply(Method::GET, ME, StatusCode::UNAUTHORIZED, json!({"message": "jwt expired"}));
    transport.reply(
        Method::POST,
        REFRESH,
        StatusCode::UNAUTHORIZED,
        json!({"message": "refresh token expired"}),
    );
    let harness = Harness::signed_in(transport, "a1", "r1").await;

    let err = harness.client.me().await.unwrap_err();

    match err {
        ApiError::Unauthorized { message, cause } => {
            assert_eq!(message.as_deref(), Some("jwt expired"));
            assert!(matches!(cause, AuthFailure::RefreshFailed(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(harness.transport().calls(ME), 1);
    assert_eq!(harness.access_token().await.as_deref(), Some("a1"));
}

#[tokio::test]
async fn test_refresh_network_error_is_reported_as_refresh_failure() {
    let transport = ScriptedTransport::new();
    transport.reply(Method::GET, ME, StatusCode::UNAUTHORIZED, json!({}));
    transport.fail(Method::POST, REFRESH, "connection reset");
    let harness = Harness::signed_in(transport, "a1", "r1").await;

    let err = harness.client.me().await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Unauthorized {
            cause: AuthFailure::RefreshFailed(ref reason),
            ..
        } if reason.contains("connection reset")
    ));
}

#[tokio::test]
async fn test_network_error_is_not_retried() {
    let transport = ScriptedTransport::new();
    transport.fail(Method::GET, ME, "timed out");
    let harness = Harness::signed_in(transport, "a1", "r1").await;

    let err = harness.client.me().await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(harness.transport().requests().len(), 1);
}

#[tokio::test]
async fn test_server_error_passes_through() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::GET,
        "/api/products/getAllProducts",
        StatusCode::SERVICE_UNAVAILABLE,
        json!({"message": "maintenance"}),
    );
    let harness = Harness::signed_in(transport, "a1", "r1").await;

    let err = harness.client.products().await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    assert_eq!(err.user_message(), "maintenance");
    assert_eq!(harness.transport().refresh_calls(), 0);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let transport = ScriptedTransport::new().with_latency(Duration::from_millis(20));
    transport.route(Method::GET, ME, |req| {
        if req.bearer.as_deref() == Some("fresh") {
            Reply::Json(StatusCode::OK, profile())
        } else {
            Reply::Json(StatusCode::UNAUTHORIZED, json!({"message": "jwt expired"}))
        }
    });
    transport.route(Method::POST, REFRESH, |_| {
        Reply::Json(StatusCode::OK, json!({"accessToken": "fresh"}))
    });
    let harness = Harness::signed_in(transport, "stale", "r1").await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let client = harness.client.clone();
            tokio::spawn(async move { client.me().await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(harness.transport().refresh_calls(), 1);
    assert_eq!(harness.access_token().await.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_concurrent_refresh_failure_is_shared() {
    let transport = ScriptedTransport::new().with_latency(Duration::from_millis(20));
    transport.route(Method::GET, ME, |_| {
        Reply::Json(StatusCode::UNAUTHORIZED, json!({"message": "jwt expired"}))
    });
    transport.route(Method::POST, REFRESH, |_| {
        Reply::Json(StatusCode::FORBIDDEN, json!({"message": "refresh token revoked"}))
    });
    let harness = Harness::signed_in(transport, "stale", "r1").await;

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let client = harness.client.clone();
            tokio::spawn(async move { client.me().await })
        })
        .collect();
    for task in tasks {
        let err = task.await.unwrap().unwrap_err();
        assert!(err.is_auth());
    }

    assert_eq!(harness.transport().refresh_calls(), 1);
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_sign_in_stores_both_tokens_without_bearer() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/api/auth/signin",
        StatusCode::OK,
        json!({"accessToken": "a1", "refreshToken": "r1"}),
    );
    let harness = Harness::new(transport);

    harness
        .client
        .sign_in("lan", &"secret".to_owned().into())
        .await
        .unwrap();

    assert_eq!(harness.access_token().await.as_deref(), Some("a1"));
    let signin = &harness.transport().requests_to("/api/auth/signin")[0];
    assert_eq!(signin.bearer, None);
    assert_eq!(
        signin.body,
        Some(json!({"userName": "lan", "password": "secret"}))
    );
}

#[tokio::test]
async fn test_wrong_password_does_not_trigger_refresh() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/api/auth/signin",
        StatusCode::UNAUTHORIZED,
        json!({"message": "Invalid password"}),
    );
    let harness = Harness::signed_in(transport, "a1", "r1").await;

    let err = harness
        .client
        .sign_in("lan", &"wrong".to_owned().into())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(harness.transport().refresh_calls(), 0);
    assert_eq!(harness.access_token().await.as_deref(), Some("a1"));
}
