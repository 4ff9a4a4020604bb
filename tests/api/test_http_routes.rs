// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Router-level tests for the ledger HTTP API
//!
//! Requests go through `create_app` with `oneshot`, so extractors, error
//! mapping and status codes are exercised exactly as a client sees them.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use reward_ledger_node::{
    api::{
        auth::{OPERATOR_HEADER, SUPPLIER_HEADER},
        create_app, AppState,
    },
    config::ServerConfig,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

fn app_with(config: ServerConfig) -> Router {
    let state = AppState::in_memory(config).expect("Failed to build app state");
    create_app(Arc::new(state))
}

fn app() -> Router {
    app_with(ServerConfig::default())
}

/// Sends one request and returns the status plus the parsed JSON body
/// (or the raw text under `"text"` when the body is not JSON).
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    headers: &[(&str, String)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, value.as_str());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| json!({ "text": String::from_utf8_lossy(&bytes) }));
    (status, value)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/v1/suppliers",
        &[],
        Some(json!({ "username": username })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["supplier"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_route() {
    let (status, body) = send(&app(), Method::GET, "/health", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_withdrawal_round_trip_over_http() {
    let app = app();
    let supplier = register(&app, "alice").await;
    let me = [(SUPPLIER_HEADER, supplier.clone())];

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/me/payout-methods",
        &me,
        Some(json!({ "method_type": "paypal", "account_number": "alice@pay.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/submissions/bulk-entry",
        &[],
        Some(json!({
            "supplier_id": supplier,
            "emails": "a@mail.test\nb@mail.test",
            "status": "good"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, Method::GET, "/v1/me/balance", &me, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], 40);

    let (status, body) = send(&app, Method::POST, "/v1/me/withdrawals", &me, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["amount"], 40);
    let withdrawal_id = body["data"]["id"].as_str().unwrap().to_string();

    let resolve_uri = format!("/v1/withdrawals/{}/resolve", withdrawal_id);
    let (status, body) = send(
        &app,
        Method::PATCH,
        &resolve_uri,
        &[],
        Some(json!({ "action": "approve", "remarks": "paid", "proof": "txn-9" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Withdrawal approved successfully");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &resolve_uri,
        &[],
        Some(json!({ "action": "reject" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_type"], "not_pending");

    let (status, body) = send(&app, Method::GET, "/v1/me/notifications", &me, None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["title"].as_str())
        .collect();
    assert!(titles.contains(&"Withdrawal Approved"));
}

#[tokio::test]
async fn test_invalid_status_is_bad_request() {
    let app = app();
    let supplier = register(&app, "bob").await;
    let (_, body) = send(
        &app,
        Method::POST,
        "/v1/submissions/bulk-entry",
        &[],
        Some(json!({ "supplier_id": supplier, "emails": "x@mail.test" })),
    )
    .await;
    let id = body["data"]["created"][0].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/v1/submissions/{}/status", id),
        &[],
        Some(json!({ "status": "excellent" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_status");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/v1/submissions/{}/status", id),
        &[],
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Status is already 'pending'. No update needed.");
}

#[tokio::test]
async fn test_supplier_routes_require_identity() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/v1/me/balance", &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "unauthorized");

    let (status, _) = send(
        &app,
        Method::GET,
        "/v1/me/balance",
        &[(SUPPLIER_HEADER, "not-a-uuid".to_string())],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_operator_key_is_enforced_when_required() {
    let app = app_with(ServerConfig {
        operator_api_keys: vec!["s3cret".to_string()],
        require_operator_key: true,
        ..ServerConfig::default()
    });

    let (status, _) = send(&app, Method::GET, "/v1/settings", &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::GET,
        "/v1/settings",
        &[(OPERATOR_HEADER, "wrong".to_string())],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::GET,
        "/v1/settings",
        &[(OPERATOR_HEADER, "s3cret".to_string())],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default_email_reward"], 20);
}

#[tokio::test]
async fn test_settings_update_rejects_negative_values() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/v1/settings",
        &[],
        Some(json!({ "default_email_reward": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/v1/settings",
        &[],
        Some(json!({ "default_email_reward": 25 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["default_email_reward"], 25);
}

#[tokio::test]
async fn test_duplicate_supplier_is_conflict() {
    let app = app();
    register(&app, "carol").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/suppliers",
        &[],
        Some(json!({ "username": "Carol" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_type"], "duplicate_supplier");
}

#[tokio::test]
async fn test_metrics_route_exposes_counters() {
    let app = app();
    register(&app, "dave").await;

    let (status, body) = send(&app, Method::GET, "/metrics", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    let text = body["text"].as_str().unwrap();
    assert!(text.contains("ledger_"));
}
