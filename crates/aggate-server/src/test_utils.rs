//! Test utilities for aggate-server integration tests.

use aggate_core::config::MerchantCredential;
use axum::{
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use bytes::Bytes;
use serde_json::json;

use crate::middleware::{BufferedBody, SignatureGateLayer};
use crate::routes;

/// Merchant code used in all tests.
pub const TEST_MERCHANT_CODE: &str = "M1";

/// Merchant secret used in all tests.
pub const TEST_MERCHANT_SECRET: &str = "topsecret";

async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Reads the buffered body twice: once through the extension and once
/// through the body stream. Lets tests assert both reads see identical
/// bytes.
async fn echo_twice(
    Extension(buffered): Extension<BufferedBody>,
    body: Bytes,
) -> impl IntoResponse {
    Json(json!({
        "from_extension": buffered.text(),
        "from_stream": String::from_utf8_lossy(&body),
    }))
}

/// Sink outside the callback prefix; reachable without any proof headers.
async fn passthrough(body: Bytes) -> impl IntoResponse {
    Json(json!({"received": body.len()}))
}

/// Creates the app with the signature gate applied, using test credentials.
pub fn create_test_app() -> Router {
    let credential = MerchantCredential::new(TEST_MERCHANT_CODE, TEST_MERCHANT_SECRET)
        .expect("test credential is valid");

    Router::new()
        .route("/health", get(health_check))
        .route("/passthrough", post(passthrough))
        .route("/callback/agGame", post(routes::callback::handle_ag_callback))
        .route("/callback/agGame/echo", post(echo_twice))
        .layer(SignatureGateLayer::new(credential))
}
