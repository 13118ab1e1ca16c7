//! Callback endpoint handler for the AG partner.

use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::middleware::BufferedBody;

/// Handler for verified AG game callbacks.
///
/// POST /callback/agGame
///
/// Runs behind the signature gate, so the request has already been
/// authenticated and its body buffered. The [`BufferedBody`] extension
/// yields the same bytes as the body stream, as many times as needed.
pub async fn handle_ag_callback(
    Extension(buffered): Extension<BufferedBody>,
) -> impl IntoResponse {
    let payload: serde_json::Value = match serde_json::from_str(&buffered.text()) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("callback payload is not valid json: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "invalid json payload"})),
            );
        }
    };

    tracing::info!(bytes = buffered.as_bytes().len(), "ag callback received");
    (StatusCode::OK, Json(json!({"status": "ok", "payload": payload})))
}
