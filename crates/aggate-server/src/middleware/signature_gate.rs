//! Callback signature verification middleware.
//!
//! Requests whose path starts with [`CALLBACK_PATH_PREFIX`] must carry five
//! `x-*` proof headers and a valid HMAC-SHA256 signature over the request
//! body. Verified requests are forwarded with a replayable buffered body;
//! all other paths pass through untouched, with no header inspection and no
//! body read.
//!
//! Per-request pipeline: path check, header extraction, body buffering,
//! merchant code check, signature computation. Any failure is terminal for
//! that request and is translated into a JSON error response.

use aggate_core::{
    config::MerchantCredential,
    error::CallbackError,
    verify::{verify_signature, SignatureContext},
};
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use std::borrow::Cow;
use std::sync::Arc;

/// Path prefix that triggers signature verification.
pub const CALLBACK_PATH_PREFIX: &str = "/callback/agGame";

/// Maximum buffered request body size (1MB).
///
/// The whole body is held in memory for signing, so oversized bodies are
/// rejected before buffering completes.
pub const MAX_CALLBACK_BODY_SIZE: usize = 1024 * 1024;

/// Required proof-of-origin headers.
pub const MERCHANT_CODE_HEADER: &str = "x-merchant-code";
pub const SIGN_HEADER: &str = "x-sign";
pub const TIMESTAMP_HEADER: &str = "x-timestamp";
pub const NONCE_HEADER: &str = "x-nonce";
pub const CONTENT_PROCESSING_TYPE_HEADER: &str = "x-content-processing-type";

/// The buffered request body, inserted into request extensions for
/// downstream handlers.
///
/// Owns a copy of the body bytes; cloning is cheap and every reader sees
/// the identical bytes, any number of times.
#[derive(Debug, Clone)]
pub struct BufferedBody(Bytes);

impl BufferedBody {
    /// The raw body bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The body decoded as UTF-8 text, invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

/// Layer that applies [`SignatureGate`] with a shared merchant credential.
#[derive(Clone)]
pub struct SignatureGateLayer {
    credential: Arc<MerchantCredential>,
}

impl SignatureGateLayer {
    pub fn new(credential: MerchantCredential) -> Self {
        Self {
            credential: Arc::new(credential),
        }
    }
}

impl<S> tower::Layer<S> for SignatureGateLayer {
    type Service = SignatureGate<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SignatureGate {
            inner,
            credential: self.credential.clone(),
        }
    }
}

/// Signature verification middleware service.
#[derive(Clone)]
pub struct SignatureGate<S> {
    inner: S,
    credential: Arc<MerchantCredential>,
}

impl<S> tower::Service<Request<Body>> for SignatureGate<S>
where
    S: tower::Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let credential = self.credential.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if !req.uri().path().starts_with(CALLBACK_PATH_PREFIX) {
                return inner.call(req).await;
            }

            match verify_request(req, &credential).await {
                Ok(req) => inner.call(req).await,
                Err(err) => {
                    tracing::warn!("callback rejected: {err}");
                    Ok(rejection_response(&err))
                }
            }
        })
    }
}

/// Runs the verification pipeline on a matched request: header extraction,
/// body buffering and signature verification. On success the request is
/// rebuilt around the buffered body, with a [`BufferedBody`] extension for
/// handlers that want the bytes without consuming the stream.
async fn verify_request(
    req: Request<Body>,
    credential: &MerchantCredential,
) -> Result<Request<Body>, CallbackError> {
    let (parts, body) = req.into_parts();

    // Headers first: a missing header short-circuits before the body is read.
    let merchant_code = required_header(&parts.headers, MERCHANT_CODE_HEADER)?;
    let sign = required_header(&parts.headers, SIGN_HEADER)?;
    let timestamp = required_header(&parts.headers, TIMESTAMP_HEADER)?;
    let nonce = required_header(&parts.headers, NONCE_HEADER)?;
    let content_processing_type = required_header(&parts.headers, CONTENT_PROCESSING_TYPE_HEADER)?;

    let bytes = buffer_body(body).await?;

    verify_signature(
        credential,
        &SignatureContext {
            merchant_code,
            sign,
            timestamp,
            nonce,
            content_processing_type,
            body: &bytes,
        },
    )?;

    let mut req = Request::from_parts(parts, Body::from(bytes.clone()));
    req.extensions_mut().insert(BufferedBody(bytes));
    Ok(req)
}

/// Returns the trimmed header value, or fails if the header is absent,
/// not valid UTF-8, or blank.
fn required_header<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
) -> Result<&'a str, CallbackError> {
    let value = headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or("");

    if value.is_empty() {
        return Err(CallbackError::MissingHeader { header: name });
    }
    Ok(value)
}

/// Reads the complete body into memory exactly once, capped at
/// [`MAX_CALLBACK_BODY_SIZE`]. A failed or aborted read yields an error and
/// no partial buffer.
async fn buffer_body(body: Body) -> Result<Bytes, CallbackError> {
    axum::body::to_bytes(body, MAX_CALLBACK_BODY_SIZE)
        .await
        .map_err(|err| {
            if is_length_limit(&err) {
                CallbackError::PayloadTooLarge {
                    limit: MAX_CALLBACK_BODY_SIZE,
                }
            } else {
                CallbackError::BodyRead(err.to_string())
            }
        })
}

/// Walks the error source chain looking for the body length-limit error.
fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.downcast_ref::<http_body_util::LengthLimitError>().is_some() {
            return true;
        }
        source = e.source();
    }
    false
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// Translates a verification failure into the wire response.
fn rejection_response(err: &CallbackError) -> Response {
    let (status, code) = match err {
        CallbackError::MissingHeader { .. } => (StatusCode::BAD_REQUEST, "MISSING_HEADER"),
        CallbackError::InvalidMerchantCode { .. } => {
            (StatusCode::UNAUTHORIZED, "INVALID_MERCHANT_CODE")
        }
        CallbackError::InvalidSignature { .. } => (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE"),
        CallbackError::PayloadTooLarge { .. } => {
            (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE")
        }
        CallbackError::BodyRead(_) => (StatusCode::BAD_REQUEST, "BODY_READ"),
        CallbackError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION"),
    };

    let body = ErrorResponse {
        error: ErrorDetail {
            code,
            message: err.to_string(),
        },
    };

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_required_header_trims_value() {
        let mut headers = HeaderMap::new();
        headers.insert(MERCHANT_CODE_HEADER, HeaderValue::from_static("  M1  "));

        assert_eq!(
            required_header(&headers, MERCHANT_CODE_HEADER).unwrap(),
            "M1"
        );
    }

    #[test]
    fn test_required_header_rejects_absent_and_blank() {
        let mut headers = HeaderMap::new();
        headers.insert(SIGN_HEADER, HeaderValue::from_static("   "));

        let err = required_header(&headers, SIGN_HEADER).unwrap_err();
        assert!(matches!(
            err,
            CallbackError::MissingHeader {
                header: SIGN_HEADER
            }
        ));

        let err = required_header(&headers, NONCE_HEADER).unwrap_err();
        assert!(matches!(
            err,
            CallbackError::MissingHeader {
                header: NONCE_HEADER
            }
        ));
    }

    #[test]
    fn test_buffered_body_rereads_identical_bytes() {
        let buffered = BufferedBody(Bytes::from_static(br#"{"a":1}"#));
        assert_eq!(buffered.as_bytes(), buffered.clone().as_bytes());
        assert_eq!(buffered.text(), r#"{"a":1}"#);
    }

    #[test]
    fn test_rejection_status_mapping() {
        let cases = [
            (
                CallbackError::MissingHeader {
                    header: SIGN_HEADER,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CallbackError::InvalidMerchantCode {
                    supplied: "M2".to_string(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                CallbackError::InvalidSignature {
                    computed: "deadbeef".to_string(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                CallbackError::PayloadTooLarge {
                    limit: MAX_CALLBACK_BODY_SIZE,
                },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                CallbackError::BodyRead("connection reset".to_string()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(rejection_response(&err).status(), expected);
        }
    }
}
