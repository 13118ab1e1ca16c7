//! Error types for the aggate core library.

use thiserror::Error;

/// Core error type for callback verification.
///
/// All per-request variants are terminal: the request is rejected and
/// never retried. [`CallbackError::Configuration`] is fatal at boot.
#[derive(Error, Debug)]
pub enum CallbackError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("header {header} is required")]
    MissingHeader { header: &'static str },

    #[error("merchant code is invalid: {supplied}")]
    InvalidMerchantCode { supplied: String },

    #[error("sign is invalid: {computed}")]
    InvalidSignature { computed: String },

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
}

/// Result type alias for callback verification.
pub type Result<T> = std::result::Result<T, CallbackError>;
