//! Aggate server library.
//!
//! This library exposes the signature gate middleware and route handlers
//! for use in integration tests.

pub mod middleware;
pub mod routes;

pub use middleware::{BufferedBody, SignatureGateLayer, CALLBACK_PATH_PREFIX};

// Re-export aggate_core for convenience
pub use aggate_core;

// Test utilities are available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
