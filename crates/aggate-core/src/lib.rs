//! Aggate Core Library
//!
//! Shared types and HMAC signature verification for the AG partner
//! callback gate.

pub mod config;
pub mod crypto;
pub mod error;
pub mod verify;

pub use error::{CallbackError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
