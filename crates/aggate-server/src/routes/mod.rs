//! HTTP route handlers.

pub mod callback;
