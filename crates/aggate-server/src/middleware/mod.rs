//! Request middleware.

pub mod signature_gate;

pub use signature_gate::{
    BufferedBody, SignatureGate, SignatureGateLayer, CALLBACK_PATH_PREFIX, MAX_CALLBACK_BODY_SIZE,
};
