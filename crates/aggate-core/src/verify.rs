//! Callback signature verification.
//!
//! Verification is a pure function of the configured credential and the
//! per-request proof fields; no state persists across requests.

use crate::config::MerchantCredential;
use crate::crypto::{constant_time_eq, hmac_sha256_hex};
use crate::error::{CallbackError, Result};

/// The per-request proof-of-origin fields, borrowed from the incoming
/// request. Constructed once per request and discarded after verification.
#[derive(Debug, Clone, Copy)]
pub struct SignatureContext<'a> {
    pub merchant_code: &'a str,
    pub sign: &'a str,
    pub timestamp: &'a str,
    pub nonce: &'a str,
    pub content_processing_type: &'a str,
    pub body: &'a [u8],
}

impl SignatureContext<'_> {
    /// Builds the canonical signing string: merchant code, timestamp, nonce,
    /// content processing type and body text concatenated in that order with
    /// no delimiters.
    fn canonical_string(&self) -> String {
        let body = String::from_utf8_lossy(self.body);
        let mut data = String::with_capacity(
            self.merchant_code.len()
                + self.timestamp.len()
                + self.nonce.len()
                + self.content_processing_type.len()
                + body.len(),
        );
        data.push_str(self.merchant_code);
        data.push_str(self.timestamp);
        data.push_str(self.nonce);
        data.push_str(self.content_processing_type);
        data.push_str(&body);
        data
    }
}

/// Verifies a callback signature against the configured credential.
///
/// The supplied merchant code is checked first; a mismatch fails before any
/// digest work. The signature comparison is constant-time and exact on the
/// lowercase hex encoding, so an uppercase rendition of the correct digest
/// is rejected.
pub fn verify_signature(credential: &MerchantCredential, ctx: &SignatureContext<'_>) -> Result<()> {
    if ctx.merchant_code != credential.code() {
        return Err(CallbackError::InvalidMerchantCode {
            supplied: ctx.merchant_code.to_string(),
        });
    }

    let computed = hmac_sha256_hex(
        credential.secret_bytes(),
        ctx.canonical_string().as_bytes(),
    );
    if !constant_time_eq(computed.as_bytes(), ctx.sign.as_bytes()) {
        return Err(CallbackError::InvalidSignature { computed });
    }

    tracing::info!("sign verify success");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMESTAMP: &str = "1700000000";
    const NONCE: &str = "abc123";
    const CPT: &str = "json";
    const BODY: &[u8] = br#"{"a":1}"#;

    fn credential() -> MerchantCredential {
        MerchantCredential::new("M1", "topsecret").unwrap()
    }

    fn context<'a>(sign: &'a str) -> SignatureContext<'a> {
        SignatureContext {
            merchant_code: "M1",
            sign,
            timestamp: TIMESTAMP,
            nonce: NONCE,
            content_processing_type: CPT,
            body: BODY,
        }
    }

    fn valid_sign() -> String {
        hmac_sha256_hex(b"topsecret", br#"M11700000000abc123json{"a":1}"#)
    }

    #[test]
    fn test_canonical_string_has_no_delimiters() {
        let ctx = context("");
        assert_eq!(ctx.canonical_string(), r#"M11700000000abc123json{"a":1}"#);
    }

    #[test]
    fn test_valid_signature_passes() {
        let sign = valid_sign();
        assert!(verify_signature(&credential(), &context(&sign)).is_ok());
    }

    #[test]
    fn test_body_mutation_fails() {
        let sign = valid_sign();
        let mut ctx = context(&sign);
        ctx.body = br#"{"a":2}"#;

        let err = verify_signature(&credential(), &ctx).unwrap_err();
        assert!(matches!(err, CallbackError::InvalidSignature { .. }));
    }

    #[test]
    fn test_changed_nonce_fails_with_same_sign() {
        let sign = valid_sign();
        let mut ctx = context(&sign);
        ctx.nonce = "abc124";

        let err = verify_signature(&credential(), &ctx).unwrap_err();
        assert!(matches!(err, CallbackError::InvalidSignature { .. }));
    }

    #[test]
    fn test_uppercase_hex_fails() {
        let sign = valid_sign().to_uppercase();
        let err = verify_signature(&credential(), &context(&sign)).unwrap_err();
        assert!(matches!(err, CallbackError::InvalidSignature { .. }));
    }

    #[test]
    fn test_error_carries_computed_digest() {
        let err = verify_signature(&credential(), &context("bogus")).unwrap_err();
        match err {
            CallbackError::InvalidSignature { computed } => {
                assert_eq!(computed, valid_sign());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_wrong_merchant_code_short_circuits() {
        let sign = valid_sign();
        let mut ctx = context(&sign);
        ctx.merchant_code = "M2";

        let err = verify_signature(&credential(), &ctx).unwrap_err();
        match err {
            CallbackError::InvalidMerchantCode { supplied } => assert_eq!(supplied, "M2"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
