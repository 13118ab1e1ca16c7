//! Cryptographic primitives for callback signature verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes HMAC-SHA256 of data with the given key and returns as lowercase
/// hex string.
///
/// A fresh MAC context is constructed on every call, so concurrent requests
/// can share nothing but the key bytes and need no locking.
pub fn hmac_sha256_hex(key: &[u8], data: &[u8]) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    let result = mac.finalize();
    hex::encode(result.into_bytes())
}

/// Constant-time equality comparison.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_sha256_hex_known_vector() {
        // RFC 4231 test case 2
        let computed = hmac_sha256_hex(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            computed,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_hmac_output_is_lowercase() {
        let computed = hmac_sha256_hex(b"key", b"data");
        assert_eq!(computed, computed.to_lowercase());
        assert_eq!(computed.len(), 64);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
