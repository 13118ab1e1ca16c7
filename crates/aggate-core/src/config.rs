//! Merchant credential configuration.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{CallbackError, Result};

/// Environment variable holding the merchant code.
pub const MERCHANT_CODE_ENV: &str = "AGGATE_MERCHANT_CODE";

/// Environment variable holding the merchant secret.
pub const MERCHANT_SECRET_ENV: &str = "AGGATE_MERCHANT_SECRET";

/// The (code, secret) pair identifying and authenticating the calling
/// partner.
///
/// Loaded once at startup and shared read-only for the process lifetime;
/// nothing in the verification pipeline mutates it. The secret is wrapped
/// in [`SecretString`] so it never appears in debug output or logs.
#[derive(Debug, Clone)]
pub struct MerchantCredential {
    code: String,
    secret: SecretString,
}

impl MerchantCredential {
    /// Creates a credential, rejecting blank values.
    pub fn new(code: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        let code = code.into();
        let secret = secret.into();

        if code.trim().is_empty() {
            return Err(CallbackError::Configuration(
                "merchant code must not be blank".to_string(),
            ));
        }
        if secret.trim().is_empty() {
            return Err(CallbackError::Configuration(
                "merchant secret must not be blank".to_string(),
            ));
        }

        Ok(Self {
            code,
            secret: SecretString::from(secret),
        })
    }

    /// Loads the credential from environment variables.
    pub fn from_env() -> Result<Self> {
        let code = std::env::var(MERCHANT_CODE_ENV)
            .map_err(|_| CallbackError::Configuration(format!("{MERCHANT_CODE_ENV} is not set")))?;
        let secret = std::env::var(MERCHANT_SECRET_ENV).map_err(|_| {
            CallbackError::Configuration(format!("{MERCHANT_SECRET_ENV} is not set"))
        })?;

        Self::new(code, secret)
    }

    /// The configured merchant code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The secret key bytes, exposed for digest computation only.
    pub(crate) fn secret_bytes(&self) -> &[u8] {
        self.secret.expose_secret().as_bytes()
    }
}
