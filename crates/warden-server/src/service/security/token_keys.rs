//! HMAC signing secret for access and refresh tokens.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::utility::tracing_targets::TRACING_TARGET_TOKEN_KEYS as TRACING_TARGET;
use crate::{Error, Result};

/// Minimum secret length in bytes for HS256.
pub const MIN_SECRET_LEN: usize = 32;

/// Process-wide token signing secret.
///
/// Cloning is cheap. Rotating the secret invalidates every outstanding
/// token; there is no overlap window.
#[derive(Clone)]
pub struct TokenKeys {
    inner: Arc<TokenKeysInner>,
}

struct TokenKeysInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenKeys {
    /// Signing algorithm used for every token.
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Creates keys from a raw shared secret.
    ///
    /// Fails with [`ErrorKind::Config`] if the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes.
    ///
    /// [`ErrorKind::Config`]: crate::ErrorKind::Config
    pub fn from_secret(secret: &[u8]) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::config(format!(
                "token secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        let inner = TokenKeysInner {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        };

        tracing::debug!(target: TRACING_TARGET, "Token signing keys loaded");

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the key used to sign tokens.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Returns the key used to verify tokens.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    /// Signs and verifies a throwaway token to prove the keys work.
    pub fn validate_keys(&self) -> Result<()> {
        #[derive(Serialize, Deserialize)]
        struct Probe {
            sub: String,
            exp: i64,
        }

        let probe = Probe {
            sub: "warden:probe".to_owned(),
            exp: jiff::Timestamp::now().as_second() + 60,
        };

        let token = encode(&Header::new(Self::ALGORITHM), &probe, self.encoding_key())
            .map_err(|e| {
                tracing::error!(target: TRACING_TARGET, error = %e, "Key self-check failed to sign");
                Error::config("token signing key self-check failed").with_source(e)
            })?;

        decode::<Probe>(&token, self.decoding_key(), &Validation::new(Self::ALGORITHM))
            .map_err(|e| {
                tracing::error!(target: TRACING_TARGET, error = %e, "Key self-check failed to verify");
                Error::config("token signing key self-check failed").with_source(e)
            })?;

        Ok(())
    }
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys")
            .field("algorithm", &Self::ALGORITHM)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn short_secret_is_rejected() {
        let err = TokenKeys::from_secret(b"too-short").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn keys_pass_self_check() -> anyhow::Result<()> {
        let keys = TokenKeys::from_secret(SECRET)?;
        keys.validate_keys()?;
        assert!(!format!("{keys:?}").contains("0123456789"));
        Ok(())
    }
}
