//! Token signing and lifetime configuration.

use std::fmt;

#[cfg(feature = "config")]
use clap::Args;
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::service::security::{MIN_SECRET_LEN, TokenKeys};
use crate::{Error, Result};

/// Default values for token configuration.
mod defaults {
    /// Default `iss` claim.
    pub const ISSUER: &str = "warden";
    /// Default `aud` claim.
    pub const AUDIENCE: &str = "warden:api";
    /// Access tokens live for 15 minutes.
    pub const ACCESS_TOKEN_TTL_SECS: u64 = 15 * 60;
    /// Refresh tokens live for 7 days.
    pub const REFRESH_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

    pub fn issuer() -> String {
        ISSUER.to_owned()
    }

    pub fn audience() -> String {
        AUDIENCE.to_owned()
    }

    pub const fn access_token_ttl_secs() -> u64 {
        ACCESS_TOKEN_TTL_SECS
    }

    pub const fn refresh_token_ttl_secs() -> u64 {
        REFRESH_TOKEN_TTL_SECS
    }
}

/// Configuration of the [`TokenAuthority`].
///
/// [`TokenAuthority`]: super::TokenAuthority
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct TokenConfig {
    /// Shared HS256 signing secret (at least 32 bytes)
    #[cfg_attr(feature = "config", arg(long = "token-secret", env = "TOKEN_SECRET"))]
    #[serde(skip_serializing, default)]
    pub token_secret: String,

    /// Issuer (`iss`) written into and required from every token
    #[cfg_attr(
        feature = "config",
        arg(long = "token-issuer", env = "TOKEN_ISSUER", default_value = defaults::ISSUER)
    )]
    #[serde(default = "defaults::issuer")]
    pub token_issuer: String,

    /// Audience (`aud`) written into and required from every token
    #[cfg_attr(
        feature = "config",
        arg(long = "token-audience", env = "TOKEN_AUDIENCE", default_value = defaults::AUDIENCE)
    )]
    #[serde(default = "defaults::audience")]
    pub token_audience: String,

    /// Access token lifetime in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "access-token-ttl-secs",
            env = "ACCESS_TOKEN_TTL_SECS",
            default_value_t = defaults::ACCESS_TOKEN_TTL_SECS
        )
    )]
    #[serde(default = "defaults::access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,

    /// Refresh token lifetime in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "refresh-token-ttl-secs",
            env = "REFRESH_TOKEN_TTL_SECS",
            default_value_t = defaults::REFRESH_TOKEN_TTL_SECS
        )
    )]
    #[serde(default = "defaults::refresh_token_ttl_secs")]
    pub refresh_token_ttl_secs: u64,
}

impl TokenConfig {
    /// Creates a configuration with default issuer, audience and lifetimes.
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            token_issuer: defaults::issuer(),
            token_audience: defaults::audience(),
            access_token_ttl_secs: defaults::ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: defaults::REFRESH_TOKEN_TTL_SECS,
        }
    }

    /// Sets the issuer claim.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.token_issuer = issuer.into();
        self
    }

    /// Sets the audience claim.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.token_audience = audience.into();
        self
    }

    /// Sets the access token lifetime.
    pub fn with_access_token_ttl_secs(mut self, secs: u64) -> Self {
        self.access_token_ttl_secs = secs;
        self
    }

    /// Sets the refresh token lifetime.
    pub fn with_refresh_token_ttl_secs(mut self, secs: u64) -> Self {
        self.refresh_token_ttl_secs = secs;
        self
    }

    /// Returns the access token lifetime.
    #[inline]
    pub fn access_token_ttl(&self) -> SignedDuration {
        SignedDuration::from_secs(self.access_token_ttl_secs as i64)
    }

    /// Returns the refresh token lifetime.
    #[inline]
    pub fn refresh_token_ttl(&self) -> SignedDuration {
        SignedDuration::from_secs(self.refresh_token_ttl_secs as i64)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`] if the secret is shorter than
    /// [`MIN_SECRET_LEN`] or if [`validate_claim_settings`] fails.
    ///
    /// [`ErrorKind::Config`]: crate::ErrorKind::Config
    /// [`validate_claim_settings`]: TokenConfig::validate_claim_settings
    pub fn validate(&self) -> Result<()> {
        if self.token_secret.len() < MIN_SECRET_LEN {
            return Err(Error::config(format!(
                "token_secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        self.validate_claim_settings()
    }

    /// Validates everything except the secret: issuer, audience and
    /// lifetimes.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`] if the issuer or audience is blank, if
    /// a lifetime does not fit a signed 64-bit second count, or if the
    /// refresh lifetime does not exceed the access lifetime.
    ///
    /// [`ErrorKind::Config`]: crate::ErrorKind::Config
    pub fn validate_claim_settings(&self) -> Result<()> {
        if self.token_issuer.trim().is_empty() {
            return Err(Error::config("token_issuer cannot be empty"));
        }
        if self.token_audience.trim().is_empty() {
            return Err(Error::config("token_audience cannot be empty"));
        }
        if self.access_token_ttl_secs == 0 || self.access_token_ttl_secs > i64::MAX as u64 {
            return Err(Error::config("access_token_ttl_secs must be positive"));
        }
        if self.refresh_token_ttl_secs > i64::MAX as u64 {
            return Err(Error::config("refresh_token_ttl_secs is out of range"));
        }
        if self.refresh_token_ttl_secs <= self.access_token_ttl_secs {
            return Err(Error::config(
                "refresh_token_ttl_secs must exceed access_token_ttl_secs",
            ));
        }
        Ok(())
    }

    /// Validates the configuration and loads the signing keys.
    pub fn load_keys(&self) -> Result<TokenKeys> {
        self.validate()?;
        let keys = TokenKeys::from_secret(self.token_secret.as_bytes())?;
        keys.validate_keys()?;
        Ok(keys)
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("token_secret", &"<redacted>")
            .field("token_issuer", &self.token_issuer)
            .field("token_audience", &self.token_audience)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn defaults_match_token_policy() -> anyhow::Result<()> {
        let config = TokenConfig::new(SECRET);
        config.validate()?;

        assert_eq!(config.access_token_ttl(), SignedDuration::from_mins(15));
        assert_eq!(config.refresh_token_ttl(), SignedDuration::from_hours(7 * 24));
        Ok(())
    }

    #[test]
    fn invalid_settings_are_config_errors() {
        let cases = [
            TokenConfig::new("short"),
            TokenConfig::new(SECRET).with_issuer(" "),
            TokenConfig::new(SECRET).with_access_token_ttl_secs(0),
            TokenConfig::new(SECRET)
                .with_access_token_ttl_secs(3600)
                .with_refresh_token_ttl_secs(60),
        ];

        for config in cases {
            let err = config.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "{config:?}");
        }
    }

    #[test]
    fn debug_hides_secret() {
        let config = TokenConfig::new(SECRET);
        assert!(!format!("{config:?}").contains(SECRET));
    }
}
