//! User pool client configuration.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=300;

/// Connection settings for a Cognito-compatible user pool.
///
/// ```rust
/// use warden_cognito::CognitoConfig;
///
/// let config = CognitoConfig::new("3n4b5urk1ft4fl3mg5e62d9ado")
///     .with_region("eu-west-1");
/// config.validate()?;
/// assert_eq!(
///     config.endpoint()?.as_str(),
///     "https://cognito-idp.eu-west-1.amazonaws.com/"
/// );
/// # Ok::<(), warden_cognito::Error>(())
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "configurations must be used to create a client"]
pub struct CognitoConfig {
    /// Region of the user pool
    #[cfg_attr(
        feature = "config",
        arg(
            long = "cognito-region",
            env = "AWS_DEFAULT_REGION",
            default_value = DEFAULT_REGION
        )
    )]
    pub cognito_region: String,

    /// App client id registered with the user pool
    #[cfg_attr(
        feature = "config",
        arg(long = "cognito-client-id", env = "CLIENT_ID", default_value = "")
    )]
    pub cognito_client_id: String,

    /// User pool id, reported in logs only
    #[cfg_attr(
        feature = "config",
        arg(long = "cognito-user-pool-id", env = "USER_POOL_ID")
    )]
    pub cognito_user_pool_id: Option<String>,

    /// Endpoint override, e.g. a local emulator
    #[cfg_attr(
        feature = "config",
        arg(long = "cognito-endpoint", env = "COGNITO_ENDPOINT")
    )]
    pub cognito_endpoint: Option<String>,

    /// Request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "cognito-timeout-secs",
            env = "COGNITO_TIMEOUT_SECS",
            default_value = "10"
        )
    )]
    pub cognito_timeout_secs: u64,
}

impl CognitoConfig {
    /// Creates a configuration for the default region.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            cognito_region: DEFAULT_REGION.to_owned(),
            cognito_client_id: client_id.into(),
            cognito_user_pool_id: None,
            cognito_endpoint: None,
            cognito_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.cognito_region = region.into();
        self
    }

    pub fn with_user_pool_id(mut self, user_pool_id: impl Into<String>) -> Self {
        self.cognito_user_pool_id = Some(user_pool_id.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.cognito_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.cognito_timeout_secs = secs;
        self
    }

    /// Returns the request timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.cognito_timeout_secs)
    }

    /// Returns the service endpoint: the override if set, otherwise the
    /// regional endpoint.
    pub fn endpoint(&self) -> Result<Url> {
        let raw = match &self.cognito_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://cognito-idp.{}.amazonaws.com/", self.cognito_region),
        };

        Url::parse(&raw).map_err(|e| Error::Config(format!("invalid endpoint '{raw}': {e}")))
    }

    /// Checks that the client id, region, endpoint and timeout are usable.
    pub fn validate(&self) -> Result<()> {
        if self.cognito_client_id.trim().is_empty() {
            return Err(Error::Config("client id must not be empty".into()));
        }

        let region_ok = !self.cognito_region.is_empty()
            && self
                .cognito_region
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !region_ok {
            return Err(Error::Config(format!(
                "invalid region '{}'",
                self.cognito_region
            )));
        }

        if !TIMEOUT_RANGE.contains(&self.cognito_timeout_secs) {
            return Err(Error::Config(format!(
                "timeout must be between {} and {} seconds, got {}",
                TIMEOUT_RANGE.start(),
                TIMEOUT_RANGE.end(),
                self.cognito_timeout_secs
            )));
        }

        let endpoint = self.endpoint()?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "endpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for CognitoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CognitoConfig")
            .field("cognito_region", &self.cognito_region)
            .field("cognito_user_pool_id", &self.cognito_user_pool_id)
            .field("cognito_endpoint", &self.cognito_endpoint)
            .field("cognito_timeout_secs", &self.cognito_timeout_secs)
            .finish_non_exhaustive()
    }
}
