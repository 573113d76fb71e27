//! Identity provider implementations.
//!
//! [`LocalIdentityProvider`] authenticates against the credential store and
//! mints tokens with the [`TokenAuthority`]. The remote provider lives in
//! `warden-cognito`.
//!
//! [`TokenAuthority`]: crate::service::TokenAuthority

mod local;

pub use local::LocalIdentityProvider;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which identity provider backs the [`IdentityService`].
///
/// [`IdentityService`]: warden_core::IdentityService
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Credentials stored in PostgreSQL, tokens minted locally.
    #[default]
    Local,
    /// A Cognito-compatible user pool.
    Remote,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn provider_kind_parses_from_snake_case() -> anyhow::Result<()> {
        assert_eq!(ProviderKind::from_str("remote")?, ProviderKind::Remote);
        assert_eq!(ProviderKind::default().to_string(), "local");
        assert!(ProviderKind::from_str("ldap").is_err());
        Ok(())
    }
}
