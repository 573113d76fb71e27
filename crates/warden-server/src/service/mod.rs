//! Service layer: credentials, tokens, identity providers and their wiring.

mod config;
mod credential;
mod provider;
mod security;
mod store;
mod token;

use warden_core::IdentityService;
use warden_postgres::PgClient;

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::credential::{CreateUser, CredentialService};
pub use crate::service::provider::{LocalIdentityProvider, ProviderKind};
pub use crate::service::security::validation;
pub use crate::service::security::{
    MAX_PASSWORD_SCORE, MIN_SECRET_LEN, PasswordHasher, PasswordStrength, PasswordStrengthResult,
    TokenKeys,
};
pub use crate::service::store::PgUserStore;
pub use crate::service::token::{TokenAuthority, TokenClaims, TokenConfig, TokenKind, TokenPair};
use crate::utility::tracing_targets::TRACING_TARGET_CONFIG;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Everything an outer layer needs, built once at startup and cloned
/// cheaply into each request.
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    // External services:
    pub postgres: PgClient,
    pub user_store: PgUserStore,

    // Internal services:
    pub credentials: CredentialService<PgUserStore>,
    pub tokens: TokenAuthority,
    pub identity: IdentityService,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to the database, applies migrations, loads the signing keys
    /// and selects the identity provider. The database is required even with
    /// the remote provider; use [`ServiceConfig::create_identity_service`]
    /// when only the identity service is needed.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let postgres = config.connect_postgres().await?;
        let user_store = PgUserStore::new(postgres.clone());

        let credentials = CredentialService::new(user_store.clone())
            .with_password_strength(config.password_strength());
        let tokens = config.create_token_authority()?;

        let identity = match config.provider {
            ProviderKind::Local => IdentityService::new(LocalIdentityProvider::new(
                credentials.clone(),
                tokens.clone(),
            )),
            ProviderKind::Remote => IdentityService::new(config.create_cognito_client()?),
        };

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            provider = identity.provider_name(),
            min_password_score = config.min_password_score,
            "Service state initialized"
        );

        Ok(Self {
            postgres,
            user_store,
            credentials,
            tokens,
            identity,
        })
    }
}
