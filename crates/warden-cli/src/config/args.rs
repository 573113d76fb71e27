use anyhow::Context;
use clap::Args;
use warden_cognito::CognitoConfig;
use warden_postgres::{PgClient, PgClientMigrationExt, PgConfig};
use warden_server::service::{ProviderKind, ServiceConfig, TokenConfig};

use crate::TRACING_TARGET_CONFIG;

/// Database settings for commands that only touch storage.
#[derive(Debug, Clone, Args)]
pub struct DatabaseArgs {
    #[clap(flatten)]
    pub postgres_config: PgConfig,
}

impl DatabaseArgs {
    /// Builds the pool and applies pending migrations.
    pub async fn connect(&self) -> anyhow::Result<PgClient> {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            database_url = %self.postgres_config.database_url_masked(),
            max_connections = self.postgres_config.postgres_max_connections,
            "Connecting to database"
        );

        let client = self
            .postgres_config
            .clone()
            .build()
            .context("invalid database configuration")?;

        client
            .run_pending_migrations()
            .await
            .context("failed to apply database migrations")?;

        Ok(client)
    }
}

/// Full service settings for commands that register or authenticate.
#[derive(Debug, Clone, Args)]
pub struct ServiceArgs {
    /// Identity provider backing sign-up, sign-in and refresh
    #[arg(
        long = "provider",
        env = "IDENTITY_PROVIDER",
        value_enum,
        default_value_t = ProviderKind::Local
    )]
    pub provider: ProviderKind,

    /// Minimum zxcvbn score (0-4) for new passwords; 0 disables the check
    #[arg(
        long = "min-password-score",
        env = "MIN_PASSWORD_SCORE",
        default_value_t = 0
    )]
    pub min_password_score: u8,

    /// Required for the local provider only
    #[clap(flatten)]
    pub postgres_config: Option<PgConfig>,

    #[clap(flatten)]
    pub token_config: TokenConfig,

    #[clap(flatten)]
    pub cognito_config: CognitoConfig,
}

impl ServiceArgs {
    /// Assembles and validates the service configuration.
    pub fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        let mut builder = ServiceConfig::builder()
            .with_provider(self.provider)
            .with_token_config(self.token_config.clone())
            .with_min_password_score(self.min_password_score);

        if let Some(postgres_config) = &self.postgres_config {
            builder = builder.with_postgres_config(postgres_config.clone());
        }

        if self.provider == ProviderKind::Remote {
            builder = builder.with_cognito_config(self.cognito_config.clone());
        }

        builder.build().context("invalid service configuration")
    }
}
