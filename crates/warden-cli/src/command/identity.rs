use anyhow::Context;
use clap::Args;
use warden_core::{IdentityService, SignUpRequest};
use warden_server::service::{ProviderKind, ServiceState, TokenAuthority, TokenConfig};

use super::print_json;
use crate::TRACING_TARGET_COMMAND;
use crate::config::ServiceArgs;

/// Registers a user through the configured identity provider.
#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    #[clap(flatten)]
    pub service: ServiceArgs,

    /// Unique login name
    #[arg(long)]
    pub username: String,

    /// Unique email address
    #[arg(long)]
    pub email: String,

    /// Plaintext password
    #[arg(long)]
    pub password: String,

    /// Role to assign (local provider only)
    #[arg(long = "role-id")]
    pub role_id: Option<i64>,

    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Phone number
    #[arg(long = "phone-number")]
    pub phone_number: Option<String>,
}

impl RegisterArgs {
    pub async fn execute(self) -> anyhow::Result<()> {
        let config = self.service.service_config()?;
        let state = match config.provider {
            ProviderKind::Local => Some(
                ServiceState::from_config(&config)
                    .await
                    .context("failed to create service state")?,
            ),
            ProviderKind::Remote => None,
        };
        let identity = match &state {
            Some(state) => state.identity.clone(),
            None => identity_service(&self.service).await?,
        };

        let mut request = SignUpRequest::new(self.username, self.email, self.password);
        if let Some(role_id) = self.role_id {
            request = request.with_role(role_id);
        }
        let attributes = [
            ("name", self.name),
            ("address", self.address),
            ("phone_number", self.phone_number),
        ];
        for (attribute, value) in attributes {
            if let Some(value) = value {
                request = request.with_attribute(attribute, value);
            }
        }

        let outcome = identity
            .sign_up(request)
            .await
            .context("registration failed")?;

        tracing::info!(
            target: TRACING_TARGET_COMMAND,
            subject = %outcome.subject,
            confirmed = outcome.confirmed,
            "User registered"
        );

        match (state, outcome.subject.parse::<uuid::Uuid>()) {
            (Some(state), Ok(user_id)) if outcome.confirmed => {
                let user = state.credentials.find_by_id(user_id).await?;
                print_json(&user.view())
            }
            _ => print_json(&outcome),
        }
    }
}

/// Signs in through the configured identity provider.
#[derive(Debug, Clone, Args)]
pub struct LoginArgs {
    #[clap(flatten)]
    pub service: ServiceArgs,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,
}

impl LoginArgs {
    pub async fn execute(self) -> anyhow::Result<()> {
        let identity = identity_service(&self.service).await?;
        let auth = identity
            .sign_in(&self.email, &self.password)
            .await
            .context("sign-in failed")?;

        print_json(&auth)
    }
}

/// Exchanges a refresh token for a new access token.
#[derive(Debug, Clone, Args)]
pub struct RefreshArgs {
    #[clap(flatten)]
    pub service: ServiceArgs,

    /// Refresh token issued at sign-in
    #[arg(long, env = "REFRESH_TOKEN")]
    pub token: String,
}

impl RefreshArgs {
    pub async fn execute(self) -> anyhow::Result<()> {
        let identity = identity_service(&self.service).await?;
        let auth = identity
            .refresh(&self.token)
            .await
            .context("refresh failed")?;

        print_json(&auth)
    }
}

/// Validates a locally issued token without touching the database.
#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    #[clap(flatten)]
    pub token_config: TokenConfig,

    /// Access or refresh token to validate
    #[arg(long, env = "ACCESS_TOKEN")]
    pub token: String,
}

impl VerifyArgs {
    pub fn execute(self) -> anyhow::Result<()> {
        let authority =
            TokenAuthority::new(&self.token_config).context("invalid token configuration")?;
        let subject = authority
            .validate_token(&self.token)
            .context("token rejected")?;

        println!("{subject}");
        Ok(())
    }
}

async fn identity_service(args: &ServiceArgs) -> anyhow::Result<IdentityService> {
    let config = args.service_config()?;
    config
        .create_identity_service()
        .await
        .context("failed to create identity service")
}
