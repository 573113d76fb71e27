use async_trait::async_trait;
use warden_core::{AuthResult, IdentityProvider, SignUpOutcome, SignUpRequest, UserStore};

use crate::Result;
use crate::service::credential::{CreateUser, CredentialService};
use crate::service::token::{TokenAuthority, TokenKind};
use crate::utility::tracing_targets::TRACING_TARGET_LOCAL_PROVIDER as TRACING_TARGET;

/// Identity provider backed by the local credential store.
///
/// Registrations are confirmed immediately and sign-in returns a token pair
/// from the [`TokenAuthority`].
pub struct LocalIdentityProvider<S> {
    credentials: CredentialService<S>,
    tokens: TokenAuthority,
}

impl<S: UserStore> LocalIdentityProvider<S> {
    /// Provider name reported in logs.
    pub const NAME: &'static str = "local";

    pub fn new(credentials: CredentialService<S>, tokens: TokenAuthority) -> Self {
        Self {
            credentials,
            tokens,
        }
    }
}

impl<S> Clone for LocalIdentityProvider<S> {
    fn clone(&self) -> Self {
        Self {
            credentials: self.credentials.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<S> std::fmt::Debug for LocalIdentityProvider<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalIdentityProvider")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<S: UserStore + 'static> IdentityProvider for LocalIdentityProvider<S> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome> {
        let user = self.credentials.create(CreateUser::from(request)).await?;
        Ok(SignUpOutcome {
            subject: user.id.to_string(),
            confirmed: true,
        })
    }

    async fn confirm_sign_up(&self, _email: &str, _code: &str) -> Result<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            "Local registrations need no confirmation"
        );
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResult> {
        let user = self.credentials.authenticate(email, password).await?;
        let pair = self.tokens.issue_token_pair(user.id)?;
        Ok(pair.into())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthResult> {
        let access_token = self.tokens.refresh(refresh_token)?;
        Ok(AuthResult::bearer(
            access_token,
            Some(refresh_token.to_owned()),
            self.tokens.ttl(TokenKind::Access).as_secs(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use warden_core::{ErrorKind, IdentityService};
    use warden_test::MemoryUserStore;

    use super::*;
    use crate::service::security::PasswordHasher;
    use crate::service::token::TokenConfig;

    const SECRET: &str = "local-provider-test-secret-0123456789";

    fn provider(store: MemoryUserStore) -> anyhow::Result<LocalIdentityProvider<MemoryUserStore>> {
        let credentials =
            CredentialService::new(store).with_password_hasher(PasswordHasher::with_params(1024, 1, 1)?);
        let tokens = TokenAuthority::new(&TokenConfig::new(SECRET))?;
        Ok(LocalIdentityProvider::new(credentials, tokens))
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_issues_tokens() -> anyhow::Result<()> {
        let local = provider(MemoryUserStore::new())?;
        let tokens = local.tokens.clone();
        let service = IdentityService::new(local);
        assert_eq!(service.provider_name(), "local");

        let outcome = service
            .sign_up(
                SignUpRequest::new("alice", "alice@example.com", "s3cret!")
                    .with_attribute("name", "Alice"),
            )
            .await?;
        assert!(outcome.confirmed);
        service.confirm_sign_up("alice@example.com", "ignored").await?;

        let auth = service.sign_in("alice@example.com", "s3cret!").await?;
        assert!(!auth.is_challenge());
        assert_eq!(auth.token_type.as_deref(), Some(AuthResult::BEARER));
        assert_eq!(auth.expires_in, Some(900));

        let access = auth.access_token.unwrap_or_default();
        assert_eq!(tokens.validate_token(&access)?.to_string(), outcome.subject);
        Ok(())
    }

    #[tokio::test]
    async fn refresh_keeps_the_refresh_token() -> anyhow::Result<()> {
        let local = provider(MemoryUserStore::new())?;
        local
            .sign_up(SignUpRequest::new("bob", "bob@example.com", "hunter2!"))
            .await?;

        let auth = local.sign_in("bob@example.com", "hunter2!").await?;
        let refresh_token = auth.refresh_token.unwrap_or_default();

        let refreshed = local.refresh(&refresh_token).await?;
        assert_eq!(refreshed.refresh_token.as_deref(), Some(refresh_token.as_str()));
        let access = refreshed.access_token.unwrap_or_default();
        local.tokens.validate_token(&access)?;
        Ok(())
    }

    #[tokio::test]
    async fn bad_credentials_and_tokens_are_rejected() -> anyhow::Result<()> {
        let local = provider(MemoryUserStore::new())?;
        local
            .sign_up(SignUpRequest::new("carol", "carol@example.com", "pw"))
            .await?;

        let err = local.sign_in("carol@example.com", "nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);

        let err = local.refresh("not-a-token").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidToken);

        let err = local
            .sign_up(SignUpRequest::new("carol2", "carol@example.com", "pw"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        Ok(())
    }
}
