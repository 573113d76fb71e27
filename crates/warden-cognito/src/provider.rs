use async_trait::async_trait;
use warden_core::{
    AuthResult, ErrorKind, IdentityProvider, SignUpOutcome, SignUpRequest,
};

use crate::model::AttributeType;
use crate::{CognitoClient, TRACING_TARGET_PROVIDER};

/// Attribute carrying the email address.
const EMAIL_ATTRIBUTE: &str = "email";

/// Remote identity provider.
///
/// The email doubles as the pool username, the same way sign-in looks users
/// up. Role assignment is a local concept and is not forwarded.
#[async_trait]
impl IdentityProvider for CognitoClient {
    fn name(&self) -> &'static str {
        "cognito"
    }

    async fn sign_up(&self, request: SignUpRequest) -> warden_core::Result<SignUpOutcome> {
        if request.role_id.is_some() {
            tracing::debug!(
                target: TRACING_TARGET_PROVIDER,
                "Role ids are not forwarded to the user pool"
            );
        }

        let email = request.email.trim().to_lowercase();
        let mut attributes = vec![AttributeType::new(EMAIL_ATTRIBUTE, email.clone())];
        attributes.extend(
            request
                .attributes
                .into_iter()
                .filter(|(name, _)| name != EMAIL_ATTRIBUTE)
                .map(|(name, value)| AttributeType::new(name, value)),
        );

        let result = CognitoClient::sign_up(self, &email, &request.password, attributes).await?;

        tracing::info!(
            target: TRACING_TARGET_PROVIDER,
            subject = %result.user_sub,
            confirmed = result.user_confirmed,
            "Identity registered with user pool"
        );

        Ok(SignUpOutcome {
            subject: result.user_sub,
            confirmed: result.user_confirmed,
        })
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> warden_core::Result<()> {
        let email = email.trim().to_lowercase();
        CognitoClient::confirm_sign_up(self, &email, code.trim()).await?;
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> warden_core::Result<AuthResult> {
        let email = email.trim().to_lowercase();
        Ok(self.initiate_password_auth(&email, password).await?)
    }

    async fn refresh(&self, refresh_token: &str) -> warden_core::Result<AuthResult> {
        let mut auth = self
            .initiate_refresh_auth(refresh_token)
            .await
            .map_err(|error| match error.kind() {
                ErrorKind::InvalidCredentials => {
                    warden_core::Error::invalid_token("refresh token was rejected")
                        .with_source(error)
                }
                _ => error.into(),
            })?;

        if auth.refresh_token.is_none() && !auth.is_challenge() {
            auth.refresh_token = Some(refresh_token.to_owned());
        }

        Ok(auth)
    }
}
