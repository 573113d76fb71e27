//! Pluggable identity provider.
//!
//! An [`IdentityProvider`] implements sign-up, confirmation, sign-in and token
//! refresh. Warden ships a local, store-backed provider and a remote one that
//! delegates to a hosted user pool; [`IdentityService`] wraps either behind an
//! `Arc` and adds tracing.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::user::RoleId;
use crate::{Result, TRACING_TARGET_PROVIDER};

/// Placeholder printed instead of secret material.
const REDACTED: &str = "<redacted>";

/// Outcome of a sign-in or refresh.
///
/// Either carries tokens, or, when the provider needs another step such as a
/// multi-factor code, the challenge name, session and parameters.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub challenge_parameters: HashMap<String, String>,
}

impl AuthResult {
    /// Token type reported for bearer tokens.
    pub const BEARER: &'static str = "Bearer";

    /// Creates a result carrying bearer tokens.
    pub fn bearer(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in: i64,
    ) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token,
            token_type: Some(Self::BEARER.to_owned()),
            expires_in: Some(expires_in),
            ..Default::default()
        }
    }

    /// Creates a result asking the caller to answer a challenge.
    pub fn challenge(
        challenge_name: impl Into<String>,
        session: Option<String>,
        challenge_parameters: HashMap<String, String>,
    ) -> Self {
        Self {
            challenge_name: Some(challenge_name.into()),
            session,
            challenge_parameters,
            ..Default::default()
        }
    }

    /// Returns whether the provider asked for another authentication step.
    #[inline]
    pub fn is_challenge(&self) -> bool {
        self.challenge_name.is_some()
    }
}

impl fmt::Debug for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |token: &Option<String>| token.as_ref().map(|_| REDACTED);
        f.debug_struct("AuthResult")
            .field("access_token", &mask(&self.access_token))
            .field("id_token", &mask(&self.id_token))
            .field("refresh_token", &mask(&self.refresh_token))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("challenge_name", &self.challenge_name)
            .field("session", &mask(&self.session))
            .finish_non_exhaustive()
    }
}

/// Registration input handed to a provider.
#[derive(Clone)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role_id: Option<RoleId>,
    /// Extra profile attributes, such as `name` or `phone_number`.
    pub attributes: BTreeMap<String, String>,
}

impl SignUpRequest {
    /// Creates a request without role or attributes.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role_id: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Sets the role reference.
    pub fn with_role(mut self, role_id: RoleId) -> Self {
        self.role_id = Some(role_id);
        self
    }

    /// Adds a profile attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .field("role_id", &self.role_id)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Result of a successful sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpOutcome {
    /// Provider-assigned subject of the new identity.
    pub subject: String,
    /// Whether the identity can sign in right away.
    pub confirmed: bool,
}

/// Sign-up, confirmation, sign-in and refresh strategy.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Registers a new identity.
    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome>;

    /// Confirms a pending registration with the code sent to the user.
    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()>;

    /// Authenticates with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResult>;

    /// Exchanges a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<AuthResult>;
}

/// Identity provider wrapper with observability.
///
/// The inner provider is wrapped in `Arc` for cheap cloning.
#[derive(Clone)]
pub struct IdentityService {
    inner: Arc<dyn IdentityProvider>,
}

impl IdentityService {
    /// Creates a new identity service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: IdentityProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Returns the name of the wrapped provider.
    #[inline]
    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }

    /// Registers a new identity.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome> {
        let start = Instant::now();
        tracing::debug!(
            target: TRACING_TARGET_PROVIDER,
            provider = self.provider_name(),
            email = %request.email,
            "Signing up identity"
        );

        let result = self.inner.sign_up(request).await;
        self.log_outcome("sign_up", start, &result);
        result
    }

    /// Confirms a pending registration.
    pub async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()> {
        let start = Instant::now();
        let result = self.inner.confirm_sign_up(email, code).await;
        self.log_outcome("confirm_sign_up", start, &result);
        result
    }

    /// Authenticates with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResult> {
        let start = Instant::now();
        let result = self.inner.sign_in(email, password).await;
        self.log_outcome("sign_in", start, &result);

        if let Ok(auth) = &result
            && auth.is_challenge()
        {
            tracing::info!(
                target: TRACING_TARGET_PROVIDER,
                provider = self.provider_name(),
                challenge = ?auth.challenge_name,
                "Sign-in requires a challenge response"
            );
        }

        result
    }

    /// Exchanges a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResult> {
        let start = Instant::now();
        let result = self.inner.refresh(refresh_token).await;
        self.log_outcome("refresh", start, &result);
        result
    }

    fn log_outcome<T>(&self, operation: &'static str, start: Instant, result: &Result<T>) {
        let elapsed = start.elapsed();
        match result {
            Ok(_) => {
                tracing::debug!(
                    target: TRACING_TARGET_PROVIDER,
                    provider = self.provider_name(),
                    operation,
                    elapsed_ms = elapsed.as_millis(),
                    "Identity provider call succeeded"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_PROVIDER,
                    provider = self.provider_name(),
                    operation,
                    kind = %error.kind(),
                    elapsed_ms = elapsed.as_millis(),
                    "Identity provider call failed"
                );
            }
        }
    }
}

impl fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityService")
            .field("provider", &self.provider_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ErrorKind};

    struct FixedProvider;

    #[async_trait]
    impl IdentityProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome> {
            Ok(SignUpOutcome {
                subject: request.username,
                confirmed: false,
            })
        }

        async fn confirm_sign_up(&self, _email: &str, code: &str) -> Result<()> {
            if code == "123456" {
                Ok(())
            } else {
                Err(Error::validation("confirmation code mismatch"))
            }
        }

        async fn sign_in(&self, _email: &str, password: &str) -> Result<AuthResult> {
            match password {
                "mfa" => Ok(AuthResult::challenge(
                    "SOFTWARE_TOKEN_MFA",
                    Some("session-1".to_owned()),
                    HashMap::new(),
                )),
                "s3cret!" => Ok(AuthResult::bearer("access", Some("refresh".to_owned()), 900)),
                _ => Err(Error::invalid_credentials()),
            }
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<AuthResult> {
            Ok(AuthResult::bearer("access-2", None, 900))
        }
    }

    #[tokio::test]
    async fn service_delegates_to_provider() -> anyhow::Result<()> {
        let service = IdentityService::new(FixedProvider);
        assert_eq!(service.provider_name(), "fixed");

        let outcome = service
            .sign_up(SignUpRequest::new("alice", "alice@example.com", "s3cret!"))
            .await?;
        assert_eq!(outcome.subject, "alice");
        assert!(!outcome.confirmed);

        service.confirm_sign_up("alice@example.com", "123456").await?;
        let err = service
            .confirm_sign_up("alice@example.com", "000000")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let auth = service.sign_in("alice@example.com", "s3cret!").await?;
        assert_eq!(auth.token_type.as_deref(), Some(AuthResult::BEARER));
        assert!(!auth.is_challenge());

        let challenge = service.sign_in("alice@example.com", "mfa").await?;
        assert!(challenge.is_challenge());
        assert!(challenge.access_token.is_none());
        Ok(())
    }

    #[test]
    fn auth_result_skips_empty_fields() -> anyhow::Result<()> {
        let auth = AuthResult::bearer("access", None, 900);
        let json = serde_json::to_value(&auth)?;

        assert_eq!(json["access_token"], "access");
        assert_eq!(json["expires_in"], 900);
        assert!(json.get("refresh_token").is_none());
        assert!(json.get("challenge_parameters").is_none());
        Ok(())
    }

    #[test]
    fn debug_output_hides_tokens_and_passwords() {
        let auth = AuthResult::bearer("very-secret-access", Some("very-secret-refresh".into()), 900);
        let debug = format!("{auth:?}");
        assert!(!debug.contains("very-secret"));

        let request = SignUpRequest::new("alice", "alice@example.com", "hunter22");
        assert!(!format!("{request:?}").contains("hunter22"));
    }
}
