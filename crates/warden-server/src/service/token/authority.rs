//! Issuing and validating HS256 tokens.

use std::fmt;
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use warden_core::AuthResult;

use super::{TokenClaims, TokenConfig};
use crate::service::security::TokenKeys;
use crate::utility::tracing_targets::TRACING_TARGET_TOKEN as TRACING_TARGET;
use crate::{Error, Result};

/// Which lifetime a token is issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived token presented on every call.
    Access,
    /// Long-lived token exchanged for new access tokens.
    Refresh,
}

/// Access and refresh token issued together at sign-in.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

impl From<TokenPair> for AuthResult {
    fn from(pair: TokenPair) -> Self {
        AuthResult::bearer(pair.access_token, Some(pair.refresh_token), pair.expires_in)
    }
}

/// Mints and validates signed, expiring tokens bound to a user id.
///
/// Stateless apart from the signing keys: tokens are never stored and
/// cannot be revoked before they expire. Cloning is cheap.
///
/// ```rust
/// use warden_server::service::{TokenAuthority, TokenConfig};
/// # fn main() -> warden_server::Result<()> {
/// let authority = TokenAuthority::new(&TokenConfig::new("0123456789abcdef0123456789abcdef"))?;
/// let subject = uuid::Uuid::new_v4();
///
/// let token = authority.issue_access_token(subject)?;
/// assert_eq!(authority.validate_token(&token)?, subject);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TokenAuthority {
    inner: Arc<TokenAuthorityInner>,
}

struct TokenAuthorityInner {
    keys: TokenKeys,
    issuer: String,
    audience: String,
    access_ttl: SignedDuration,
    refresh_ttl: SignedDuration,
    validation: Validation,
}

impl TokenAuthority {
    /// Validates the configuration, loads the keys and builds an authority.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`] if the configuration is invalid or the
    /// keys fail their sign and verify round trip.
    ///
    /// [`ErrorKind::Config`]: crate::ErrorKind::Config
    pub fn new(config: &TokenConfig) -> Result<Self> {
        let keys = config.load_keys()?;
        Self::with_keys(config, keys)
    }

    /// Builds an authority around already loaded keys.
    ///
    /// Lifetimes, issuer and audience come from `config`; its secret is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`] if
    /// [`TokenConfig::validate_claim_settings`] rejects `config`.
    ///
    /// [`ErrorKind::Config`]: crate::ErrorKind::Config
    pub fn with_keys(config: &TokenConfig, keys: TokenKeys) -> Result<Self> {
        config.validate_claim_settings()?;

        let mut validation = Validation::new(TokenKeys::ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.set_issuer(&[&config.token_issuer]);
        validation.set_audience(&[&config.token_audience]);
        validation.set_required_spec_claims(&["iss", "aud", "sub", "iat", "exp"]);

        let inner = TokenAuthorityInner {
            keys,
            issuer: config.token_issuer.clone(),
            audience: config.token_audience.clone(),
            access_ttl: config.access_token_ttl(),
            refresh_ttl: config.refresh_token_ttl(),
            validation,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the lifetime of tokens of the given kind.
    #[inline]
    pub fn ttl(&self, kind: TokenKind) -> SignedDuration {
        match kind {
            TokenKind::Access => self.inner.access_ttl,
            TokenKind::Refresh => self.inner.refresh_ttl,
        }
    }

    /// Issues an access token expiring after the access lifetime.
    pub fn issue_access_token(&self, subject: Uuid) -> Result<String> {
        self.issue_token_at(TokenKind::Access, subject, Timestamp::now())
    }

    /// Issues a refresh token expiring after the refresh lifetime.
    pub fn issue_refresh_token(&self, subject: Uuid) -> Result<String> {
        self.issue_token_at(TokenKind::Refresh, subject, Timestamp::now())
    }

    /// Issues an access and a refresh token for the same subject.
    pub fn issue_token_pair(&self, subject: Uuid) -> Result<TokenPair> {
        let now = Timestamp::now();
        Ok(TokenPair {
            access_token: self.issue_token_at(TokenKind::Access, subject, now)?,
            refresh_token: self.issue_token_at(TokenKind::Refresh, subject, now)?,
            token_type: AuthResult::BEARER.to_owned(),
            expires_in: self.inner.access_ttl.as_secs(),
        })
    }

    /// Issues a token as if it had been issued at `issued_at`.
    pub fn issue_token_at(
        &self,
        kind: TokenKind,
        subject: Uuid,
        issued_at: Timestamp,
    ) -> Result<String> {
        let expires_at = issued_at
            .checked_add(self.ttl(kind))
            .map_err(|e| Error::internal("token", "token expiry out of range").with_source(e))?;

        let claims = TokenClaims {
            issuer: self.inner.issuer.clone(),
            audience: self.inner.audience.clone(),
            token_id: Uuid::new_v4(),
            subject,
            issued_at,
            expires_at,
        };

        let token = encode(
            &Header::new(TokenKeys::ALGORITHM),
            &claims,
            self.inner.keys.encoding_key(),
        )
        .map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                subject = %subject,
                "Failed to sign token"
            );
            Error::internal("token", "failed to sign token").with_source(e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            kind = %kind,
            subject = %subject,
            token_id = %claims.token_id,
            expires_at = %claims.expires_at,
            "Token issued"
        );

        Ok(token)
    }

    /// Verifies signature, issuer, audience and expiry, returning the claims.
    ///
    /// Any failure is [`ErrorKind::InvalidToken`].
    ///
    /// [`ErrorKind::InvalidToken`]: crate::ErrorKind::InvalidToken
    pub fn decode_claims(&self, token: &str) -> Result<TokenClaims> {
        let claims = decode::<TokenClaims>(
            token,
            self.inner.keys.decoding_key(),
            &self.inner.validation,
        )
        .map_err(|e| {
            let message = match e.kind() {
                JwtErrorKind::ExpiredSignature => "token has expired",
                JwtErrorKind::InvalidSignature => "token signature is invalid",
                JwtErrorKind::InvalidIssuer | JwtErrorKind::InvalidAudience => {
                    "token was not issued for this service"
                }
                _ => "token is malformed",
            };
            tracing::debug!(target: TRACING_TARGET, error = %e, "Token rejected");
            Error::invalid_token(message)
        })?
        .claims;

        if claims.is_expired() {
            tracing::debug!(
                target: TRACING_TARGET,
                token_id = %claims.token_id,
                expires_at = %claims.expires_at,
                "Token rejected: expired"
            );
            return Err(Error::invalid_token("token has expired"));
        }

        Ok(claims)
    }

    /// Validates a token and returns its subject.
    ///
    /// # Arguments
    ///
    /// * `token` - Compact JWS string as issued by this authority
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidToken`] if the signature does not match,
    /// the token is malformed, the issuer or audience differ, or the expiry
    /// has passed. No leeway is applied to the expiry.
    ///
    /// [`ErrorKind::InvalidToken`]: crate::ErrorKind::InvalidToken
    pub fn validate_token(&self, token: &str) -> Result<Uuid> {
        self.decode_claims(token).map(|claims| claims.subject)
    }

    /// Exchanges a valid refresh token for a new access token.
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - Token previously issued by this authority
    ///
    /// # Returns
    ///
    /// A new access token for the subject embedded in `refresh_token`. The
    /// refresh token itself is not rotated.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidToken`] under the same conditions as
    /// [`validate_token`]; no access token is issued in that case.
    ///
    /// # Security Notes
    ///
    /// - The subject is not looked up again: a token minted for a user that
    ///   has since been removed still refreshes until it expires
    /// - Tokens are not tracked, so a leaked refresh token cannot be revoked
    ///
    /// [`ErrorKind::InvalidToken`]: crate::ErrorKind::InvalidToken
    /// [`validate_token`]: TokenAuthority::validate_token
    #[tracing::instrument(skip_all, target = TRACING_TARGET)]
    pub fn refresh(&self, refresh_token: &str) -> Result<String> {
        let claims = self.decode_claims(refresh_token)?;
        let access_token = self.issue_access_token(claims.subject)?;

        tracing::info!(
            target: TRACING_TARGET,
            subject = %claims.subject,
            "Access token refreshed"
        );

        Ok(access_token)
    }
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("issuer", &self.inner.issuer)
            .field("audience", &self.inner.audience)
            .field("access_ttl", &self.inner.access_ttl)
            .field("refresh_ttl", &self.inner.refresh_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn authority() -> anyhow::Result<TokenAuthority> {
        Ok(TokenAuthority::new(&TokenConfig::new(SECRET))?)
    }

    #[test]
    fn with_keys_rejects_out_of_range_lifetimes() -> anyhow::Result<()> {
        let keys = TokenKeys::from_secret(SECRET.as_bytes())?;

        let config = TokenConfig::new("").with_access_token_ttl_secs(u64::MAX);
        let err = TokenAuthority::with_keys(&config, keys.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let config = TokenConfig::new("").with_refresh_token_ttl_secs(60);
        let err = TokenAuthority::with_keys(&config, keys.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let authority = TokenAuthority::with_keys(&TokenConfig::new(""), keys)?;
        assert_eq!(authority.ttl(TokenKind::Access), SignedDuration::from_secs(900));
        Ok(())
    }

    #[test]
    fn access_token_round_trip() -> anyhow::Result<()> {
        let authority = authority()?;
        let subject = Uuid::new_v4();

        let token = authority.issue_access_token(subject)?;
        assert_eq!(authority.validate_token(&token)?, subject);

        let claims = authority.decode_claims(&token)?;
        assert_eq!(
            claims.expires_at.duration_since(claims.issued_at),
            SignedDuration::from_secs(900)
        );
        Ok(())
    }

    #[test]
    fn expired_access_token_is_invalid() -> anyhow::Result<()> {
        let authority = authority()?;
        let issued_at = Timestamp::now() - SignedDuration::from_mins(16);
        let token = authority.issue_token_at(TokenKind::Access, Uuid::new_v4(), issued_at)?;

        let err = authority.validate_token(&token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidToken);
        Ok(())
    }

    #[test]
    fn refresh_issues_new_access_token() -> anyhow::Result<()> {
        let authority = authority()?;
        let subject = Uuid::new_v4();
        let refresh_token = authority.issue_refresh_token(subject)?;

        let access_token = authority.refresh(&refresh_token)?;
        assert_ne!(access_token, refresh_token);
        assert_eq!(authority.validate_token(&access_token)?, subject);

        let claims = authority.decode_claims(&access_token)?;
        assert!(claims.expires_at <= Timestamp::now() + SignedDuration::from_mins(15));
        Ok(())
    }

    #[test]
    fn expired_refresh_token_is_rejected() -> anyhow::Result<()> {
        let authority = authority()?;
        let issued_at = Timestamp::now() - SignedDuration::from_hours(8 * 24);
        let token = authority.issue_token_at(TokenKind::Refresh, Uuid::new_v4(), issued_at)?;

        let err = authority.refresh(&token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidToken);
        Ok(())
    }

    #[test]
    fn foreign_and_tampered_tokens_are_invalid() -> anyhow::Result<()> {
        let authority = authority()?;
        let other = TokenAuthority::new(&TokenConfig::new("fedcba9876543210fedcba9876543210"))?;

        let foreign = other.issue_access_token(Uuid::new_v4())?;
        assert_eq!(
            authority.validate_token(&foreign).unwrap_err().kind(),
            ErrorKind::InvalidToken
        );

        let mine = authority.issue_access_token(Uuid::new_v4())?;
        let theirs = authority.issue_access_token(Uuid::new_v4())?;
        let mine: Vec<&str> = mine.split('.').collect();
        let theirs: Vec<&str> = theirs.split('.').collect();
        let spliced = format!("{}.{}.{}", mine[0], theirs[1], mine[2]);
        assert_eq!(
            authority.validate_token(&spliced).unwrap_err().kind(),
            ErrorKind::InvalidToken
        );

        for garbage in ["", "abc", "a.b.c"] {
            assert_eq!(
                authority.validate_token(garbage).unwrap_err().kind(),
                ErrorKind::InvalidToken
            );
        }
        Ok(())
    }

    #[test]
    fn audience_mismatch_is_invalid() -> anyhow::Result<()> {
        let config = TokenConfig::new(SECRET);
        let issuer = TokenAuthority::new(&config.clone().with_audience("someone-else"))?;
        let authority = TokenAuthority::new(&config)?;

        let token = issuer.issue_access_token(Uuid::new_v4())?;
        assert_eq!(
            authority.validate_token(&token).unwrap_err().kind(),
            ErrorKind::InvalidToken
        );
        Ok(())
    }

    #[test]
    fn token_pair_reports_access_lifetime() -> anyhow::Result<()> {
        let pair = authority()?.issue_token_pair(Uuid::new_v4())?;
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 900);

        let result = AuthResult::from(pair);
        assert!(result.refresh_token.is_some());
        assert!(!result.is_challenge());
        Ok(())
    }
}
