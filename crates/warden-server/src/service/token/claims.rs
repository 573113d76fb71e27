//! Registered JWT claims carried by every Warden token.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims of an access or refresh token.
///
/// Both kinds share this structure; only `exp` differs. Timestamps are
/// encoded as seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer.
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Audience.
    #[serde(rename = "aud")]
    pub audience: String,
    /// Unique token identifier.
    #[serde(rename = "jti")]
    pub token_id: Uuid,
    /// Identifier of the user the token was issued for.
    #[serde(rename = "sub")]
    pub subject: Uuid,
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
}

impl TokenClaims {
    /// Returns whether the token has expired at `now`.
    ///
    /// A token expiring exactly at `now` counts as expired.
    #[inline]
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    /// Returns whether the token has expired.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }
}
