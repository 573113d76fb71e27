//! Identity records.
//!
//! [`User`] is the full stored record, password hash included. It deliberately
//! does not implement `Serialize` and its `Debug` output redacts the hash, so
//! the only way to hand an identity to the outside world is through
//! [`UserView`].

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a [`Role`].
pub type RoleId = i64;

/// Placeholder printed instead of secret material.
const REDACTED: &str = "<redacted>";

/// Stored user identity.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier, assigned once at creation.
    pub id: Uuid,
    /// Unique, non-empty login name.
    pub username: String,
    /// Unique, normalized (trimmed, lowercase) email address.
    pub email: String,
    /// Argon2id hash in PHC string format.
    pub password_hash: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
    /// Optional phone number.
    pub phone_number: Option<String>,
    /// Assigned role, if any.
    pub role_id: Option<RoleId>,
    /// Set once at creation.
    pub registration_date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Returns the redacted external representation.
    #[inline]
    pub fn view(&self) -> UserView {
        UserView::from(self)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &REDACTED)
            .field("role_id", &self.role_id)
            .field("registration_date", &self.registration_date)
            .finish_non_exhaustive()
    }
}

/// Redacted identity, safe to serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,
    pub registration_date: Timestamp,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role_id: user.role_id,
            registration_date: user.registration_date,
        }
    }
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            role_id: user.role_id,
            registration_date: user.registration_date,
        }
    }
}

/// A fully prepared identity, ready to be inserted.
///
/// The password is already hashed and the identifier already generated; the
/// store only has to persist it and enforce uniqueness.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub role_id: Option<RoleId>,
    pub registration_date: Timestamp,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &REDACTED)
            .field("role_id", &self.role_id)
            .finish_non_exhaustive()
    }
}

/// A named role that identities may reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Role {
    /// Name of the administrative role seeded by default.
    pub const ADMINISTRATOR: &'static str = "Administrator";
    /// Name of the customer role seeded by default.
    pub const CUSTOMER: &'static str = "Customer";

    /// Roles every fresh deployment starts with.
    pub const DEFAULTS: [&'static str; 2] = [Self::ADMINISTRATOR, Self::CUSTOMER];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        let now = Timestamp::now();
        User {
            id: Uuid::new_v4(),
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
            name: None,
            address: Some("1 Main St".to_owned()),
            phone_number: None,
            role_id: Some(2),
            registration_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn debug_output_redacts_hash() {
        let user = alice();
        let debug = format!("{user:?}");

        assert!(!debug.contains(&user.password_hash));
        assert!(debug.contains(REDACTED));
    }

    #[test]
    fn view_has_no_secret_fields() -> anyhow::Result<()> {
        let user = alice();
        let json = serde_json::to_value(user.view())?;

        assert_eq!(json["username"], "alice");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("address").is_none());
        Ok(())
    }
}
