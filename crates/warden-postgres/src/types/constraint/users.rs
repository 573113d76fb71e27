//! Users table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Constraints on the `users` table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum UserConstraints {
    // Validation
    #[strum(serialize = "users_username_not_empty")]
    UsernameNotEmpty,
    #[strum(serialize = "users_username_length_max")]
    UsernameLengthMax,
    #[strum(serialize = "users_email_not_empty")]
    EmailNotEmpty,
    #[strum(serialize = "users_email_length_max")]
    EmailLengthMax,
    #[strum(serialize = "users_email_lowercase")]
    EmailLowercase,
    #[strum(serialize = "users_password_hash_not_empty")]
    PasswordHashNotEmpty,

    // Chronological
    #[strum(serialize = "users_updated_after_created")]
    UpdatedAfterCreated,

    // Uniqueness
    #[strum(serialize = "users_pkey")]
    PrimaryKey,
    #[strum(serialize = "users_username_unique_idx")]
    UsernameUnique,
    #[strum(serialize = "users_email_unique_idx")]
    EmailUnique,

    // Reference
    #[strum(serialize = "users_role_id_fkey")]
    RoleReference,
}

impl UserConstraints {
    /// Creates a new [`UserConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            UserConstraints::UsernameNotEmpty
            | UserConstraints::UsernameLengthMax
            | UserConstraints::EmailNotEmpty
            | UserConstraints::EmailLengthMax
            | UserConstraints::EmailLowercase
            | UserConstraints::PasswordHashNotEmpty => ConstraintCategory::Validation,

            UserConstraints::UpdatedAfterCreated => ConstraintCategory::Chronological,

            UserConstraints::PrimaryKey
            | UserConstraints::UsernameUnique
            | UserConstraints::EmailUnique => ConstraintCategory::Uniqueness,

            UserConstraints::RoleReference => ConstraintCategory::Reference,
        }
    }
}

impl From<UserConstraints> for String {
    #[inline]
    fn from(val: UserConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for UserConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
