//! Database constraint violations, grouped by table.
//!
//! Every named `CHECK`, unique index and foreign key in the migrations has a
//! variant here, so callers can route a failed insert without matching on
//! raw constraint strings.

mod roles;
mod users;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::roles::RoleConstraints;
pub use self::users::UserConstraints;

/// Any constraint violation known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    User(UserConstraints),
    Role(RoleConstraints),
}

/// What kind of rule a violated constraint enforces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Format, length and range checks.
    Validation,
    /// Timestamp ordering.
    Chronological,
    /// Primary keys and unique indexes.
    Uniqueness,
    /// Foreign keys.
    Reference,
}

impl ConstraintViolation {
    /// Parses a constraint name as reported by PostgreSQL.
    ///
    /// Returns `None` for names this crate does not define.
    ///
    /// ```
    /// use warden_postgres::types::{ConstraintCategory, ConstraintViolation};
    ///
    /// let violation = ConstraintViolation::new("users_email_unique_idx").unwrap();
    /// assert_eq!(violation.constraint_category(), ConstraintCategory::Uniqueness);
    /// assert!(ConstraintViolation::new("unknown_constraint").is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        let prefix = constraint.split('_').next()?;

        match prefix {
            "users" => UserConstraints::new(constraint).map(Self::User),
            "roles" => RoleConstraints::new(constraint).map(Self::Role),
            _ => None,
        }
    }

    /// Returns the table the constraint belongs to.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::User(_) => "users",
            ConstraintViolation::Role(_) => "roles",
        }
    }

    /// Returns the category of the violated constraint.
    pub fn constraint_category(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::User(c) => c.categorize(),
            ConstraintViolation::Role(c) => c.categorize(),
        }
    }

    /// Returns true for unique index and primary key violations.
    #[inline]
    pub fn is_uniqueness(&self) -> bool {
        self.constraint_category() == ConstraintCategory::Uniqueness
    }

    /// Returns the constraint name as used in the database.
    #[inline]
    pub fn constraint_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::User(c) => write!(f, "{c}"),
            ConstraintViolation::Role(c) => write!(f, "{c}"),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("unknown constraint: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_by_table_prefix() {
        assert_eq!(
            ConstraintViolation::new("users_email_unique_idx"),
            Some(ConstraintViolation::User(UserConstraints::EmailUnique))
        );
        assert_eq!(
            ConstraintViolation::new("roles_name_unique_idx"),
            Some(ConstraintViolation::Role(RoleConstraints::NameUnique))
        );
        assert_eq!(ConstraintViolation::new("sessions_token_unique_idx"), None);
        assert_eq!(ConstraintViolation::new(""), None);
    }

    #[test]
    fn categorizes_user_constraints() {
        let category = |name: &str| ConstraintViolation::new(name).map(|v| v.constraint_category());

        assert_eq!(category("users_username_unique_idx"), Some(ConstraintCategory::Uniqueness));
        assert_eq!(category("users_pkey"), Some(ConstraintCategory::Uniqueness));
        assert_eq!(category("users_role_id_fkey"), Some(ConstraintCategory::Reference));
        assert_eq!(category("users_email_lowercase"), Some(ConstraintCategory::Validation));
        assert_eq!(
            category("users_updated_after_created"),
            Some(ConstraintCategory::Chronological)
        );
    }

    #[test]
    fn display_matches_database_name() {
        let violation = ConstraintViolation::User(UserConstraints::EmailUnique);
        assert_eq!(violation.constraint_name(), "users_email_unique_idx");
        assert_eq!(violation.table_name(), "users");
        assert!(violation.is_uniqueness());
    }
}
