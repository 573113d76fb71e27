//! Roles table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Constraints on the `roles` table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum RoleConstraints {
    #[strum(serialize = "roles_name_not_empty")]
    NameNotEmpty,
    #[strum(serialize = "roles_name_length_max")]
    NameLengthMax,

    #[strum(serialize = "roles_updated_after_created")]
    UpdatedAfterCreated,

    #[strum(serialize = "roles_pkey")]
    PrimaryKey,
    #[strum(serialize = "roles_name_unique_idx")]
    NameUnique,
}

impl RoleConstraints {
    /// Creates a new [`RoleConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            RoleConstraints::NameNotEmpty | RoleConstraints::NameLengthMax => {
                ConstraintCategory::Validation
            }
            RoleConstraints::UpdatedAfterCreated => ConstraintCategory::Chronological,
            RoleConstraints::PrimaryKey | RoleConstraints::NameUnique => {
                ConstraintCategory::Uniqueness
            }
        }
    }
}

impl From<RoleConstraints> for String {
    #[inline]
    fn from(val: RoleConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for RoleConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
