//! Translation of database errors into service errors.

use warden_postgres::PgError;
use warden_postgres::types::{
    ConstraintCategory, ConstraintViolation, RoleConstraints, UserConstraints,
};

use crate::Error;
use crate::utility::tracing_targets::TRACING_TARGET_STORE as TRACING_TARGET;

/// Service name reported in unavailable and internal errors.
const SERVICE: &str = "postgres";

/// Converts a database error into a service error.
///
/// Connectivity problems become unavailable, known constraint violations
/// become conflict or validation failures, and everything else is internal.
pub(crate) fn from_pg_error(error: PgError) -> Error {
    if error.is_unavailable() {
        tracing::warn!(target: TRACING_TARGET, error = %error, "Database unavailable");
        return Error::unavailable(SERVICE, "database is unreachable").with_source(error);
    }

    if let Some(violation) = error.constraint_violation() {
        return from_constraint_violation(violation).with_source(error);
    }

    tracing::error!(target: TRACING_TARGET, error = %error, "Database operation failed");
    Error::internal(SERVICE, "database operation failed").with_source(error)
}

fn from_constraint_violation(violation: ConstraintViolation) -> Error {
    tracing::debug!(
        target: TRACING_TARGET,
        constraint = %violation,
        "Constraint violated"
    );

    match violation {
        ConstraintViolation::User(UserConstraints::EmailUnique) => {
            Error::conflict("email is already registered")
        }
        ConstraintViolation::User(UserConstraints::UsernameUnique) => {
            Error::conflict("username is already taken")
        }
        ConstraintViolation::User(UserConstraints::RoleReference) => {
            Error::validation("role does not exist")
        }
        ConstraintViolation::Role(RoleConstraints::NameUnique) => {
            Error::conflict("role name is already taken")
        }
        other => match other.constraint_category() {
            ConstraintCategory::Uniqueness => {
                Error::conflict(format!("{} already exists", other.table_name()))
            }
            ConstraintCategory::Validation | ConstraintCategory::Reference => {
                Error::validation(format!("constraint {other} rejected the record"))
            }
            ConstraintCategory::Chronological => {
                Error::internal(SERVICE, format!("constraint {other} was violated"))
            }
        },
    }
}
