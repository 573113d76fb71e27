#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Embeds all migrations into the final binary.
pub(crate) const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!();

// Tracing target constants for consistent logging.

/// Tracing target for client initialization and lifecycle events.
pub const TRACING_TARGET_CLIENT: &str = "warden_postgres::client";

/// Tracing target for query execution.
pub const TRACING_TARGET_QUERY: &str = "warden_postgres::query";

/// Tracing target for migration application and status checks.
pub const TRACING_TARGET_MIGRATION: &str = "warden_postgres::migration";

/// Tracing target for connection establishment and pool management.
pub const TRACING_TARGET_CONNECTION: &str = "warden_postgres::connection";

mod client;
pub mod model;
pub mod query;
mod schema;
pub mod types;

use std::borrow::Cow;

use deadpool::managed::TimeoutType;
use diesel::ConnectionError;
use diesel::result::Error;
pub use diesel_async::AsyncPgConnection as PgConnection;

pub use crate::client::{
    ConnectionPool, MigrationResult, MigrationStatus, PgClient, PgClientMigrationExt, PgConfig,
    PgConn, PgPoolStatus, PooledConnection,
};
use crate::types::ConstraintViolation;

pub mod error {
    //! Error types and utilities for database operations.
    //!
    //! See [`PgError`] for the main error type used throughout this crate.
    //!
    //! [`PgError`]: crate::PgError

    /// Type-erased error type for dynamic error handling.
    pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

    pub use deadpool::managed::TimeoutType;
    pub use diesel::result::{ConnectionError as DieselConnectionError, Error as DieselError};
    pub use diesel_async::pooled_connection::PoolError as DieselPoolError;
    pub use diesel_async::pooled_connection::deadpool::PoolError as DeadpoolError;
}

/// Error type for all PostgreSQL operations.
#[derive(Debug, thiserror::Error)]
#[must_use = "database errors should be handled appropriately"]
pub enum PgError {
    /// Invalid configuration parameters.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Waiting for, creating or recycling a connection timed out.
    #[error("Database operation timed out ({0:?})")]
    Timeout(TimeoutType),

    /// Failed to establish or maintain a database connection.
    #[error("Database connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Applying or inspecting migrations failed.
    #[error("Database migration error: {0}")]
    Migration(error::BoxError),

    /// Query execution failed, including constraint violations.
    #[error("Database query error: {0}")]
    Query(#[from] Error),

    /// Anything not covered above.
    #[error("Unexpected error: {0}")]
    Unexpected(Cow<'static, str>),
}

impl PgError {
    /// Extracts the constraint name from a constraint violation error.
    pub fn constraint(&self) -> Option<&str> {
        let PgError::Query(Error::DatabaseError(_, info)) = self else {
            return None;
        };

        info.constraint_name()
    }

    /// Returns a structured constraint violation if this error represents one.
    pub fn constraint_violation(&self) -> Option<ConstraintViolation> {
        self.constraint().and_then(ConstraintViolation::new)
    }

    /// Returns whether the database could not be reached in time.
    ///
    /// Callers report these as unavailability rather than as a business
    /// failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            PgError::Timeout(_)
                | PgError::Connection(_)
                | PgError::Query(Error::BrokenTransactionManager)
                | PgError::Query(Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::ClosedConnection,
                    _
                ))
        )
    }
}

impl From<error::DeadpoolError> for PgError {
    fn from(value: error::DeadpoolError) -> Self {
        use error::{DeadpoolError, DieselPoolError};

        match value {
            DeadpoolError::Timeout(timeout) => Self::Timeout(timeout),
            DeadpoolError::Backend(DieselPoolError::QueryError(error)) => Self::Query(error),
            DeadpoolError::Backend(DieselPoolError::ConnectionError(error)) => {
                Self::Connection(error)
            }
            DeadpoolError::PostCreateHook(err) => {
                tracing::warn!(
                    target: TRACING_TARGET_CONNECTION,
                    error = %err,
                    "Post-create hook rejected a connection"
                );
                Self::Unexpected(err.to_string().into())
            }
            DeadpoolError::NoRuntimeSpecified => {
                Self::Unexpected("No runtime specified for connection pool".into())
            }
            DeadpoolError::Closed => Self::Connection(ConnectionError::BadConnection(
                "Connection pool is closed".into(),
            )),
        }
    }
}

/// Specialized [`Result`] type for database operations.
pub type PgResult<T, E = PgError> = Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_unavailable() {
        assert!(PgError::Timeout(TimeoutType::Wait).is_unavailable());
        assert!(PgError::Timeout(TimeoutType::Create).is_unavailable());
    }

    #[test]
    fn closed_pool_is_unavailable() {
        let err = PgError::from(error::DeadpoolError::Closed);
        assert!(err.is_unavailable());
    }

    #[test]
    fn not_found_is_not_unavailable() {
        let err = PgError::Query(Error::NotFound);
        assert!(!err.is_unavailable());
        assert!(err.constraint().is_none());
    }
}
