//! Embedded schema migrations.
//!
//! Diesel's migration harness is synchronous, so it runs on the blocking
//! thread pool over an [`AsyncConnectionWrapper`] around a pooled connection.

use std::time::{Duration, Instant};

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use crate::error::BoxError;
use crate::{MIGRATIONS, PgClient, PgError, PgResult, PooledConnection, TRACING_TARGET_MIGRATION};

type Harness = AsyncConnectionWrapper<PooledConnection>;

/// Applied and pending migration versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Applied versions in chronological order.
    pub applied_versions: Vec<String>,
    /// Versions embedded in the binary but not yet applied.
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    /// Creates a new migration status.
    pub fn new(applied_versions: Vec<String>, pending_versions: Vec<String>) -> Self {
        Self {
            applied_versions,
            pending_versions,
        }
    }

    /// Returns the last applied migration version, if any.
    pub fn last_applied_version(&self) -> Option<&str> {
        self.applied_versions.last().map(String::as_str)
    }

    /// Returns true if all migrations have been applied.
    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Total duration of the run.
    pub duration: Duration,
    /// Versions applied by this run, in order.
    pub processed_versions: Vec<String>,
}

impl MigrationResult {
    /// Returns whether the run found nothing to apply.
    #[inline]
    pub fn is_no_op(&self) -> bool {
        self.processed_versions.is_empty()
    }
}

/// Migration operations on [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every pending migration. Safe to call repeatedly.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>> + Send;

    /// Reports applied and pending migrations.
    fn get_migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>> + Send;
}

impl PgClientMigrationExt for PgClient {
    #[tracing::instrument(skip(self), target = TRACING_TARGET_MIGRATION)]
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        let start = Instant::now();
        let conn = self.get_pooled_connection().await?;

        let processed_versions = with_harness(conn, |harness| {
            let versions = harness
                .run_pending_migrations(MIGRATIONS)?
                .into_iter()
                .map(|version| version.to_string())
                .collect::<Vec<_>>();
            Ok(versions)
        })
        .await
        .inspect_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                error = %err,
                "Database migration failed"
            );
        })?;

        let result = MigrationResult {
            duration: start.elapsed(),
            processed_versions,
        };

        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?result.duration,
            migrations_count = result.processed_versions.len(),
            "Database migrations applied"
        );

        Ok(result)
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_MIGRATION)]
    async fn get_migration_status(&self) -> PgResult<MigrationStatus> {
        let conn = self.get_pooled_connection().await?;

        let status = with_harness(conn, |harness| {
            let applied = harness
                .applied_migrations()?
                .into_iter()
                .map(|version| version.to_string())
                .rev()
                .collect();
            let pending = harness
                .pending_migrations(MIGRATIONS)?
                .iter()
                .map(|migration| migration.name().version().to_string())
                .collect();
            Ok(MigrationStatus::new(applied, pending))
        })
        .await?;

        tracing::debug!(
            target: TRACING_TARGET_MIGRATION,
            applied_count = status.applied_versions.len(),
            pending_count = status.pending_versions.len(),
            "Migration status retrieved"
        );

        Ok(status)
    }
}

/// Runs `f` against a blocking migration harness on the blocking thread pool.
async fn with_harness<T, F>(conn: PooledConnection, f: F) -> PgResult<T>
where
    F: FnOnce(&mut Harness) -> Result<T, BoxError> + Send + 'static,
    T: Send + 'static,
{
    let mut harness: Harness = conn.into();
    spawn_blocking(move || f(&mut harness))
        .await
        .map_err(|err| PgError::Migration(err.into()))?
        .map_err(PgError::Migration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reports_pending_versions() {
        let status = MigrationStatus::new(
            vec!["00000000000000".into(), "20250101000001".into()],
            vec!["20250101000002".into()],
        );

        assert!(!status.is_up_to_date());
        assert_eq!(status.last_applied_version(), Some("20250101000001"));
    }

    #[test]
    fn empty_run_is_no_op() {
        let result = MigrationResult {
            duration: Duration::from_millis(3),
            processed_versions: vec![],
        };
        assert!(result.is_no_op());
    }
}
