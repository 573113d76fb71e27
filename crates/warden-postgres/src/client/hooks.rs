//! Connection setup and pool lifecycle hooks for [`diesel_async`] and [`deadpool`].

use std::time::Instant;

use deadpool::managed::{HookError, HookResult, Metrics};
use diesel::{ConnectionError, ConnectionResult};
use diesel_async::pooled_connection::{PoolError, PoolableConnection};
use diesel_async::{AsyncConnection, AsyncPgConnection};
use futures::FutureExt;
use futures::future::BoxFuture;

use super::pg_config::mask_url;
use crate::TRACING_TARGET_CONNECTION;

/// Establishes a new connection, logging how long it took.
///
/// See [`ManagerConfig::custom_setup`] for more details.
///
/// [`ManagerConfig::custom_setup`]: diesel_async::pooled_connection::ManagerConfig
pub fn setup_callback<C>(addr: &str) -> BoxFuture<'_, ConnectionResult<C>>
where
    C: AsyncConnection + 'static,
{
    let start = Instant::now();

    async move {
        let result = C::establish(addr).await;
        let elapsed_ms = start.elapsed().as_millis();

        match &result {
            Ok(_) => tracing::debug!(
                target: TRACING_TARGET_CONNECTION,
                addr = %mask_url(addr),
                elapsed_ms,
                "Database connection established"
            ),
            Err(err) => tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                addr = %mask_url(addr),
                elapsed_ms,
                error = %err,
                "Failed to establish database connection"
            ),
        }

        result
    }
    .boxed()
}

/// Called after a new connection has been added to the pool.
pub fn post_create(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    tracing::debug!(
        target: TRACING_TARGET_CONNECTION,
        created_at = ?metrics.created,
        "Connection added to pool"
    );

    reject_broken(conn, "post_create")
}

/// Called before an idle connection is handed out again.
pub fn pre_recycle(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    tracing::trace!(
        target: TRACING_TARGET_CONNECTION,
        recycle_count = metrics.recycle_count,
        last_recycled = ?metrics.recycled,
        "Recycling connection"
    );

    reject_broken(conn, "pre_recycle")
}

/// Drops connections that diesel has marked as broken.
fn reject_broken(conn: &mut AsyncPgConnection, hook: &'static str) -> HookResult<PoolError> {
    if conn.is_broken() {
        tracing::warn!(
            target: TRACING_TARGET_CONNECTION,
            hook,
            "Discarding broken connection"
        );
        return Err(HookError::Backend(PoolError::ConnectionError(
            ConnectionError::BadConnection("connection is broken".into()),
        )));
    }

    Ok(())
}
