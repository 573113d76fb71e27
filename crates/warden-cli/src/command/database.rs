use anyhow::Context;
use serde::Serialize;
use warden_core::UserView;
use warden_postgres::PgClientMigrationExt;
use warden_server::service::{CredentialService, PgUserStore};

use super::print_json;
use crate::TRACING_TARGET_COMMAND;
use crate::config::DatabaseArgs;

#[derive(Serialize)]
struct MigrationReport {
    applied_versions: Vec<String>,
    pending_versions: Vec<String>,
    last_applied_version: Option<String>,
}

/// Applies pending migrations and prints the resulting status.
pub async fn migrate(args: DatabaseArgs) -> anyhow::Result<()> {
    let client = args.connect().await?;
    let status = client
        .get_migration_status()
        .await
        .context("failed to read migration status")?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        applied = status.applied_versions.len(),
        pending = status.pending_versions.len(),
        "Migration status"
    );

    print_json(&MigrationReport {
        last_applied_version: status.last_applied_version().map(str::to_owned),
        applied_versions: status.applied_versions,
        pending_versions: status.pending_versions,
    })
}

/// Creates the default roles and prints every role.
pub async fn seed(args: DatabaseArgs) -> anyhow::Result<()> {
    let store = PgUserStore::new(args.connect().await?);
    store
        .seed_default_roles()
        .await
        .context("failed to seed roles")?;

    let roles = store.list_roles().await.context("failed to list roles")?;
    print_json(&roles)
}

/// Prints every user without secret fields.
pub async fn users(args: DatabaseArgs) -> anyhow::Result<()> {
    let credentials = CredentialService::new(PgUserStore::new(args.connect().await?));
    let users: Vec<UserView> = credentials
        .list_all()
        .await
        .context("failed to list users")?
        .into_iter()
        .map(UserView::from)
        .collect();

    print_json(&users)
}
