//! Role repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{NewRole, Role};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for roles users may reference.
pub trait RoleRepository {
    /// Finds a role by id.
    fn find_role_by_id(&mut self, role_id: i64)
    -> impl Future<Output = PgResult<Option<Role>>> + Send;

    /// Lists roles ordered by id.
    fn list_roles(&mut self) -> impl Future<Output = PgResult<Vec<Role>>> + Send;

    /// Returns the role with this name, inserting it first if missing.
    ///
    /// Safe to run concurrently and repeatedly.
    fn ensure_role(&mut self, name: &str) -> impl Future<Output = PgResult<Role>> + Send;
}

impl RoleRepository for PgConnection {
    async fn find_role_by_id(&mut self, role_id: i64) -> PgResult<Option<Role>> {
        use schema::roles::{self, dsl};

        roles::table
            .filter(dsl::id.eq(role_id))
            .select(Role::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_roles(&mut self) -> PgResult<Vec<Role>> {
        use schema::roles::{self, dsl};

        roles::table
            .order(dsl::id.asc())
            .select(Role::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn ensure_role(&mut self, name: &str) -> PgResult<Role> {
        use schema::roles::{self, dsl};

        let name = name.trim().to_owned();
        let inserted = diesel::insert_into(roles::table)
            .values(&NewRole { name: name.clone() })
            .on_conflict(dsl::name)
            .do_nothing()
            .execute(self)
            .await
            .map_err(PgError::from)?;

        if inserted > 0 {
            tracing::info!(target: TRACING_TARGET_QUERY, role = %name, "Role created");
        }

        roles::table
            .filter(dsl::name.eq(&name))
            .select(Role::as_select())
            .first(self)
            .await
            .map_err(PgError::from)
    }
}
