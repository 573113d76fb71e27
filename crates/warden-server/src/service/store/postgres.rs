//! PostgreSQL-backed [`UserStore`].

use async_trait::async_trait;
use uuid::Uuid;
use warden_core::{NewUser, Role, RoleId, User, UserStore};
use warden_postgres::query::{RoleRepository, UserRepository};
use warden_postgres::{PgClient, PgConn, PgError, model};

use super::pg_error::from_pg_error;
use crate::Result;
use crate::utility::tracing_targets::TRACING_TARGET_STORE as TRACING_TARGET;

/// [`UserStore`] over a pooled PostgreSQL client.
///
/// Uniqueness of email and username is enforced by unique indexes, so
/// concurrent inserts resolve inside the database.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    client: PgClient,
}

impl PgUserStore {
    /// Wraps an existing client.
    pub fn new(client: PgClient) -> Self {
        Self { client }
    }

    async fn connection(&self) -> Result<PgConn> {
        self.client.get_connection().await.map_err(from_pg_error)
    }

    /// Inserts every named role that does not exist yet, in one transaction.
    ///
    /// Returns the roles in the order given. Running it again is a no-op.
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    pub async fn seed_roles(&self, names: &[&str]) -> Result<Vec<Role>> {
        let names: Vec<String> = names.iter().map(|name| (*name).to_owned()).collect();
        let mut conn = self.connection().await?;

        let roles = conn
            .transaction(|conn| {
                Box::pin(async move {
                    let mut roles = Vec::with_capacity(names.len());
                    for name in &names {
                        roles.push(conn.ensure_role(name).await?);
                    }
                    Ok::<_, PgError>(roles)
                })
            })
            .await
            .map_err(from_pg_error)?;

        tracing::info!(
            target: TRACING_TARGET,
            role_count = roles.len(),
            "Roles seeded"
        );

        Ok(roles.into_iter().map(into_role).collect())
    }

    /// Seeds [`Role::DEFAULTS`].
    pub async fn seed_default_roles(&self) -> Result<Vec<Role>> {
        self.seed_roles(&Role::DEFAULTS).await
    }

    /// Lists every role, ordered by id.
    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        let mut conn = self.connection().await?;
        let roles = conn.list_roles().await.map_err(from_pg_error)?;
        Ok(roles.into_iter().map(into_role).collect())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let mut conn = self.connection().await?;
        let user = conn
            .find_user_by_id(user_id)
            .await
            .map_err(from_pg_error)?;
        Ok(user.map(into_user))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = self.connection().await?;
        let user = conn
            .find_user_by_email(email)
            .await
            .map_err(from_pg_error)?;
        Ok(user.map(into_user))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut conn = self.connection().await?;
        let users = conn.list_users().await.map_err(from_pg_error)?;
        Ok(users.into_iter().map(into_user).collect())
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<User> {
        let mut conn = self.connection().await?;
        let user = conn
            .create_user(from_new_user(new_user))
            .await
            .map_err(from_pg_error)?;
        Ok(into_user(user))
    }

    async fn find_role(&self, role_id: RoleId) -> Result<Option<Role>> {
        let mut conn = self.connection().await?;
        let role = conn
            .find_role_by_id(role_id)
            .await
            .map_err(from_pg_error)?;
        Ok(role.map(into_role))
    }
}

fn into_user(user: model::User) -> User {
    User {
        id: user.id,
        username: user.username,
        email: user.email,
        password_hash: user.password_hash,
        name: user.name,
        address: user.address,
        phone_number: user.phone_number,
        role_id: user.role_id,
        registration_date: user.registration_date.into(),
        created_at: user.created_at.into(),
        updated_at: user.updated_at.into(),
    }
}

fn from_new_user(new_user: NewUser) -> model::NewUser {
    model::NewUser {
        id: new_user.id,
        username: new_user.username,
        email: new_user.email,
        password_hash: new_user.password_hash,
        name: new_user.name,
        address: new_user.address,
        phone_number: new_user.phone_number,
        role_id: new_user.role_id,
        registration_date: new_user.registration_date.into(),
    }
}

fn into_role(role: model::Role) -> Role {
    Role {
        id: role.id,
        name: role.name,
        created_at: role.created_at.into(),
        updated_at: role.updated_at.into(),
    }
}
