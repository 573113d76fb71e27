//! User repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewUser, User};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for user identities.
pub trait UserRepository {
    /// Inserts a new user.
    ///
    /// The email is trimmed and lowercased before insertion. Uniqueness of
    /// email and username is enforced by unique indexes, so of two
    /// concurrent inserts with the same email exactly one succeeds; the
    /// other fails with a `users_email_unique_idx` violation.
    fn create_user(&mut self, new_user: NewUser) -> impl Future<Output = PgResult<User>> + Send;

    /// Finds a user by id.
    fn find_user_by_id(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Finds a user by email. Comparison is case-insensitive.
    fn find_user_by_email(
        &mut self,
        email: &str,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Lists every user, oldest registration first.
    fn list_users(&mut self) -> impl Future<Output = PgResult<Vec<User>>> + Send;
}

impl UserRepository for PgConnection {
    async fn create_user(&mut self, mut new_user: NewUser) -> PgResult<User> {
        use schema::users;

        new_user.username = new_user.username.trim().to_owned();
        new_user.email = new_user.email.trim().to_lowercase();

        let user = diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            user_id = %user.id,
            "User inserted"
        );

        Ok(user)
    }

    async fn find_user_by_id(&mut self, user_id: Uuid) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        users::table
            .filter(dsl::id.eq(user_id))
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_user_by_email(&mut self, email: &str) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        users::table
            .filter(dsl::email.eq(email.trim().to_lowercase()))
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_users(&mut self) -> PgResult<Vec<User>> {
        use schema::users::{self, dsl};

        users::table
            .order((dsl::registration_date.asc(), dsl::id.asc()))
            .select(User::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }
}
