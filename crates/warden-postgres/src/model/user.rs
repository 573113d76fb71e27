//! User identity model.

use std::fmt;

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::users;

/// A row of the `users` table.
#[derive(Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    /// Unique identifier, generated by the application.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Unique, lowercase email address.
    pub email: String,
    /// Argon2id hash in PHC string format.
    pub password_hash: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
    /// Optional phone number.
    pub phone_number: Option<String>,
    /// Referenced role, if any.
    pub role_id: Option<i64>,
    /// Set once when the identity is created.
    pub registration_date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .finish_non_exhaustive()
    }
}

/// Data for inserting a new user.
///
/// `created_at` and `updated_at` are filled in by the database.
#[derive(Clone, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub role_id: Option<i64>,
    pub registration_date: Timestamp,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
