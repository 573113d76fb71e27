//! Role model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::roles;

/// A row of the `roles` table.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Data for inserting a new role.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewRole {
    pub name: String,
}
