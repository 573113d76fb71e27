//! Diesel models for the identity tables.

mod role;
mod user;

pub use role::{NewRole, Role};
pub use user::{NewUser, User};
