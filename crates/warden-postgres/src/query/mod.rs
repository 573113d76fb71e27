//! Repositories for the identity tables.
//!
//! Each repository is a trait implemented for [`PgConnection`], so any
//! pooled connection or transaction handle can run its queries.
//!
//! [`PgConnection`]: crate::PgConnection

pub mod role;
pub mod user;

pub use role::RoleRepository;
pub use user::UserRepository;
