//! [`UserStore`] implementations backed by real databases.
//!
//! [`UserStore`]: warden_core::UserStore

mod pg_error;
mod postgres;

pub(crate) use pg_error::from_pg_error;
pub use postgres::PgUserStore;
