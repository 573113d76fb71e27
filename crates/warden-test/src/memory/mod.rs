//! In-memory implementations of the storage seams.

mod user_store;

pub use user_store::MemoryUserStore;
