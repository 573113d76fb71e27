//! Storage seam for identity records.

use async_trait::async_trait;
use uuid::Uuid;

use crate::Result;
use crate::user::{NewUser, Role, RoleId, User};

/// Backing store for identities and roles.
///
/// Lookups return `Ok(None)` for missing records; turning that into
/// [`ErrorKind::NotFound`] is the caller's decision. Connectivity failures and
/// timeouts are reported as [`ErrorKind::Unavailable`].
///
/// [`ErrorKind::NotFound`]: crate::ErrorKind::NotFound
/// [`ErrorKind::Unavailable`]: crate::ErrorKind::Unavailable
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds an identity by its identifier.
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    /// Finds an identity by its normalized email address.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns every stored identity, oldest first.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Persists a new identity.
    ///
    /// Uniqueness of username and email is checked and the record inserted as
    /// one atomic step: of two concurrent inserts sharing an email, exactly one
    /// succeeds and the other fails with [`ErrorKind::Conflict`].
    ///
    /// [`ErrorKind::Conflict`]: crate::ErrorKind::Conflict
    async fn insert_user(&self, new_user: NewUser) -> Result<User>;

    /// Finds a role by its identifier.
    async fn find_role(&self, role_id: RoleId) -> Result<Option<Role>>;
}
