//! Mutex-guarded [`UserStore`] for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use jiff::Timestamp;
use uuid::Uuid;
use warden_core::{Error, NewUser, Result, Role, RoleId, User, UserStore};

use crate::TRACING_TARGET_MEMORY;

/// In-memory identity store.
///
/// Cloning is cheap; clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    state: Mutex<MemoryState>,
    unavailable: AtomicBool,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<Uuid, User>,
    roles: BTreeMap<RoleId, Role>,
    next_role_id: RoleId,
}

impl MemoryUserStore {
    /// Creates an empty store without roles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with [`Role::DEFAULTS`].
    pub fn with_default_roles() -> Self {
        let store = Self::new();
        for name in Role::DEFAULTS {
            store.add_role(name);
        }
        store
    }

    /// Adds a role and returns it. Ids are assigned sequentially from 1.
    pub fn add_role(&self, name: impl Into<String>) -> Role {
        let mut state = self.lock();
        state.next_role_id += 1;

        let now = Timestamp::now();
        let role = Role {
            id: state.next_role_id,
            name: name.into(),
            created_at: now,
            updated_at: now,
        };
        state.roles.insert(role.id, role.clone());
        role
    }

    /// Makes every subsequent call fail with `Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the number of stored users.
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    /// Returns the number of stored roles.
    pub fn role_count(&self) -> usize {
        self.lock().roles.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<()> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(Error::unavailable("memory", "store is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        self.check_available()?;
        Ok(self.lock().users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.check_available()?;
        let email = email.trim().to_lowercase();
        let state = self.lock();
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.check_available()?;
        let mut users: Vec<User> = self.lock().users.values().cloned().collect();
        users.sort_by(|a, b| {
            a.registration_date
                .cmp(&b.registration_date)
                .then(a.id.cmp(&b.id))
        });
        Ok(users)
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<User> {
        self.check_available()?;
        let mut state = self.lock();

        if state.users.contains_key(&new_user.id) {
            return Err(Error::conflict("user id already exists"));
        }
        if state.users.values().any(|u| u.email == new_user.email) {
            return Err(Error::conflict("email is already registered"));
        }
        if state.users.values().any(|u| u.username == new_user.username) {
            return Err(Error::conflict("username is already taken"));
        }
        if let Some(role_id) = new_user.role_id
            && !state.roles.contains_key(&role_id)
        {
            return Err(Error::validation(format!("role {role_id} does not exist")));
        }

        let now = Timestamp::now();
        let user = User {
            id: new_user.id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            name: new_user.name,
            address: new_user.address,
            phone_number: new_user.phone_number,
            role_id: new_user.role_id,
            registration_date: new_user.registration_date,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());

        tracing::debug!(
            target: TRACING_TARGET_MEMORY,
            user_id = %user.id,
            "User inserted"
        );

        Ok(user)
    }

    async fn find_role(&self, role_id: RoleId) -> Result<Option<Role>> {
        self.check_available()?;
        Ok(self.lock().roles.get(&role_id).cloned())
    }
}
