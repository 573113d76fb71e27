//! Credential Store Accessor.
//!
//! [`CredentialService`] owns every read and write of identity records. It
//! validates input, enforces uniqueness, hashes passwords on registration and
//! verifies them on authentication. It works against any [`UserStore`].

mod create_user;

use std::sync::Arc;

pub use create_user::CreateUser;
use jiff::Timestamp;
use uuid::Uuid;
use warden_core::{NewUser, User, UserStore};

use crate::service::security::validation::{
    MAX_PASSWORD_BYTES, normalize_email, normalize_optional, normalize_username, validate_password,
};
use crate::service::security::{PasswordHasher, PasswordStrength};
use crate::utility::tracing_targets::TRACING_TARGET_CREDENTIAL as TRACING_TARGET;
use crate::{Error, ErrorKind, Result};

/// Identity lookups, registration and authentication over a [`UserStore`].
///
/// Cloning is cheap; clones share the store and the hasher.
pub struct CredentialService<S> {
    store: Arc<S>,
    hasher: PasswordHasher,
    strength: PasswordStrength,
}

impl<S> Clone for CredentialService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            hasher: self.hasher.clone(),
            strength: self.strength,
        }
    }
}

impl<S> std::fmt::Debug for CredentialService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialService")
            .field("hasher", &self.hasher)
            .field("strength", &self.strength)
            .finish_non_exhaustive()
    }
}

impl<S: UserStore> CredentialService<S> {
    /// Creates a service with the default hasher and no strength policy.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            hasher: PasswordHasher::new(),
            strength: PasswordStrength::default(),
        }
    }

    /// Replaces the password hasher.
    pub fn with_password_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Replaces the password strength policy.
    pub fn with_password_strength(mut self, strength: PasswordStrength) -> Self {
        self.strength = strength;
        self
    }

    /// Returns the backing store.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Finds an identity by id, or fails with [`ErrorKind::NotFound`].
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("no user with id {user_id}")))
    }

    /// Finds an identity by email, or fails with [`ErrorKind::NotFound`].
    ///
    /// The email is trimmed and lowercased before the lookup.
    pub async fn find_by_email(&self, email: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        self.store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| Error::not_found("no user with this email"))
    }

    /// Returns every identity, oldest first.
    ///
    /// Unpaginated; intended for small internal deployments.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        self.store.list_users().await
    }

    /// Registers a new identity.
    ///
    /// # Arguments
    ///
    /// * `request` - Username, email, plaintext password and optional profile
    ///
    /// # Returns
    ///
    /// The stored record. It still carries the password hash; expose it
    /// through [`User::view`] only.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Validation`] on malformed input, a weak password when a
    ///   strength policy is set, or an unknown role
    /// - [`ErrorKind::Conflict`] if the email or username is taken
    /// - [`ErrorKind::Unavailable`] if the store cannot be reached
    ///
    /// The email pre-check only saves hashing work; the store's atomic
    /// insert is what guarantees uniqueness under concurrency.
    #[tracing::instrument(skip_all, target = TRACING_TARGET)]
    pub async fn create(&self, request: CreateUser) -> Result<User> {
        let username = normalize_username(&request.username)?;
        let email = normalize_email(&request.email)?;
        validate_password(&request.password)?;
        self.strength
            .validate_password(&request.password, &[username.as_str(), email.as_str()])?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            tracing::debug!(target: TRACING_TARGET, "Registration rejected: email taken");
            return Err(Error::conflict("email is already registered"));
        }

        if let Some(role_id) = request.role_id
            && self.store.find_role(role_id).await?.is_none()
        {
            return Err(Error::validation(format!("role {role_id} does not exist")));
        }

        let password_hash = self.hasher.hash_password_blocking(request.password).await?;

        let new_user = NewUser {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            name: normalize_optional(request.name),
            address: normalize_optional(request.address),
            phone_number: normalize_optional(request.phone_number),
            role_id: request.role_id,
            registration_date: Timestamp::now(),
        };

        let user = self.store.insert_user(new_user).await.inspect_err(|e| {
            if e.kind() == ErrorKind::Conflict {
                tracing::debug!(
                    target: TRACING_TARGET,
                    "Registration rejected by store uniqueness check"
                );
            }
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user.id,
            role_id = ?user.role_id,
            "User registered"
        );

        Ok(user)
    }

    /// Checks an email and password pair.
    ///
    /// # Arguments
    ///
    /// * `email` - Trimmed and lowercased before the lookup
    /// * `password` - Plaintext password to verify
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidCredentials`] for an unknown email or a wrong
    ///   password, with the same message in both cases
    /// - [`ErrorKind::Unavailable`] if the store cannot be reached
    /// - [`ErrorKind::Internal`] if the stored hash cannot be parsed
    ///
    /// # Security Notes
    ///
    /// - For an unknown email a dummy hash is verified, so both failure paths
    ///   cost about the same
    /// - Hash comparison is constant time and runs on the blocking pool
    #[tracing::instrument(skip_all, target = TRACING_TARGET)]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        if password.is_empty() || password.len() > MAX_PASSWORD_BYTES {
            return Err(Error::invalid_credentials());
        }

        let email = email.trim().to_lowercase();
        let user = self.store.find_user_by_email(&email).await?;
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());

        let outcome = self
            .hasher
            .verify_password_blocking(password.to_owned(), stored_hash)
            .await;

        match (outcome, user) {
            (Ok(()), Some(user)) => {
                tracing::info!(target: TRACING_TARGET, user_id = %user.id, "User authenticated");
                Ok(user)
            }
            (Err(e), _) if e.kind() != ErrorKind::InvalidCredentials => Err(e),
            _ => {
                tracing::debug!(target: TRACING_TARGET, "Authentication failed");
                Err(Error::invalid_credentials())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use warden_core::Role;
    use warden_test::MemoryUserStore;

    use super::*;

    fn service(store: MemoryUserStore) -> anyhow::Result<CredentialService<MemoryUserStore>> {
        Ok(CredentialService::new(store).with_password_hasher(PasswordHasher::with_params(1024, 1, 1)?))
    }

    fn alice() -> CreateUser {
        CreateUser::new("alice", "alice@example.com", "s3cret!")
    }

    #[tokio::test]
    async fn alice_registers_and_authenticates() -> anyhow::Result<()> {
        let store = MemoryUserStore::with_default_roles();
        let credentials = service(store.clone())?;

        let created = credentials.create(alice()).await?;
        assert_eq!(created.username, "alice");
        assert_eq!(created.email, "alice@example.com");
        assert_ne!(created.password_hash, "s3cret!");
        assert!(created.password_hash.starts_with("$argon2id$"));

        let authenticated = credentials.authenticate("alice@example.com", "s3cret!").await?;
        assert_eq!(authenticated.id, created.id);

        let err = credentials
            .authenticate("alice@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);

        let err = credentials.create(alice()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(store.user_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_alike() -> anyhow::Result<()> {
        let credentials = service(MemoryUserStore::new())?;
        credentials.create(alice()).await?;

        let wrong_password = credentials
            .authenticate("alice@example.com", "wrong")
            .await
            .unwrap_err();
        let unknown_email = credentials
            .authenticate("mallory@example.com", "s3cret!")
            .await
            .unwrap_err();

        assert_eq!(wrong_password.kind(), unknown_email.kind());
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        Ok(())
    }

    #[tokio::test]
    async fn email_is_normalized() -> anyhow::Result<()> {
        let credentials = service(MemoryUserStore::new())?;
        let created = credentials
            .create(CreateUser::new(" alice ", " Alice@Example.com ", "s3cret!"))
            .await?;

        assert_eq!(created.email, "alice@example.com");
        assert_eq!(credentials.find_by_email("ALICE@example.com").await?.id, created.id);
        credentials.authenticate("ALICE@EXAMPLE.COM", "s3cret!").await?;

        let err = credentials
            .create(CreateUser::new("alice2", "alice@EXAMPLE.com", "other"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        let credentials = service(store.clone())?;

        credentials
            .create(CreateUser::new("alice", "a@example.com", "s3cret!"))
            .await?;
        let err = credentials
            .create(CreateUser::new("alice", "b@example.com", "s3cret!"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.message().contains("username"));
        assert_eq!(store.user_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn list_all_returns_users_in_registration_order() -> anyhow::Result<()> {
        let credentials = service(MemoryUserStore::new())?;
        assert!(credentials.list_all().await?.is_empty());

        let first = credentials.create(alice()).await?;
        let second = credentials
            .create(CreateUser::new("bob", "bob@example.com", "hunter22"))
            .await?;

        let users = credentials.list_all().await?;
        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, [first.id, second.id]);
        Ok(())
    }

    #[tokio::test]
    async fn lookups_report_not_found() -> anyhow::Result<()> {
        let credentials = service(MemoryUserStore::new())?;

        let err = credentials.find_by_id(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = credentials.find_by_email("nobody@example.com").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_storage() -> anyhow::Result<()> {
        let store = MemoryUserStore::with_default_roles();
        let credentials = service(store.clone())?;

        let cases = [
            CreateUser::new("", "bob@example.com", "pw"),
            CreateUser::new("bob", "not-an-email", "pw"),
            CreateUser::new("bob", "bob@example.com", ""),
            CreateUser::new("bob", "bob@example.com", "pw").with_role(99),
        ];
        for request in cases {
            let err = credentials.create(request).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert_eq!(store.user_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn role_and_profile_are_persisted() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        let customer = store.add_role(Role::CUSTOMER);
        let credentials = service(store)?;

        let created = credentials
            .create(
                CreateUser::new("carol", "carol@example.com", "pw")
                    .with_role(customer.id)
                    .with_name(" Carol ")
                    .with_phone_number("  "),
            )
            .await?;

        assert_eq!(created.role_id, Some(customer.id));
        assert_eq!(created.name.as_deref(), Some("Carol"));
        assert_eq!(created.phone_number, None);
        Ok(())
    }

    #[tokio::test]
    async fn weak_passwords_fail_when_policy_is_enabled() -> anyhow::Result<()> {
        let credentials =
            service(MemoryUserStore::new())?.with_password_strength(PasswordStrength::with_min_score(3));

        let err = credentials
            .create(CreateUser::new("dave", "dave@example.com", "password"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_creates_succeed_once() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        let credentials = service(store.clone())?;

        let (first, second) = tokio::join!(
            credentials.create(CreateUser::new("erin", "erin@example.com", "pw-one")),
            credentials.create(CreateUser::new("erin2", "erin@example.com", "pw-two")),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        let failure = outcomes.into_iter().find_map(|r| r.err());
        assert_eq!(failure.map(|e| e.kind()), Some(ErrorKind::Conflict));
        assert_eq!(store.user_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn store_outage_is_unavailable() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        let credentials = service(store.clone())?;
        store.set_unavailable(true);

        let err = credentials
            .authenticate("alice@example.com", "s3cret!")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);

        let err = credentials.create(alice()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        Ok(())
    }
}
