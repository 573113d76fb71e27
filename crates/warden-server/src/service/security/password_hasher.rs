//! Password hashing and verification using Argon2id.
//!
//! Hashes are stored in PHC string format, so algorithm, parameters and salt
//! travel with the hash and verification needs no extra configuration.

use std::sync::Arc;

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};
use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::task::spawn_blocking;

use crate::utility::tracing_targets::TRACING_TARGET_PASSWORD_HASHER as TRACING_TARGET;
use crate::{Error, Result};

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// Argon2id hashing service.
///
/// Cloning is cheap. Hashing is CPU-bound; async callers should use
/// [`hash_password_blocking`] and [`verify_password_blocking`], which run on
/// the blocking thread pool.
///
/// [`hash_password_blocking`]: PasswordHasher::hash_password_blocking
/// [`verify_password_blocking`]: PasswordHasher::verify_password_blocking
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash of a random password, verified against when no account exists.
    dummy_hash: Option<Arc<str>>,
}

impl PasswordHasher {
    /// Creates a hasher with the Argon2id default parameters.
    pub fn new() -> Self {
        Self::from_argon2(Argon2::default())
    }

    /// Creates a hasher with explicit cost parameters.
    ///
    /// `m_cost` is in KiB. Lower costs are only appropriate for tests.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| Error::config(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self::from_argon2(Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            params,
        )))
    }

    fn from_argon2(argon2: Argon2<'static>) -> Self {
        let mut this = Self {
            argon2,
            dummy_hash: None,
        };

        this.dummy_hash = this
            .hash_password(&random_password())
            .ok()
            .map(Arc::from);
        this
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; SALT_LEN];
        rand::rng().fill(&mut salt_bytes);

        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "Failed to encode password salt"
            );
            Error::internal("password_hasher", "salt generation failed")
        })?;

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "Password hashing failed"
                );
                Error::internal("password_hasher", "password hashing failed")
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored PHC hash in constant time.
    ///
    /// A wrong password is [`ErrorKind::InvalidCredentials`]; a hash that
    /// cannot be parsed is [`ErrorKind::Internal`].
    ///
    /// [`ErrorKind::InvalidCredentials`]: crate::ErrorKind::InvalidCredentials
    /// [`ErrorKind::Internal`]: crate::ErrorKind::Internal
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<()> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "Stored password hash is malformed"
            );
            Error::internal("password_hasher", "stored password hash is malformed")
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(()),
            Err(ArgonError::Password) => {
                tracing::debug!(target: TRACING_TARGET, "Password mismatch");
                Err(Error::invalid_credentials())
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "Password verification failed"
                );
                Err(Error::internal("password_hasher", "password verification failed"))
            }
        }
    }

    /// Spends the same work as a real verification and always fails.
    ///
    /// Used when no account matches, so a missing email takes as long as a
    /// wrong password.
    pub fn verify_dummy_password(&self, password: &str) -> Error {
        match &self.dummy_hash {
            Some(hash) => {
                let _ = self.verify_password(password, hash);
            }
            None => {
                if let Ok(hash) = self.hash_password(&random_password()) {
                    let _ = self.verify_password(password, &hash);
                }
            }
        }

        Error::invalid_credentials()
    }

    /// Hashes on the blocking thread pool.
    pub async fn hash_password_blocking(&self, password: String) -> Result<String> {
        let this = self.clone();
        spawn_blocking(move || this.hash_password(&password))
            .await
            .map_err(|e| {
                tracing::error!(target: TRACING_TARGET, error = %e, "Hashing task failed");
                Error::internal("password_hasher", "hashing task failed")
            })?
    }

    /// Verifies on the blocking thread pool.
    ///
    /// With `stored_hash = None` a dummy verification runs and the result is
    /// always [`ErrorKind::InvalidCredentials`].
    ///
    /// [`ErrorKind::InvalidCredentials`]: crate::ErrorKind::InvalidCredentials
    pub async fn verify_password_blocking(
        &self,
        password: String,
        stored_hash: Option<String>,
    ) -> Result<()> {
        let this = self.clone();
        spawn_blocking(move || match stored_hash {
            Some(hash) => this.verify_password(&password, &hash),
            None => Err(this.verify_dummy_password(&password)),
        })
        .await
        .map_err(|e| {
            tracing::error!(target: TRACING_TARGET, error = %e, "Verification task failed");
            Error::internal("password_hasher", "verification task failed")
        })?
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

fn random_password() -> String {
    let len = rand::random_range(16..32);
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
