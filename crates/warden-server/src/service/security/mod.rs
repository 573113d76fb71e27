//! Password handling, input validation and token signing keys.

mod password_hasher;
mod password_strength;
mod token_keys;
pub mod validation;

pub use password_hasher::PasswordHasher;
pub use password_strength::{MAX_PASSWORD_SCORE, PasswordStrength, PasswordStrengthResult};
pub use token_keys::{MIN_SECRET_LEN, TokenKeys};
