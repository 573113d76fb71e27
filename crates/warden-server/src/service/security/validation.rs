//! Input validation and normalization for identity fields.

use validator::ValidateEmail;

use crate::{Error, Result};

/// Maximum email length, per RFC 5321.
pub const MAX_EMAIL_LEN: usize = 254;

/// Maximum username length in characters.
pub const MAX_USERNAME_LEN: usize = 64;

/// Maximum password length in bytes. Bounds the hashing cost of one request.
pub const MAX_PASSWORD_BYTES: usize = 1024;

/// Trims and lowercases an email, then checks that it is well-formed.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(Error::validation("email must not be empty"));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(Error::validation(format!(
            "email must be at most {MAX_EMAIL_LEN} characters"
        )));
    }
    if !email.validate_email() {
        return Err(Error::validation("email is not a valid address"));
    }

    Ok(email)
}

/// Trims a username and checks its length and characters.
pub fn normalize_username(username: &str) -> Result<String> {
    let username = username.trim();

    if username.is_empty() {
        return Err(Error::validation("username must not be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(Error::validation(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if username.chars().any(char::is_control) {
        return Err(Error::validation(
            "username must not contain control characters",
        ));
    }

    Ok(username.to_owned())
}

/// Checks that a password is present and within the hashing bound.
///
/// The password is not trimmed; whitespace is significant.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::validation("password must not be empty"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(Error::validation(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Trims an optional profile field, dropping it when blank.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
