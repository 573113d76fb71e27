//! Error taxonomy shared by every Warden crate.
//!
//! Storage backends, token handling and identity providers all report failures
//! as an [`Error`] carrying one [`ErrorKind`]. Callers branch on the kind and
//! never on the message, which is meant for logs and operators.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for Warden operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error kind enumeration for categorizing failures.
///
/// Separated from [`Error`] so callers can pattern match on the category
/// without inspecting the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No identity matched the lookup.
    NotFound,
    /// A uniqueness rule was violated on create.
    Conflict,
    /// Authentication failed.
    ///
    /// Unknown email and wrong password both report this kind with the same
    /// message.
    InvalidCredentials,
    /// Token signature, structure or expiry check failed.
    InvalidToken,
    /// Malformed input.
    Validation,
    /// Backing store or remote provider unreachable or timed out.
    Unavailable,
    /// Invalid configuration at startup.
    Config,
    /// Unexpected internal failure.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    ///
    /// Useful for metrics, logging, or error categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidToken => "invalid_token",
            Self::Validation => "validation",
            Self::Unavailable => "unavailable",
            Self::Config => "config",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error with a kind, a message and an optional source.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Message shared by every authentication failure.
    pub const INVALID_CREDENTIALS: &'static str = "invalid email or password";

    /// Creates a new [`Error`].
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a new not found error.
    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates a new conflict error.
    #[inline]
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Creates the uniform authentication failure.
    #[inline]
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, Self::INVALID_CREDENTIALS)
    }

    /// Creates a new invalid token error.
    #[inline]
    pub fn invalid_token(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }

    /// Creates a new validation error.
    #[inline]
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Creates a new unavailable error.
    #[inline]
    pub fn unavailable(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let full_message = format!("{}: {}", service.into(), message.into());
        Self::new(ErrorKind::Unavailable, full_message)
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a new internal error.
    #[inline]
    pub fn internal(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let full_message = format!("{}: {}", service.into(), message.into());
        Self::new(ErrorKind::Internal, full_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_creation() {
        let error = Error::config("token secret is too short");
        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(error.message(), "token secret is too short");
    }

    #[test]
    fn error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::TimedOut, "pool timed out");
        let error = Error::unavailable("postgres", "connection unavailable").with_source(source);

        assert!(StdError::source(&error).is_some());
        assert_eq!(error.kind(), ErrorKind::Unavailable);
        assert!(error.to_string().contains("postgres"));
    }

    #[test]
    fn invalid_credentials_is_uniform() {
        let a = Error::invalid_credentials();
        let b = Error::invalid_credentials();

        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.message(), Error::INVALID_CREDENTIALS);
    }

    #[test]
    fn error_kind_as_str() {
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(ErrorKind::Conflict.as_str(), "conflict");
        assert_eq!(ErrorKind::InvalidCredentials.as_str(), "invalid_credentials");
        assert_eq!(ErrorKind::InvalidToken.as_str(), "invalid_token");
        assert_eq!(ErrorKind::Validation.as_str(), "validation");
        assert_eq!(ErrorKind::Unavailable.as_str(), "unavailable");
    }
}
