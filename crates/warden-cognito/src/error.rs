//! Error types for user pool calls.

use warden_core::ErrorKind;

/// Specialized [`Result`] type for user pool operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Service name reported in converted errors.
const SERVICE: &str = "cognito";

/// Error returned by [`CognitoClient`] operations.
///
/// [`CognitoClient`]: crate::CognitoClient
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced a response: connect failure, timeout or
    /// broken connection.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The user pool answered with an error document.
    #[error("User pool error {status} ({error_type}): {message}")]
    Api {
        status: u16,
        /// Exception name, e.g. `NotAuthorizedException`.
        error_type: String,
        message: String,
    },

    /// The user pool answered with neither tokens nor a challenge.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Creates an API error, stripping any namespace prefix from the type.
    pub fn api(status: u16, error_type: &str, message: impl Into<String>) -> Self {
        let error_type = error_type
            .rsplit_once('#')
            .map_or(error_type, |(_, name)| name)
            .split(':')
            .next()
            .unwrap_or_default()
            .to_owned();

        Self::Api {
            status,
            error_type,
            message: message.into(),
        }
    }

    /// Returns the exception name for API errors.
    pub fn error_type(&self) -> Option<&str> {
        match self {
            Self::Api { error_type, .. } => Some(error_type),
            _ => None,
        }
    }

    /// Classifies this error into the service taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Http(_) => ErrorKind::Unavailable,
            Self::Serde(_) | Self::UnexpectedResponse(_) => ErrorKind::Internal,
            Self::Api {
                status, error_type, ..
            } => match error_type.as_str() {
                "NotAuthorizedException" | "UserNotFoundException" => {
                    ErrorKind::InvalidCredentials
                }
                "UsernameExistsException" | "AliasExistsException" => ErrorKind::Conflict,
                "InvalidParameterException"
                | "InvalidPasswordException"
                | "CodeMismatchException"
                | "ExpiredCodeException" => ErrorKind::Validation,
                "TooManyRequestsException" | "LimitExceededException" => ErrorKind::Unavailable,
                _ if *status >= 500 => ErrorKind::Unavailable,
                _ => ErrorKind::Internal,
            },
        }
    }
}

impl From<Error> for warden_core::Error {
    fn from(error: Error) -> Self {
        let kind = error.kind();
        let converted = match kind {
            ErrorKind::InvalidCredentials => warden_core::Error::invalid_credentials(),
            ErrorKind::Unavailable => {
                warden_core::Error::unavailable(SERVICE, "user pool is unreachable")
            }
            ErrorKind::Internal => warden_core::Error::internal(SERVICE, error.to_string()),
            _ => {
                let message = match &error {
                    Error::Api { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                warden_core::Error::new(kind, message)
            }
        };

        converted.with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaced_types_are_stripped() {
        let err = Error::api(
            400,
            "com.amazonaws.cognito.identity.idp.model#UsernameExistsException",
            "exists",
        );
        assert_eq!(err.error_type(), Some("UsernameExistsException"));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn provider_errors_map_to_kinds() {
        let kind = |name: &str, status: u16| Error::api(status, name, "").kind();

        assert_eq!(kind("NotAuthorizedException", 400), ErrorKind::InvalidCredentials);
        assert_eq!(kind("UserNotFoundException", 400), ErrorKind::InvalidCredentials);
        assert_eq!(kind("UsernameExistsException", 400), ErrorKind::Conflict);
        assert_eq!(kind("InvalidPasswordException", 400), ErrorKind::Validation);
        assert_eq!(kind("CodeMismatchException", 400), ErrorKind::Validation);
        assert_eq!(kind("ExpiredCodeException", 400), ErrorKind::Validation);
        assert_eq!(kind("InternalErrorException", 500), ErrorKind::Unavailable);
        assert_eq!(kind("ResourceNotFoundException", 400), ErrorKind::Internal);
    }

    #[test]
    fn conversion_keeps_uniform_credentials_message() {
        let converted: warden_core::Error =
            Error::api(400, "UserNotFoundException", "User does not exist.").into();
        assert_eq!(converted.kind(), ErrorKind::InvalidCredentials);
        assert_eq!(converted.to_string(), warden_core::Error::invalid_credentials().to_string());
    }
}
