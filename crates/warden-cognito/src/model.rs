//! Wire types of the user pool JSON protocol.
//!
//! Field names follow the protocol's PascalCase convention.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use warden_core::AuthResult;

/// `InitiateAuth` flow for email and password sign-in.
pub const USER_PASSWORD_AUTH: &str = "USER_PASSWORD_AUTH";
/// `InitiateAuth` flow for exchanging a refresh token.
pub const REFRESH_TOKEN_AUTH: &str = "REFRESH_TOKEN_AUTH";

/// A user attribute as sent and returned by the user pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeType {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl AttributeType {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InitiateAuthRequest<'a> {
    pub auth_flow: &'a str,
    pub client_id: &'a str,
    pub auth_parameters: HashMap<&'static str, &'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InitiateAuthResponse {
    #[serde(default)]
    pub authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    pub challenge_name: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub challenge_parameters: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AuthenticationResult {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl From<AuthenticationResult> for AuthResult {
    fn from(result: AuthenticationResult) -> Self {
        AuthResult {
            access_token: result.access_token,
            id_token: result.id_token,
            refresh_token: result.refresh_token,
            token_type: result.token_type,
            expires_in: result.expires_in,
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SignUpRequest<'a> {
    pub client_id: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub user_attributes: Vec<AttributeType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SignUpResponse {
    #[serde(default)]
    pub user_confirmed: bool,
    pub user_sub: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ConfirmSignUpRequest<'a> {
    pub client_id: &'a str,
    pub username: &'a str,
    pub confirmation_code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetUserRequest<'a> {
    pub access_token: &'a str,
}

/// Profile returned by [`CognitoClient::get_user`].
///
/// [`CognitoClient::get_user`]: crate::CognitoClient::get_user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteUser {
    pub username: String,
    #[serde(default)]
    pub user_attributes: Vec<AttributeType>,
}

impl RemoteUser {
    /// Returns the value of the named attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.user_attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .and_then(|attribute| attribute.value.as_deref())
    }
}

/// Error document returned with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default, rename = "__type")]
    pub error_type: Option<String>,
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}
