use std::fmt;

use warden_core::{RoleId, SignUpRequest};

/// Registration input for [`CredentialService::create`].
///
/// [`CredentialService::create`]: super::CredentialService::create
#[derive(Clone, PartialEq, Eq)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    /// Plaintext password; hashed before it reaches the store.
    pub password: String,
    pub role_id: Option<RoleId>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl CreateUser {
    /// Sign-up attribute carrying the display name.
    pub const ATTRIBUTE_NAME: &'static str = "name";
    /// Sign-up attribute carrying the postal address.
    pub const ATTRIBUTE_ADDRESS: &'static str = "address";
    /// Sign-up attribute carrying the phone number.
    pub const ATTRIBUTE_PHONE_NUMBER: &'static str = "phone_number";

    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role_id: None,
            name: None,
            address: None,
            phone_number: None,
        }
    }

    pub fn with_role(mut self, role_id: RoleId) -> Self {
        self.role_id = Some(role_id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }
}

impl From<SignUpRequest> for CreateUser {
    fn from(mut request: SignUpRequest) -> Self {
        Self {
            name: request.attributes.remove(Self::ATTRIBUTE_NAME),
            address: request.attributes.remove(Self::ATTRIBUTE_ADDRESS),
            phone_number: request.attributes.remove(Self::ATTRIBUTE_PHONE_NUMBER),
            username: request.username,
            email: request.email,
            password: request.password,
            role_id: request.role_id,
        }
    }
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role_id", &self.role_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_up_attributes_map_to_profile_fields() {
        let request = SignUpRequest::new("alice", "alice@example.com", "s3cret!")
            .with_role(2)
            .with_attribute("name", "Alice")
            .with_attribute("phone_number", "+15550100")
            .with_attribute("nickname", "al");

        let create = CreateUser::from(request);
        assert_eq!(create.name.as_deref(), Some("Alice"));
        assert_eq!(create.phone_number.as_deref(), Some("+15550100"));
        assert_eq!(create.address, None);
        assert_eq!(create.role_id, Some(2));
    }

    #[test]
    fn debug_redacts_password() {
        let create = CreateUser::new("alice", "alice@example.com", "s3cret!");
        assert!(!format!("{create:?}").contains("s3cret!"));
    }
}
