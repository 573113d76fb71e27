#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for identity provider operations.
pub const TRACING_TARGET_PROVIDER: &str = "warden_core::provider";

mod error;
pub mod provider;
pub mod store;
pub mod user;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use provider::{AuthResult, IdentityProvider, IdentityService, SignUpOutcome, SignUpRequest};
pub use store::UserStore;
pub use user::{NewUser, Role, RoleId, User, UserView};
