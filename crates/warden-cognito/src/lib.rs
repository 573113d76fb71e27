#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for client construction and request dispatch.
pub const TRACING_TARGET_CLIENT: &str = "warden_cognito::client";

/// Tracing target for identity provider operations.
pub const TRACING_TARGET_PROVIDER: &str = "warden_cognito::provider";

mod client;
mod config;
mod error;
pub mod model;
mod provider;

pub use crate::client::CognitoClient;
pub use crate::config::{CognitoConfig, DEFAULT_REGION};
pub use crate::error::{Error, Result};
