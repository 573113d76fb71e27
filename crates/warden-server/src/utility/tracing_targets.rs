//! Tracing target constants for structured logging.
//!
//! Every log line in this crate uses one of these targets, so output can be
//! filtered per concern with `RUST_LOG`, e.g.
//! `RUST_LOG=warden_server::service::token=debug`.

/// Identity lookups, registration and authentication.
pub const TRACING_TARGET_CREDENTIAL: &str = "warden_server::service::credential";

/// Token issuance, validation and refresh.
pub const TRACING_TARGET_TOKEN: &str = "warden_server::service::token";

/// Password hashing and verification.
pub const TRACING_TARGET_PASSWORD_HASHER: &str = "warden_server::service::password_hasher";

/// Password strength evaluation.
pub const TRACING_TARGET_PASSWORD_STRENGTH: &str = "warden_server::service::password_strength";

/// Signing key loading and self-checks.
pub const TRACING_TARGET_TOKEN_KEYS: &str = "warden_server::service::token_keys";

/// PostgreSQL-backed identity store.
pub const TRACING_TARGET_STORE: &str = "warden_server::service::store";

/// Service configuration and state wiring.
pub const TRACING_TARGET_CONFIG: &str = "warden_server::service::config";

/// Local, store-backed identity provider.
pub const TRACING_TARGET_LOCAL_PROVIDER: &str = "warden_server::service::provider::local";
