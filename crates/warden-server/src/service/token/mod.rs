//! Token Authority: signed, expiring access and refresh tokens.

mod authority;
mod claims;
mod config;

pub use authority::{TokenAuthority, TokenKind, TokenPair};
pub use claims::TokenClaims;
pub use config::TokenConfig;
