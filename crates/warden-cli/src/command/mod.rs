//! Subcommands and their handlers.

mod database;
mod identity;

use clap::Subcommand;
use serde::Serialize;

pub use self::database::{migrate, seed, users};
pub use self::identity::{LoginArgs, RefreshArgs, RegisterArgs, VerifyArgs};
use crate::config::DatabaseArgs;

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply pending migrations and print the migration status
    Migrate(DatabaseArgs),
    /// Create the default roles if they are missing
    Seed(DatabaseArgs),
    /// Print every user as JSON, without password hashes
    Users(DatabaseArgs),
    /// Register a user and print it as JSON
    Register(RegisterArgs),
    /// Sign in and print the tokens or challenge as JSON
    Login(LoginArgs),
    /// Exchange a refresh token and print the new tokens as JSON
    Refresh(RefreshArgs),
    /// Validate a token and print its subject
    Verify(VerifyArgs),
}

impl Command {
    /// Returns the subcommand name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Migrate(_) => "migrate",
            Self::Seed(_) => "seed",
            Self::Users(_) => "users",
            Self::Register(_) => "register",
            Self::Login(_) => "login",
            Self::Refresh(_) => "refresh",
            Self::Verify(_) => "verify",
        }
    }

    /// Runs the subcommand to completion.
    pub async fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Migrate(args) => migrate(args).await,
            Self::Seed(args) => seed(args).await,
            Self::Users(args) => users(args).await,
            Self::Register(args) => args.execute().await,
            Self::Login(args) => args.execute().await,
            Self::Refresh(args) => args.execute().await,
            Self::Verify(args) => args.execute(),
        }
    }
}

/// Prints a value to stdout as pretty JSON.
fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
