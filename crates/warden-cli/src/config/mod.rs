//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── log_format: LogFormat        # text or json
//! └── command: Command
//!     ├── migrate | seed | users   # DatabaseArgs
//!     ├── register | login | refresh
//!     │                            # ServiceArgs: database, tokens, provider
//!     └── verify                   # TokenConfig only
//! ```
//!
//! All configuration can be provided via CLI arguments or environment
//! variables. Use `--help` on any subcommand to see its options.

mod args;

pub use args::{DatabaseArgs, ServiceArgs};
use clap::{Parser, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::command::Command;

/// Output format of log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, colored when attached to a terminal.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Complete CLI configuration.
#[derive(Debug, Parser)]
#[command(name = "warden")]
#[command(about = "Credential store and token authority for Warden")]
#[command(version)]
pub struct Cli {
    /// Log output format
    #[arg(
        long = "log-format",
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text,
        global = true
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its values
    /// act as `env` defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// `RUST_LOG` selects what is logged and defaults to `info`. Logs go to
    /// stderr so command output on stdout stays machine-readable.
    pub fn init_tracing(&self) -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        let result = match self.log_format {
            LogFormat::Text => registry
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init(),
        };

        result.map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))
    }
}
