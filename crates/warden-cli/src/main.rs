#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;

use std::process;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "warden_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "warden_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "warden_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "warden_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "command completed successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        let message = format!("{error:#}");
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %message,
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    cli.init_tracing()?;
    log_startup_info(cli.command.name());

    cli.command.execute().await
}

/// Logs startup information.
fn log_startup_info(command: &'static str) {
    tracing::debug!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        command,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        features = ?enabled_features(),
        "build information"
    );
}

/// Returns a list of enabled compile-time features.
fn enabled_features() -> Vec<&'static str> {
    [cfg!(feature = "dotenv").then_some("dotenv")]
        .into_iter()
        .flatten()
        .collect()
}
