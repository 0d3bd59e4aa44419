#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod events;
mod registry;

use std::process;
use std::sync::Arc;

use anyhow::Context;
use conduit_reqwest::ReqwestTransport;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "conduit_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "conduit_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "conduit_cli::config";
pub const TRACING_TARGET_REPLAY: &str = "conduit_cli::replay";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "command finished successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "command failed"
        );
    }
    eprintln!("Error: {error:#}");

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();

    let registry = registry::registry().context("failed to build integration registry")?;
    let transport =
        ReqwestTransport::new(cli.http.clone()).context("failed to create HTTP transport")?;

    commands::execute(
        cli.command,
        Arc::new(registry),
        &transport,
        cli.webhooks_base_url.as_ref(),
    )
    .await
}
