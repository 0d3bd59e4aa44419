//! Subcommands.

use std::path::PathBuf;

use clap::Subcommand;

/// Operation to run against the in-memory host.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Lists registered integrations with their schemas as JSON.
    Integrations,

    /// Verifies credentials and prepares an integration.
    Sync {
        /// Integration name, e.g. `jenkins`.
        integration: String,
        /// JSON file holding the integration configuration.
        #[arg(long)]
        config: PathBuf,
    },

    /// Lists resources of one type exposed by an integration.
    Resources {
        /// Integration name, e.g. `jfrogArtifactory`.
        integration: String,
        /// Resource type, e.g. `job` or `repository`.
        resource_type: String,
        /// JSON file holding the integration configuration.
        #[arg(long)]
        config: PathBuf,
    },

    /// Runs a webhook body through the dispatcher.
    Replay {
        /// Trigger name, e.g. `jenkins.onBuildFinished`.
        trigger: String,
        /// Trigger configuration as inline JSON.
        #[arg(long, default_value = "{}")]
        trigger_config: String,
        /// File holding the raw webhook body.
        #[arg(long)]
        body: PathBuf,
        /// Request header as `name=value`; may be repeated.
        #[arg(long, value_parser = parse_header)]
        header: Vec<(String, String)>,
    },
}

impl Command {
    /// Returns the subcommand name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integrations => "integrations",
            Self::Sync { .. } => "sync",
            Self::Resources { .. } => "resources",
            Self::Replay { .. } => "replay",
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_owned(), value.trim().to_owned()))
        }
        _ => Err(format!("expected name=value, got `{raw}`")),
    }
}
