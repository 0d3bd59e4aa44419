//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── webhooks_base_url   # public base URL for webhook links
//! ├── http: ReqwestConfig # transport timeout and user agent
//! └── command: Command    # subcommand to run
//! ```
//!
//! Every option can be provided as an argument or environment variable.
//!
//! # Example
//!
//! ```bash
//! conduit --http-timeout 10 sync jenkins --config jenkins.json
//! WEBHOOKS_BASE_URL="https://hooks.example.com" conduit sync jenkins --config jenkins.json
//! ```

mod command;

use std::process;

pub use command::Command;
use clap::Parser;
use conduit_reqwest::ReqwestConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "conduit")]
#[command(about = "Drive conduit integrations against an in-memory host")]
#[command(version)]
pub struct Cli {
    /// Public base URL under which webhooks are served.
    #[arg(long, env = "WEBHOOKS_BASE_URL", global = true)]
    pub webhooks_base_url: Option<Url>,

    /// HTTP transport configuration.
    #[clap(flatten)]
    pub http: ReqwestConfig,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads the `.env` file (if enabled) and parses arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from `.env` so clap can use them as defaults.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with `RUST_LOG` filtering, `info` by default.
    ///
    /// Logs go to stderr so command output on stdout stays parseable.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            webhooks_base_url = ?self.webhooks_base_url.as_ref().map(Url::as_str),
            http_timeout_secs = self.http.effective_timeout().as_secs(),
            user_agent = %self.http.effective_user_agent(),
            command = self.command.name(),
            "cli configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_parse_sync() {
        let cli = Cli::try_parse_from([
            "conduit",
            "--http-timeout",
            "5",
            "sync",
            "jenkins",
            "--config",
            "jenkins.json",
            "--webhooks-base-url",
            "https://hooks.example.com",
        ])
        .unwrap();

        assert_eq!(cli.http.http_timeout, 5);
        assert_eq!(
            cli.webhooks_base_url.as_ref().map(Url::as_str),
            Some("https://hooks.example.com/")
        );
        match cli.command {
            Command::Sync {
                integration,
                config,
            } => {
                assert_eq!(integration, "jenkins");
                assert_eq!(config, PathBuf::from("jenkins.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_replay_headers() {
        let cli = Cli::try_parse_from([
            "conduit",
            "replay",
            "jenkins.onBuildFinished",
            "--trigger-config",
            r#"{"job":"my-job"}"#,
            "--body",
            "payload.json",
            "--header",
            "X-Jenkins-Event=build",
        ])
        .unwrap();

        let Command::Replay {
            trigger, header, ..
        } = cli.command
        else {
            panic!("expected replay");
        };
        assert_eq!(trigger, "jenkins.onBuildFinished");
        assert_eq!(header, vec![("X-Jenkins-Event".to_owned(), "build".to_owned())]);
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = Cli::try_parse_from([
            "conduit",
            "--webhooks-base-url",
            "not a url",
            "integrations",
        ]);
        assert!(result.is_err());
    }
}
