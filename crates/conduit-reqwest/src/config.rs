//! Settings of the outbound transport used by integrations.
//!
//! Every lifecycle call (sync, setup, execute) makes at most one remote call
//! through the transport. The timeout here bounds that single call; the
//! transport never retries, so a timed-out call surfaces as a retryable
//! transport error to the host.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Per-call timeout used when none (or zero) is configured, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Timeout and identification of calls to Jenkins, Artifactory and other
/// remote services.
///
/// Deserializes from an empty object; with the `config` feature it can be
/// flattened into a CLI parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ReqwestConfig {
    /// Seconds to wait for a remote service before failing the call
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "HTTP_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)
    )]
    #[serde(default = "ReqwestConfig::default_timeout")]
    pub http_timeout: u64,

    /// User-Agent sent to remote services, `conduit/<version>` when unset
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "HTTP_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ReqwestConfig {
    fn default() -> Self {
        Self {
            http_timeout: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ReqwestConfig {
    fn default_timeout() -> u64 {
        DEFAULT_TIMEOUT_SECS
    }

    /// Returns the effective timeout, using the default if zero.
    pub fn effective_timeout(&self) -> Duration {
        match self.http_timeout {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    /// Returns the effective user agent, using the default if unset or empty.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .filter(|agent| !agent.trim().is_empty())
            .unwrap_or_else(Self::default_user_agent)
    }

    fn default_user_agent() -> String {
        format!("conduit/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Sets the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = timeout_secs;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
