//! Notification Plugin webhook envelope.

use serde::Deserialize;
use serde_json::{Value, json};

/// Build phases after which a build result is final.
pub const TERMINAL_PHASES: [&str; 2] = ["COMPLETED", "FINALIZED"];

/// Body posted by the Jenkins Notification Plugin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub build: Option<BuildPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildPayload {
    #[serde(default)]
    pub number: i64,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub full_url: String,
    #[serde(default)]
    pub url: String,
}

impl BuildPayload {
    pub fn is_terminal(&self) -> bool {
        TERMINAL_PHASES.contains(&self.phase.as_str())
    }
}

impl NotificationPayload {
    /// Normalized event published for a finished build.
    pub fn to_event(&self, build: &BuildPayload) -> Value {
        json!({
            "job": {
                "name": self.name,
                "url": self.url,
            },
            "build": {
                "number": build.number,
                "url": build.full_url,
                "result": build.status,
            },
        })
    }
}
