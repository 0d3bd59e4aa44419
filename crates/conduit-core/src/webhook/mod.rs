//! Webhook registration identity and inbound dispatch results.

mod outcome;
mod response;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub use outcome::{IgnoreReason, WebhookOutcome};
pub use response::WebhookResponse;

/// Stable identifier of a host-side webhook registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebhookId(Uuid);

impl WebhookId {
    /// Generates a new time-ordered identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for WebhookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WebhookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Configuration attached to a webhook registration.
///
/// Two configurations are the same registration when they are structurally
/// equal JSON; key order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebhookConfiguration(Value);

impl WebhookConfiguration {
    /// Creates a configuration from a JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the configuration as JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Default for WebhookConfiguration {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl From<Value> for WebhookConfiguration {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Builds the public URL under which the host receives a webhook.
pub fn webhook_url(base: &url::Url, id: &WebhookId) -> String {
    format!("{}/api/v1/webhooks/{id}", base.as_str().trim_end_matches('/'))
}
