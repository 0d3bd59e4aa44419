//! Host collaborator ports and the per-call lifecycle contexts.
//!
//! The host implements these traits over its own storage; integrations only
//! ever see them through the borrowed context structs below, one per
//! lifecycle entry point.

use std::collections::BTreeMap;

use serde_json::Value;
use url::Url;

use crate::config::{ConfigValue, Configuration};
use crate::http::HttpTransport;
use crate::webhook::{WebhookConfiguration, WebhookId};
use crate::{Error, Result};

/// Read access to an integration's stored configuration.
#[async_trait::async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Returns the value of a configuration field.
    ///
    /// Fails with a not found error when the field was never set.
    async fn config(&self, field: &str) -> Result<ConfigValue>;

    /// Returns a non-empty string field, failing with a validation error
    /// otherwise.
    async fn required_str(&self, field: &str) -> Result<String> {
        let value = self
            .config(field)
            .await
            .map_err(|_| Error::required(field))?;

        match value.as_str() {
            Some(s) if !s.trim().is_empty() => Ok(s.to_owned()),
            _ => Err(Error::required(field)),
        }
    }
}

/// Opaque persisted metadata owned by the host.
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    /// Returns the current metadata blob (`null` when never set).
    async fn get(&self) -> Result<Value>;

    /// Replaces the metadata blob.
    async fn set(&self, value: Value) -> Result<()>;
}

/// Host-side webhook registration.
#[async_trait::async_trait]
pub trait WebhookRegistry: Send + Sync {
    /// Ensures a single integration-level webhook exists for `configuration`.
    ///
    /// Returns the (stable) identifier when the host assigns one. Calling this
    /// again with a structurally equal configuration returns the same id.
    async fn ensure_integration_webhook(
        &self,
        configuration: &WebhookConfiguration,
    ) -> Result<Option<WebhookId>>;

    /// Asks the host to route inbound webhooks to the calling node.
    async fn request_webhook(&self, configuration: &WebhookConfiguration) -> Result<()>;
}

/// Handle to the integration instance a call runs against.
#[async_trait::async_trait]
pub trait IntegrationHandle: Send + Sync {
    /// Stored integration configuration.
    fn configuration(&self) -> &dyn ConfigurationStore;

    /// Integration-level metadata.
    fn metadata(&self) -> &dyn MetadataStore;

    /// Webhook registration for this integration.
    fn webhooks(&self) -> &dyn WebhookRegistry;

    /// Marks the integration as ready for use.
    async fn mark_ready(&self) -> Result<()>;
}

/// Host event bus used by triggers.
#[async_trait::async_trait]
pub trait EventBus: Send + Sync {
    /// Publishes one event tagged with `payload_type`.
    async fn emit(&self, payload_type: &str, data: Value) -> Result<()>;
}

/// Execution state of a running component.
#[async_trait::async_trait]
pub trait ExecutionState: Send + Sync {
    /// Publishes component output on an output channel.
    async fn emit(&self, channel: &str, payload_type: &str, items: Vec<Value>) -> Result<()>;
}

/// Context of an integration `sync` call.
#[derive(Clone, Copy)]
pub struct SyncContext<'a> {
    pub configuration: &'a Configuration,
    pub http: &'a dyn HttpTransport,
    pub integration: &'a dyn IntegrationHandle,
    /// Public base URL under which the host serves webhooks, if any.
    pub webhooks_base_url: Option<&'a Url>,
}

/// Context of an integration `cleanup` call.
#[derive(Clone, Copy)]
pub struct CleanupContext<'a> {
    pub configuration: &'a Configuration,
    pub http: &'a dyn HttpTransport,
    pub integration: &'a dyn IntegrationHandle,
}

/// Context of an integration `list_resources` call.
#[derive(Clone, Copy)]
pub struct ListResourcesContext<'a> {
    pub http: &'a dyn HttpTransport,
    pub integration: &'a dyn IntegrationHandle,
}

/// Context of an inbound HTTP request addressed to the integration itself.
#[derive(Clone, Copy)]
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub headers: &'a BTreeMap<String, String>,
    pub body: &'a [u8],
    pub integration: &'a dyn IntegrationHandle,
}

/// Context of a trigger or component `setup` call.
#[derive(Clone, Copy)]
pub struct SetupContext<'a> {
    /// Node configuration.
    pub configuration: &'a Configuration,
    pub http: &'a dyn HttpTransport,
    pub integration: &'a dyn IntegrationHandle,
    /// Node metadata, distinct from the integration's.
    pub metadata: &'a dyn MetadataStore,
}

/// Context of a trigger `handle_webhook` call.
///
/// Carries only the configuration stored when the webhook was registered;
/// matching never consults remote state.
#[derive(Clone, Copy)]
pub struct WebhookContext<'a> {
    pub body: &'a [u8],
    pub headers: &'a BTreeMap<String, String>,
    pub configuration: &'a Configuration,
    pub events: &'a dyn EventBus,
}

/// Context of a component `execute` or `cancel` call.
#[derive(Clone, Copy)]
pub struct ExecutionContext<'a> {
    pub configuration: &'a Configuration,
    pub http: &'a dyn HttpTransport,
    pub integration: &'a dyn IntegrationHandle,
    pub metadata: &'a dyn MetadataStore,
    pub execution_state: &'a dyn ExecutionState,
}

/// Context of a `handle_action` call.
#[derive(Clone, Copy)]
pub struct ActionContext<'a> {
    /// Name of the requested action.
    pub name: &'a str,
    pub parameters: &'a Value,
    pub configuration: &'a Configuration,
    pub metadata: &'a dyn MetadataStore,
}
