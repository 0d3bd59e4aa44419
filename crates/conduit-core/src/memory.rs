//! In-memory implementations of the host collaborator ports.
//!
//! Suitable for command-line tooling and tests. Nothing is persisted beyond
//! the lifetime of the values.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::config::{ConfigValue, Configuration, Field};
use crate::context::{
    ConfigurationStore, EventBus, ExecutionState, IntegrationHandle, MetadataStore,
    WebhookRegistry,
};
use crate::webhook::{WebhookConfiguration, WebhookId};
use crate::{Error, Result};

/// Tracing target for the in-memory host.
pub const TRACING_TARGET: &str = "conduit_core::memory";

/// Fixed set of configuration values.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigurationStore {
    values: HashMap<String, ConfigValue>,
}

impl MemoryConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value.
    pub fn with_value(mut self, field: impl Into<String>, value: ConfigValue) -> Self {
        self.values.insert(field.into(), value);
        self
    }

    /// Builds a store from raw configuration, marking sensitive fields as
    /// secrets. Numbers are stored as strings, `null` is dropped.
    pub fn from_configuration(configuration: &Configuration, fields: &[Field]) -> Self {
        let values = configuration
            .iter()
            .filter_map(|(key, value)| {
                let sensitive = fields.iter().any(|f| &f.name == key && f.sensitive);
                let value = match value {
                    Value::Null => return None,
                    Value::Bool(b) => ConfigValue::Bool(*b),
                    Value::String(s) if sensitive => ConfigValue::Secret(s.clone()),
                    Value::String(s) => ConfigValue::String(s.clone()),
                    other => ConfigValue::String(other.to_string()),
                };
                Some((key.clone(), value))
            })
            .collect();

        Self { values }
    }
}

#[async_trait::async_trait]
impl ConfigurationStore for MemoryConfigurationStore {
    async fn config(&self, field: &str) -> Result<ConfigValue> {
        self.values
            .get(field)
            .cloned()
            .ok_or_else(|| Error::not_found().with_message(format!("config {field} not found")))
    }
}

/// A single metadata blob.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    value: RwLock<Value>,
}

impl MemoryMetadataStore {
    /// Creates an empty (`null`) store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `value`.
    pub fn with_value(value: Value) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Returns a copy of the current blob.
    pub async fn snapshot(&self) -> Value {
        self.value.read().await.clone()
    }
}

#[async_trait::async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn get(&self) -> Result<Value> {
        Ok(self.snapshot().await)
    }

    async fn set(&self, value: Value) -> Result<()> {
        *self.value.write().await = value;
        Ok(())
    }
}

/// Webhook registrations keyed by structural configuration equality.
#[derive(Debug, Default)]
pub struct MemoryWebhookRegistry {
    registrations: Mutex<Vec<(WebhookConfiguration, WebhookId)>>,
    requests: Mutex<Vec<WebhookConfiguration>>,
}

impl MemoryWebhookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all integration-level registrations.
    pub async fn registrations(&self) -> Vec<(WebhookConfiguration, WebhookId)> {
        self.registrations.lock().await.clone()
    }

    /// Returns every node-level webhook request, in call order.
    pub async fn requests(&self) -> Vec<WebhookConfiguration> {
        self.requests.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl WebhookRegistry for MemoryWebhookRegistry {
    async fn ensure_integration_webhook(
        &self,
        configuration: &WebhookConfiguration,
    ) -> Result<Option<WebhookId>> {
        let mut registrations = self.registrations.lock().await;

        if let Some((_, id)) = registrations.iter().find(|(c, _)| c == configuration) {
            return Ok(Some(*id));
        }

        let id = WebhookId::new();
        registrations.push((configuration.clone(), id));
        tracing::debug!(target: TRACING_TARGET, webhook_id = %id, "registered webhook");
        Ok(Some(id))
    }

    async fn request_webhook(&self, configuration: &WebhookConfiguration) -> Result<()> {
        self.requests.lock().await.push(configuration.clone());
        Ok(())
    }
}

/// An integration instance backed by in-memory stores.
#[derive(Debug, Default)]
pub struct MemoryIntegration {
    configuration: MemoryConfigurationStore,
    metadata: MemoryMetadataStore,
    webhooks: MemoryWebhookRegistry,
    ready: AtomicBool,
}

impl MemoryIntegration {
    pub fn new(configuration: MemoryConfigurationStore) -> Self {
        Self {
            configuration,
            ..Self::default()
        }
    }

    /// Replaces the initial integration metadata.
    pub fn with_metadata(mut self, value: Value) -> Self {
        self.metadata = MemoryMetadataStore::with_value(value);
        self
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn metadata_store(&self) -> &MemoryMetadataStore {
        &self.metadata
    }

    pub fn webhook_registry(&self) -> &MemoryWebhookRegistry {
        &self.webhooks
    }
}

#[async_trait::async_trait]
impl IntegrationHandle for MemoryIntegration {
    fn configuration(&self) -> &dyn ConfigurationStore {
        &self.configuration
    }

    fn metadata(&self) -> &dyn MetadataStore {
        &self.metadata
    }

    fn webhooks(&self) -> &dyn WebhookRegistry {
        &self.webhooks
    }

    async fn mark_ready(&self) -> Result<()> {
        self.ready.store(true, Ordering::Release);
        tracing::debug!(target: TRACING_TARGET, "integration marked ready");
        Ok(())
    }
}

/// An event published through an [`EventBus`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmittedEvent {
    pub payload_type: String,
    pub data: Value,
}

/// Event bus collecting every published event.
#[derive(Debug, Default)]
pub struct MemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<EmittedEvent> {
        self.events.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl EventBus for MemoryEventBus {
    async fn emit(&self, payload_type: &str, data: Value) -> Result<()> {
        tracing::debug!(target: TRACING_TARGET, payload_type, "event emitted");
        self.events.lock().await.push(EmittedEvent {
            payload_type: payload_type.to_owned(),
            data,
        });
        Ok(())
    }
}

/// Output published through an [`ExecutionState`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmittedOutput {
    pub channel: String,
    pub payload_type: String,
    pub items: Vec<Value>,
}

/// Execution state collecting every published output.
#[derive(Debug, Default)]
pub struct MemoryExecutionState {
    outputs: Mutex<Vec<EmittedOutput>>,
}

impl MemoryExecutionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn outputs(&self) -> Vec<EmittedOutput> {
        self.outputs.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl ExecutionState for MemoryExecutionState {
    async fn emit(&self, channel: &str, payload_type: &str, items: Vec<Value>) -> Result<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            channel,
            payload_type,
            items = items.len(),
            "execution output emitted"
        );
        self.outputs.lock().await.push(EmittedOutput {
            channel: channel.to_owned(),
            payload_type: payload_type.to_owned(),
            items,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::FieldType;

    #[tokio::test]
    async fn test_webhook_registration_is_reused() {
        let registry = MemoryWebhookRegistry::new();
        let first = registry
            .ensure_integration_webhook(&WebhookConfiguration::default())
            .await
            .unwrap();
        let second = registry
            .ensure_integration_webhook(&WebhookConfiguration::new(json!({})))
            .await
            .unwrap();
        let other = registry
            .ensure_integration_webhook(&WebhookConfiguration::new(json!({"job": "x"})))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(registry.registrations().await.len(), 2);
    }

    #[tokio::test]
    async fn test_configuration_store_from_configuration() {
        let fields = vec![
            Field::new("url", "URL", FieldType::String),
            Field::new("apiToken", "API Token", FieldType::String).sensitive(),
        ];
        let configuration = json!({"url": "https://ci", "apiToken": "t0k", "port": 8080, "x": null});
        let store = MemoryConfigurationStore::from_configuration(
            configuration.as_object().unwrap(),
            &fields,
        );

        assert_eq!(
            store.config("apiToken").await.unwrap(),
            ConfigValue::Secret("t0k".into())
        );
        assert_eq!(store.required_str("port").await.unwrap(), "8080");
        assert_eq!(
            store.config("x").await.unwrap_err().kind,
            crate::ErrorKind::NotFound
        );
        assert_eq!(
            store.required_str("missing").await.unwrap_err().message.as_deref(),
            Some("missing is required")
        );
    }

    #[tokio::test]
    async fn test_integration_ready_and_metadata() {
        let integration = MemoryIntegration::new(MemoryConfigurationStore::new());
        assert!(!integration.is_ready());
        assert_eq!(integration.metadata().get().await.unwrap(), Value::Null);

        integration.metadata().set(json!({"k": 1})).await.unwrap();
        integration.mark_ready().await.unwrap();

        assert!(integration.is_ready());
        assert_eq!(integration.metadata_store().snapshot().await, json!({"k": 1}));
    }
}
