//! Routing of inbound webhook payloads to the owning node.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Configuration;
use crate::context::{EventBus, WebhookContext};
use crate::registry::Registry;
use crate::webhook::{WebhookOutcome, WebhookResponse};
use crate::{Error, Result};

/// Tracing target for webhook dispatch.
pub const TRACING_TARGET: &str = "conduit_core::dispatch";

/// One inbound webhook delivery, as captured by the host's HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct WebhookDelivery {
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl WebhookDelivery {
    /// Creates a delivery without headers.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header (lower-cased name).
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }
}

/// The node a webhook registration belongs to.
///
/// `configuration` is the node configuration stored when the webhook was
/// requested; it is the only input used to decide whether a payload matches.
#[derive(Clone)]
pub struct WebhookBinding {
    /// Trigger or component name tag.
    pub node: String,
    pub configuration: Configuration,
    pub events: Arc<dyn EventBus>,
}

/// Routes inbound webhook payloads through the [`Registry`].
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    registry: Arc<Registry>,
}

impl WebhookDispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Hands a delivery to the bound node and maps the result to a response.
    ///
    /// Only unparseable payloads answer 400; emission and every other
    /// failure answer 500.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET,
        fields(node = %binding.node, body_len = delivery.body.len())
    )]
    pub async fn dispatch(
        &self,
        binding: &WebhookBinding,
        delivery: &WebhookDelivery,
    ) -> WebhookResponse {
        let result = self.route(binding, delivery).await;
        let response = WebhookResponse::from_result(&result);

        match &result {
            Ok(WebhookOutcome::Emitted { payload_type }) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    payload_type = %payload_type,
                    "webhook emitted event"
                );
            }
            Ok(WebhookOutcome::Ignored { reason }) => {
                tracing::debug!(target: TRACING_TARGET, ?reason, "webhook ignored");
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    status_code = response.status_code,
                    error = %error,
                    "webhook handling failed"
                );
            }
        }

        response
    }

    async fn route(
        &self,
        binding: &WebhookBinding,
        delivery: &WebhookDelivery,
    ) -> Result<WebhookOutcome> {
        let ctx = WebhookContext {
            body: &delivery.body,
            headers: &delivery.headers,
            configuration: &binding.configuration,
            events: binding.events.as_ref(),
        };

        if let Some(trigger) = self.registry.trigger(&binding.node) {
            return trigger.handle_webhook(ctx).await;
        }
        if let Some(component) = self.registry.component(&binding.node) {
            return component.handle_webhook(ctx).await;
        }

        Err(Error::not_found().with_message(format!("unknown node: {}", binding.node)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryEventBus;
    use crate::mock::MockIntegrationDescriptor;
    use crate::webhook::IgnoreReason;

    fn dispatcher() -> WebhookDispatcher {
        let registry = Registry::new()
            .with(Arc::new(MockIntegrationDescriptor::new()))
            .unwrap();
        WebhookDispatcher::new(Arc::new(registry))
    }

    fn binding(node: &str, events: Arc<MemoryEventBus>) -> WebhookBinding {
        WebhookBinding {
            node: node.to_owned(),
            configuration: Configuration::new(),
            events,
        }
    }

    #[tokio::test]
    async fn test_dispatch_to_trigger() {
        let events = Arc::new(MemoryEventBus::new());
        let response = dispatcher()
            .dispatch(
                &binding("mock.onEvent", events.clone()),
                &WebhookDelivery::new(json!({"value": 1}).to_string()),
            )
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(events.len().await, 1);
    }

    #[tokio::test]
    async fn test_dispatch_malformed_body_is_bad_request() {
        let events = Arc::new(MemoryEventBus::new());
        let response = dispatcher()
            .dispatch(
                &binding("mock.onEvent", events.clone()),
                &WebhookDelivery::new("{not json"),
            )
            .await;

        assert_eq!(response.status_code, 400);
        assert_eq!(events.len().await, 0);
    }

    #[tokio::test]
    async fn test_dispatch_to_component_is_ignored() {
        let events = Arc::new(MemoryEventBus::new());
        let response = dispatcher()
            .dispatch(
                &binding("mock.doThing", events.clone()),
                &WebhookDelivery::new("{}"),
            )
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.outcome,
            Some(WebhookOutcome::ignored(IgnoreReason::Unsupported))
        );
    }

    #[tokio::test]
    async fn test_dispatch_unknown_node() {
        let events = Arc::new(MemoryEventBus::new());
        let response = dispatcher()
            .dispatch(&binding("nobody", events), &WebhookDelivery::new("{}"))
            .await;

        assert_eq!(response.status_code, 500);
    }
}
