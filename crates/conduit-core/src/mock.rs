//! Test doubles for the host collaborator ports.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! conduit-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::component::Component;
use crate::config::{Field, FieldType};
use crate::context::{
    EventBus, ExecutionContext, ExecutionState, ListResourcesContext, SetupContext, SyncContext,
    WebhookContext,
};
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::integration::{Integration, IntegrationResource, collect_resources};
use crate::trigger::Trigger;
use crate::webhook::{WebhookConfiguration, WebhookOutcome};
use crate::{DEFAULT_OUTPUT_CHANNEL, Error, Result};

enum MockReply {
    Response(HttpResponse),
    Failure(String),
}

/// HTTP transport replaying queued responses and recording every request.
///
/// Running out of queued responses is reported as a transport error.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with a raw body.
    pub fn respond(mut self, status: u16, body: impl Into<bytes::Bytes>) -> Self {
        self.replies
            .get_mut()
            .push_back(MockReply::Response(HttpResponse::new(status, body)));
        self
    }

    /// Queues a response with a JSON body.
    pub fn respond_json(self, status: u16, body: Value) -> Self {
        self.respond(status, body.to_string())
    }

    /// Queues a complete response.
    pub fn respond_with(mut self, response: HttpResponse) -> Self {
        self.replies
            .get_mut()
            .push_back(MockReply::Response(response));
        self
    }

    /// Queues a transport-level failure.
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.replies
            .get_mut()
            .push_back(MockReply::Failure(message.into()));
        self
    }

    /// Returns the recorded requests, in call order.
    pub async fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().await.push(request);

        match self.replies.lock().await.pop_front() {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Failure(message)) => Err(Error::transport().with_message(message)),
            None => Err(Error::transport().with_message("no mock response queued")),
        }
    }
}

/// Event bus rejecting every publication.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectingEventBus;

#[async_trait::async_trait]
impl EventBus for RejectingEventBus {
    async fn emit(&self, _payload_type: &str, _data: Value) -> Result<()> {
        Err(Error::emission().with_message("event bus unavailable"))
    }
}

/// Execution state rejecting every publication.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectingExecutionState;

#[async_trait::async_trait]
impl ExecutionState for RejectingExecutionState {
    async fn emit(&self, _channel: &str, _payload_type: &str, _items: Vec<Value>) -> Result<()> {
        Err(Error::emission().with_message("execution state unavailable"))
    }
}

/// Minimal integration descriptor named `mock`.
///
/// Exposes a `mock.onEvent` trigger that re-emits any JSON body and a
/// `mock.doThing` component that emits its configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockIntegrationDescriptor;

impl MockIntegrationDescriptor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Integration for MockIntegrationDescriptor {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn label(&self) -> &'static str {
        "Mock"
    }

    fn icon(&self) -> &'static str {
        "box"
    }

    fn description(&self) -> &'static str {
        "In-memory integration used in tests"
    }

    fn configuration(&self) -> Vec<Field> {
        vec![Field::new("url", "URL", FieldType::String).required()]
    }

    fn components(&self) -> Vec<Arc<dyn Component>> {
        vec![Arc::new(MockComponent)]
    }

    fn triggers(&self) -> Vec<Arc<dyn Trigger>> {
        vec![Arc::new(MockTrigger)]
    }

    async fn sync(&self, ctx: SyncContext<'_>) -> Result<()> {
        crate::config::validate(&self.configuration(), ctx.configuration)?;
        ctx.integration.mark_ready().await
    }

    async fn list_resources(
        &self,
        resource_type: &str,
        _ctx: ListResourcesContext<'_>,
    ) -> Result<Vec<IntegrationResource>> {
        match resource_type {
            "thing" => Ok(collect_resources("thing", ["alpha", "beta"])),
            _ => Ok(Vec::new()),
        }
    }
}

struct MockTrigger;

#[async_trait::async_trait]
impl Trigger for MockTrigger {
    fn name(&self) -> &'static str {
        "mock.onEvent"
    }

    fn label(&self) -> &'static str {
        "On Event"
    }

    fn description(&self) -> &'static str {
        "Re-emits every webhook body"
    }

    fn icon(&self) -> &'static str {
        "box"
    }

    fn color(&self) -> &'static str {
        "gray"
    }

    fn payload_type(&self) -> &'static str {
        "mock.event"
    }

    fn example_data(&self) -> Value {
        json!({"value": 1})
    }

    fn configuration(&self) -> Vec<Field> {
        Vec::new()
    }

    async fn setup(&self, ctx: SetupContext<'_>) -> Result<()> {
        ctx.integration
            .webhooks()
            .request_webhook(&WebhookConfiguration::default())
            .await
    }

    async fn handle_webhook(&self, ctx: WebhookContext<'_>) -> Result<WebhookOutcome> {
        let data: Value = serde_json::from_slice(ctx.body)
            .map_err(|err| Error::from_source(crate::ErrorKind::Parse, err))?;
        ctx.events.emit(self.payload_type(), data).await?;
        Ok(WebhookOutcome::emitted(self.payload_type()))
    }
}

struct MockComponent;

#[async_trait::async_trait]
impl Component for MockComponent {
    fn name(&self) -> &'static str {
        "mock.doThing"
    }

    fn label(&self) -> &'static str {
        "Do Thing"
    }

    fn description(&self) -> &'static str {
        "Emits its own configuration"
    }

    fn icon(&self) -> &'static str {
        "box"
    }

    fn color(&self) -> &'static str {
        "gray"
    }

    fn payload_type(&self) -> &'static str {
        "mock.thing"
    }

    fn example_output(&self) -> Value {
        json!({})
    }

    fn configuration(&self) -> Vec<Field> {
        Vec::new()
    }

    async fn setup(&self, _ctx: SetupContext<'_>) -> Result<()> {
        Ok(())
    }

    async fn execute(&self, ctx: ExecutionContext<'_>) -> Result<()> {
        let item = Value::Object(ctx.configuration.clone());
        ctx.execution_state
            .emit(DEFAULT_OUTPUT_CHANNEL, self.payload_type(), vec![item])
            .await
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    #[tokio::test]
    async fn test_mock_transport_replays_in_order() {
        let transport = MockTransport::new().respond(200, "pong").fail("boom");
        let url = Url::parse("https://example.com/ping").unwrap();

        let first = transport.execute(HttpRequest::get(url.clone())).await.unwrap();
        assert_eq!(first.text(), "pong");

        let second = transport.execute(HttpRequest::get(url.clone())).await;
        assert_eq!(second.unwrap_err().message.as_deref(), Some("boom"));

        assert!(transport.execute(HttpRequest::get(url)).await.is_err());
        assert_eq!(transport.request_count().await, 3);
    }
}
