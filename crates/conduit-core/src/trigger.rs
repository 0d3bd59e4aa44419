//! Trigger descriptors: nodes started by inbound webhooks.

use serde_json::Value;

use crate::config::Field;
use crate::context::{ActionContext, SetupContext, WebhookContext};
use crate::integration::{Action, unknown_action};
use crate::webhook::WebhookOutcome;
use crate::Result;

/// A trigger reacting to events of an external service.
#[async_trait::async_trait]
pub trait Trigger: Send + Sync {
    /// Unique name tag (e.g. `"jenkins.onBuildFinished"`).
    fn name(&self) -> &'static str;

    fn label(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn documentation(&self) -> &'static str {
        ""
    }

    fn icon(&self) -> &'static str;

    fn color(&self) -> &'static str;

    /// Type tag of the events this trigger emits.
    fn payload_type(&self) -> &'static str;

    /// A representative emitted event.
    fn example_data(&self) -> Value;

    fn configuration(&self) -> Vec<Field>;

    /// Idempotently validates configuration and registers for webhooks.
    async fn setup(&self, ctx: SetupContext<'_>) -> Result<()>;

    /// Filters one inbound payload and emits at most one event.
    async fn handle_webhook(&self, ctx: WebhookContext<'_>) -> Result<WebhookOutcome>;

    async fn cleanup(&self, _ctx: SetupContext<'_>) -> Result<()> {
        Ok(())
    }

    fn actions(&self) -> Vec<Action> {
        Vec::new()
    }

    async fn handle_action(&self, ctx: ActionContext<'_>) -> Result<()> {
        Err(unknown_action(ctx.name))
    }
}
