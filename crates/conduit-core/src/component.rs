//! Component descriptors: pipeline steps that call out to a service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Field;
use crate::context::{ActionContext, ExecutionContext, SetupContext, WebhookContext};
use crate::integration::{Action, unknown_action};
use crate::webhook::{IgnoreReason, WebhookOutcome};
use crate::Result;

/// Name of the channel components emit on unless they declare others.
pub const DEFAULT_OUTPUT_CHANNEL: &str = "default";

/// An output channel of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputChannel {
    pub name: String,
    pub label: String,
}

impl Default for OutputChannel {
    fn default() -> Self {
        Self {
            name: DEFAULT_OUTPUT_CHANNEL.to_owned(),
            label: "Default".to_owned(),
        }
    }
}

/// A pipeline step backed by an external service.
#[async_trait::async_trait]
pub trait Component: Send + Sync {
    /// Unique name tag (e.g. `"jfrogArtifactory.uploadArtifact"`).
    fn name(&self) -> &'static str;

    fn label(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn documentation(&self) -> &'static str {
        ""
    }

    fn icon(&self) -> &'static str;

    fn color(&self) -> &'static str;

    /// Type tag of the items this component emits.
    fn payload_type(&self) -> &'static str;

    /// A representative emitted item.
    fn example_output(&self) -> Value;

    fn output_channels(&self) -> Vec<OutputChannel> {
        vec![OutputChannel::default()]
    }

    fn configuration(&self) -> Vec<Field>;

    /// Validates configuration and stores node metadata.
    async fn setup(&self, ctx: SetupContext<'_>) -> Result<()>;

    /// Performs the remote call and emits its result.
    async fn execute(&self, ctx: ExecutionContext<'_>) -> Result<()>;

    /// Requests cancellation. Advisory; in-flight remote calls are not
    /// rolled back.
    async fn cancel(&self, _ctx: ExecutionContext<'_>) -> Result<()> {
        Ok(())
    }

    async fn cleanup(&self, _ctx: SetupContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Outbound components accept and ignore webhooks.
    async fn handle_webhook(&self, _ctx: WebhookContext<'_>) -> Result<WebhookOutcome> {
        Ok(WebhookOutcome::ignored(IgnoreReason::Unsupported))
    }

    fn actions(&self) -> Vec<Action> {
        Vec::new()
    }

    async fn handle_action(&self, ctx: ActionContext<'_>) -> Result<()> {
        Err(unknown_action(ctx.name))
    }
}
