//! `jenkins.onBuildFinished` trigger.

use std::sync::LazyLock;

use conduit_core::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::metadata::ensure_job;
use crate::payload::NotificationPayload;

/// Tracing target for the build finished trigger.
pub const TRACING_TARGET: &str = "conduit_jenkins::trigger";

/// Payload type of emitted build events.
pub const PAYLOAD_TYPE: &str = "jenkins.build.finished";

static EXAMPLE_DATA: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(include_str!("samples/example_data_on_build_finished.json"))
        .unwrap_or_default()
});

#[derive(Debug, Default, Deserialize)]
struct OnBuildFinishedConfiguration {
    #[serde(default)]
    job: String,
}

/// Emits an event each time a build of the configured job finishes.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnBuildFinished;

#[async_trait::async_trait]
impl Trigger for OnBuildFinished {
    fn name(&self) -> &'static str {
        "jenkins.onBuildFinished"
    }

    fn label(&self) -> &'static str {
        "On Build Finished"
    }

    fn description(&self) -> &'static str {
        "Listen to Jenkins build completion events"
    }

    fn documentation(&self) -> &'static str {
        include_str!("docs/on_build_finished.md")
    }

    fn icon(&self) -> &'static str {
        "jenkins"
    }

    fn color(&self) -> &'static str {
        "gray"
    }

    fn payload_type(&self) -> &'static str {
        PAYLOAD_TYPE
    }

    fn example_data(&self) -> Value {
        EXAMPLE_DATA.clone()
    }

    fn configuration(&self) -> Vec<Field> {
        vec![Field::new("job", "Job", FieldType::resource("job")).required()]
    }

    async fn setup(&self, ctx: SetupContext<'_>) -> Result<()> {
        let config: OnBuildFinishedConfiguration = decode(ctx.configuration)?;
        require("job", &config.job)?;

        ensure_job(&ctx, &config.job).await?;

        ctx.integration
            .webhooks()
            .request_webhook(&WebhookConfiguration::default())
            .await
    }

    async fn handle_webhook(&self, ctx: WebhookContext<'_>) -> Result<WebhookOutcome> {
        let payload: NotificationPayload = serde_json::from_slice(ctx.body).map_err(|err| {
            let message = format!("error parsing request body: {err}");
            Error::from_source(ErrorKind::Parse, err).with_message(message)
        })?;

        let Some(build) = payload.build.as_ref() else {
            return Ok(WebhookOutcome::ignored(IgnoreReason::NoBuild));
        };

        if !build.is_terminal() {
            return Ok(WebhookOutcome::ignored(IgnoreReason::NonTerminalPhase {
                phase: build.phase.clone(),
            }));
        }

        let config: OnBuildFinishedConfiguration = decode(ctx.configuration)?;
        if !config.job.is_empty() && payload.name != config.job {
            return Ok(WebhookOutcome::ignored(IgnoreReason::TargetMismatch {
                expected: config.job,
                actual: payload.name,
            }));
        }

        ctx.events
            .emit(PAYLOAD_TYPE, payload.to_event(build))
            .await
            .map_err(|err| err.reclassify(ErrorKind::Emission, "failed to emit event"))?;

        tracing::info!(
            target: TRACING_TARGET,
            job = %payload.name,
            build = build.number,
            result = %build.status,
            "build finished event emitted"
        );

        Ok(WebhookOutcome::emitted(PAYLOAD_TYPE))
    }
}
