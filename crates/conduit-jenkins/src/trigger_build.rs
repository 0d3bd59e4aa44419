//! `jenkins.triggerBuild` component.

use std::sync::LazyLock;

use conduit_core::prelude::*;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::client::{BuildParameter, JenkinsClient};
use crate::metadata::{JobInfo, JobMetadata, ensure_job};

/// Tracing target for the trigger build component.
pub const TRACING_TARGET: &str = "conduit_jenkins::component";

/// Payload type of emitted queue results.
pub const PAYLOAD_TYPE: &str = "jenkins.build.queued";

static EXAMPLE_OUTPUT: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(include_str!("samples/example_output_trigger_build.json"))
        .unwrap_or_default()
});

#[derive(Debug, Default, Deserialize)]
struct TriggerBuildConfiguration {
    #[serde(default)]
    job: String,
    #[serde(default)]
    parameters: Vec<BuildParameter>,
}

/// Queues a build of a Jenkins job.
#[derive(Debug, Default, Clone, Copy)]
pub struct TriggerBuild;

#[async_trait::async_trait]
impl Component for TriggerBuild {
    fn name(&self) -> &'static str {
        "jenkins.triggerBuild"
    }

    fn label(&self) -> &'static str {
        "Trigger Build"
    }

    fn description(&self) -> &'static str {
        "Queue a Jenkins build, optionally with parameters"
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

    fn example_output(&self) -> Value {
        EXAMPLE_OUTPUT.clone()
    }

    fn configuration(&self) -> Vec<Field> {
        vec![
            Field::new("job", "Job", FieldType::resource("job")).required(),
            Field::new("parameters", "Parameters", FieldType::Expression)
                .with_description("List of {name, value} build parameters"),
        ]
    }

    async fn setup(&self, ctx: SetupContext<'_>) -> Result<()> {
        let config: TriggerBuildConfiguration = decode(ctx.configuration)?;
        require("job", &config.job)?;

        ensure_job(&ctx, &config.job).await?;
        Ok(())
    }

    async fn execute(&self, ctx: ExecutionContext<'_>) -> Result<()> {
        let config: TriggerBuildConfiguration = decode(ctx.configuration)?;
        require("job", &config.job)?;

        if config.parameters.iter().any(|p| p.name.trim().is_empty()) {
            return Err(Error::required("parameter name"));
        }

        let client = JenkinsClient::from_store(ctx.http, ctx.integration.configuration()).await?;
        let queued = client
            .trigger_build(&config.job, &config.parameters)
            .await
            .map_err(|err| err.into_execution("error triggering build"))?;

        let metadata: JobMetadata = decode_metadata(&ctx.metadata.get().await?)?;
        let job = metadata
            .resolved_for(&config.job)
            .cloned()
            .unwrap_or_else(|| JobInfo {
                name: config.job.clone(),
                url: String::new(),
            });

        tracing::info!(
            target: TRACING_TARGET,
            job = %config.job,
            queue_id = ?queued.queue_id,
            "build queued"
        );

        let output = json!({
            "job": job,
            "queueUrl": queued.queue_url,
            "queueId": queued.queue_id,
        });

        ctx.execution_state
            .emit(DEFAULT_OUTPUT_CHANNEL, PAYLOAD_TYPE, vec![output])
            .await
    }
}

#[cfg(test)]
mod tests {
    use conduit_core::http::HttpResponse;
    use conduit_core::memory::{
        MemoryConfigurationStore, MemoryExecutionState, MemoryIntegration, MemoryMetadataStore,
    };
    use conduit_core::mock::MockTransport;

    use super::*;

    fn integration() -> MemoryIntegration {
        MemoryIntegration::new(
            MemoryConfigurationStore::new()
                .with_value("url", ConfigValue::String("https://jenkins.example.com".into()))
                .with_value("username", ConfigValue::String("admin".into()))
                .with_value("apiToken", ConfigValue::Secret("token".into())),
        )
    }

    fn configuration(value: Value) -> Configuration {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_execute_queues_build() {
        let transport = MockTransport::new().respond_with(
            HttpResponse::new(201, "")
                .with_header("Location", "https://jenkins.example.com/queue/item/17/"),
        );
        let integration = integration();
        let metadata = MemoryMetadataStore::with_value(json!({
            "job": {"name": "my-job", "url": "https://jenkins.example.com/job/my-job/"}
        }));
        let state = MemoryExecutionState::new();
        let config = configuration(json!({"job": "my-job"}));

        TriggerBuild
            .execute(ExecutionContext {
                configuration: &config,
                http: &transport,
                integration: &integration,
                metadata: &metadata,
                execution_state: &state,
            })
            .await
            .unwrap();

        let requests = transport.requests().await;
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.path().ends_with("/job/my-job/build"));

        let outputs = state.outputs().await;
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].channel, DEFAULT_OUTPUT_CHANNEL);
        assert_eq!(outputs[0].payload_type, PAYLOAD_TYPE);
        assert_eq!(outputs[0].items[0], TriggerBuild.example_output());
    }

    #[tokio::test]
    async fn test_execute_ignores_metadata_of_previous_job() {
        let transport = MockTransport::new().respond_with(
            HttpResponse::new(201, "")
                .with_header("Location", "https://jenkins.example.com/queue/item/5/"),
        );
        let integration = integration();
        let metadata = MemoryMetadataStore::with_value(json!({
            "job": {"name": "old-job", "url": "https://jenkins.example.com/job/old-job/"}
        }));
        let state = MemoryExecutionState::new();
        let config = configuration(json!({"job": "new-job"}));

        TriggerBuild
            .execute(ExecutionContext {
                configuration: &config,
                http: &transport,
                integration: &integration,
                metadata: &metadata,
                execution_state: &state,
            })
            .await
            .unwrap();

        assert!(transport.requests().await[0].url.path().ends_with("/job/new-job/build"));
        let outputs = state.outputs().await;
        assert_eq!(outputs[0].items[0]["job"], json!({"name": "new-job", "url": ""}));
        assert_eq!(outputs[0].items[0]["queueId"], 5);
    }

    #[tokio::test]
    async fn test_execute_rejected_emits_nothing() {
        let transport = MockTransport::new().respond(500, "Internal Server Error");
        let integration = integration();
        let metadata = MemoryMetadataStore::new();
        let state = MemoryExecutionState::new();
        let config = configuration(json!({"job": "my-job"}));

        let error = TriggerBuild
            .execute(ExecutionContext {
                configuration: &config,
                http: &transport,
                integration: &integration,
                metadata: &metadata,
                execution_state: &state,
            })
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::Execution);
        let message = error.message.unwrap_or_default();
        assert!(message.contains("500"));
        assert!(message.contains("Internal Server Error"));
        assert!(state.outputs().await.is_empty());
    }

    #[tokio::test]
    async fn test_execute_missing_job_makes_no_call() {
        let transport = MockTransport::new();
        let integration = integration();
        let metadata = MemoryMetadataStore::new();
        let state = MemoryExecutionState::new();
        let config = configuration(json!({"job": ""}));

        let error = TriggerBuild
            .execute(ExecutionContext {
                configuration: &config,
                http: &transport,
                integration: &integration,
                metadata: &metadata,
                execution_state: &state,
            })
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::Validation);
        assert_eq!(transport.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_setup_skips_lookup_for_known_job() {
        let transport = MockTransport::new();
        let integration = integration();
        let metadata = MemoryMetadataStore::with_value(json!({"job": {"name": "my-job", "url": ""}}));
        let config = configuration(json!({"job": "my-job"}));

        TriggerBuild
            .setup(SetupContext {
                configuration: &config,
                http: &transport,
                integration: &integration,
                metadata: &metadata,
            })
            .await
            .unwrap();

        assert_eq!(transport.request_count().await, 0);
        assert!(integration.webhook_registry().requests().await.is_empty());
    }
}
