//! `jfrogArtifactory.deleteArtifact` component.

use std::sync::LazyLock;

use conduit_core::prelude::*;
use serde_json::{Value, json};

use crate::client::ArtifactoryClient;
use crate::location::{ArtifactLocation, store_repository};

/// Tracing target for the delete component.
pub const TRACING_TARGET: &str = "conduit_artifactory::delete";

/// Payload type of emitted deletion results.
pub const PAYLOAD_TYPE: &str = "jfrogArtifactory.artifact.deleted";

static EXAMPLE_OUTPUT: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(include_str!("samples/example_output_delete_artifact.json"))
        .unwrap_or_default()
});

/// Deletes an artifact from an Artifactory repository.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeleteArtifact;

#[async_trait::async_trait]
impl Component for DeleteArtifact {
    fn name(&self) -> &'static str {
        "jfrogArtifactory.deleteArtifact"
    }

    fn label(&self) -> &'static str {
        "Delete Artifact"
    }

    fn description(&self) -> &'static str {
        "Delete an artifact from JFrog Artifactory"
    }

    fn icon(&self) -> &'static str {
        "jfrogArtifactory"
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
            Field::new("repository", "Repository", FieldType::resource("repository")).required(),
            Field::new("path", "Path", FieldType::Expression)
                .required()
                .with_description("Path of the artifact to delete"),
        ]
    }

    async fn setup(&self, ctx: SetupContext<'_>) -> Result<()> {
        let location: ArtifactLocation = decode(ctx.configuration)?;
        location.validate()?;
        store_repository(&ctx, &location.repository).await
    }

    async fn execute(&self, ctx: ExecutionContext<'_>) -> Result<()> {
        let location: ArtifactLocation = decode(ctx.configuration)?;
        location.validate()?;

        let client =
            ArtifactoryClient::from_store(ctx.http, ctx.integration.configuration()).await?;
        client
            .delete_artifact(&location.repository, &location.path)
            .await
            .map_err(|err| err.into_execution("error deleting artifact"))?;

        tracing::info!(
            target: TRACING_TARGET,
            repository = %location.repository,
            path = %location.path,
            "artifact deleted"
        );

        let output = json!({
            "repository": location.repository,
            "path": location.path.trim_start_matches('/'),
        });
        ctx.execution_state
            .emit(DEFAULT_OUTPUT_CHANNEL, PAYLOAD_TYPE, vec![output])
            .await
    }
}

#[cfg(test)]
mod tests {
    use conduit_core::http::HttpMethod;
    use conduit_core::memory::{
        MemoryConfigurationStore, MemoryExecutionState, MemoryIntegration, MemoryMetadataStore,
    };
    use conduit_core::mock::MockTransport;

    use super::*;

    fn integration() -> MemoryIntegration {
        MemoryIntegration::new(
            MemoryConfigurationStore::new()
                .with_value("url", ConfigValue::String("https://acme.jfrog.io/artifactory".into()))
                .with_value("accessToken", ConfigValue::Secret("tok".into())),
        )
    }

    #[tokio::test]
    async fn test_execute_deletes_and_emits() {
        let transport = MockTransport::new().respond(204, "");
        let integration = integration();
        let metadata = MemoryMetadataStore::new();
        let state = MemoryExecutionState::new();
        let config = json!({"repository": "libs-release-local", "path": "/com/example/app.jar"})
            .as_object()
            .cloned()
            .unwrap_or_default();

        DeleteArtifact
            .execute(ExecutionContext {
                configuration: &config,
                http: &transport,
                integration: &integration,
                metadata: &metadata,
                execution_state: &state,
            })
            .await
            .unwrap();

        assert_eq!(transport.requests().await[0].method, HttpMethod::Delete);
        let outputs = state.outputs().await;
        assert_eq!(outputs[0].items, vec![DeleteArtifact.example_output()]);
    }

    #[tokio::test]
    async fn test_execute_not_found_is_execution_error() {
        let transport = MockTransport::new().respond(404, "File not found.");
        let integration = integration();
        let metadata = MemoryMetadataStore::new();
        let state = MemoryExecutionState::new();
        let config = json!({"repository": "libs", "path": "missing.jar"})
            .as_object()
            .cloned()
            .unwrap_or_default();

        let error = DeleteArtifact
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
        assert!(error.message.unwrap_or_default().contains("File not found."));
        assert!(state.outputs().await.is_empty());
    }
}
