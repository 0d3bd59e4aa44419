//! `jfrogArtifactory.getArtifactInfo` component.

use std::sync::LazyLock;

use conduit_core::prelude::*;
use serde_json::Value;

use crate::client::ArtifactoryClient;
use crate::location::{ArtifactLocation, store_repository};

/// Payload type of emitted artifact information.
pub const PAYLOAD_TYPE: &str = "jfrogArtifactory.artifact.info";

static EXAMPLE_OUTPUT: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(include_str!("samples/example_output_get_artifact_info.json"))
        .unwrap_or_default()
});

/// Reads storage information of an artifact.
#[derive(Debug, Default, Clone, Copy)]
pub struct GetArtifactInfo;

#[async_trait::async_trait]
impl Component for GetArtifactInfo {
    fn name(&self) -> &'static str {
        "jfrogArtifactory.getArtifactInfo"
    }

    fn label(&self) -> &'static str {
        "Get Artifact Info"
    }

    fn description(&self) -> &'static str {
        "Get metadata about an artifact in JFrog Artifactory"
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
                .with_description("Path of the artifact inside the repository")
                .with_placeholder("e.g. path/to/file.jar"),
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
        let info = client
            .artifact_info(&location.repository, &location.path)
            .await
            .map_err(|err| err.into_execution("error getting artifact info"))?;

        ctx.execution_state
            .emit(
                DEFAULT_OUTPUT_CHANNEL,
                PAYLOAD_TYPE,
                vec![serde_json::to_value(&info)?],
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use conduit_core::memory::{
        MemoryConfigurationStore, MemoryExecutionState, MemoryIntegration, MemoryMetadataStore,
    };
    use conduit_core::mock::{MockTransport, RejectingExecutionState};
    use serde_json::json;

    use super::*;

    fn integration() -> MemoryIntegration {
        MemoryIntegration::new(
            MemoryConfigurationStore::new()
                .with_value("url", ConfigValue::String("https://acme.jfrog.io/artifactory".into()))
                .with_value("accessToken", ConfigValue::Secret("tok".into())),
        )
    }

    fn configuration() -> Configuration {
        json!({"repository": "libs-release-local", "path": "/com/example/app.jar"})
            .as_object()
            .cloned()
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_execute_emits_info() {
        let example = GetArtifactInfo.example_output();
        let transport = MockTransport::new().respond_json(200, example.clone());
        let integration = integration();
        let metadata = MemoryMetadataStore::new();
        let state = MemoryExecutionState::new();
        let config = configuration();

        GetArtifactInfo
            .execute(ExecutionContext {
                configuration: &config,
                http: &transport,
                integration: &integration,
                metadata: &metadata,
                execution_state: &state,
            })
            .await
            .unwrap();

        let request = &transport.requests().await[0];
        assert_eq!(
            request.url.path(),
            "/artifactory/api/storage/libs-release-local/com/example/app.jar"
        );

        let outputs = state.outputs().await;
        assert_eq!(outputs[0].payload_type, PAYLOAD_TYPE);
        assert_eq!(outputs[0].items, vec![example]);
    }

    #[tokio::test]
    async fn test_execute_emission_failure_is_reported() {
        let transport = MockTransport::new().respond_json(200, json!({"repo": "libs"}));
        let integration = integration();
        let metadata = MemoryMetadataStore::new();
        let config = configuration();

        let error = GetArtifactInfo
            .execute(ExecutionContext {
                configuration: &config,
                http: &transport,
                integration: &integration,
                metadata: &metadata,
                execution_state: &RejectingExecutionState,
            })
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::Emission);
    }
}
