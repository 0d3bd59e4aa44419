//! `jfrogArtifactory.uploadArtifact` component.

use std::sync::LazyLock;

use conduit_core::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::client::{ArtifactoryClient, DEFAULT_CONTENT_TYPE};
use crate::location::{ArtifactLocation, store_repository};

/// Tracing target for the upload component.
pub const TRACING_TARGET: &str = "conduit_artifactory::upload";

/// Payload type of emitted deploy results.
pub const PAYLOAD_TYPE: &str = "jfrogArtifactory.artifact.uploaded";

static EXAMPLE_OUTPUT: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(include_str!("samples/example_output_upload_artifact.json"))
        .unwrap_or_default()
});

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadArtifactSpec {
    #[serde(flatten)]
    location: ArtifactLocation,
    #[serde(default)]
    content: String,
    #[serde(default)]
    content_type: String,
}

/// Deploys an artifact to an Artifactory repository.
#[derive(Debug, Default, Clone, Copy)]
pub struct UploadArtifact;

#[async_trait::async_trait]
impl Component for UploadArtifact {
    fn name(&self) -> &'static str {
        "jfrogArtifactory.uploadArtifact"
    }

    fn label(&self) -> &'static str {
        "Upload Artifact"
    }

    fn description(&self) -> &'static str {
        "Upload an artifact to JFrog Artifactory"
    }

    fn documentation(&self) -> &'static str {
        include_str!("docs/upload_artifact.md")
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
                .with_description("Destination path for the artifact")
                .with_placeholder("e.g. path/to/file.jar"),
            Field::new("content", "Content", FieldType::Expression)
                .required()
                .with_description("Artifact content to upload"),
            Field::new("contentType", "Content Type", FieldType::String)
                .with_description("MIME type of the artifact")
                .with_placeholder(DEFAULT_CONTENT_TYPE),
        ]
    }

    async fn setup(&self, ctx: SetupContext<'_>) -> Result<()> {
        let spec: UploadArtifactSpec = decode(ctx.configuration)?;
        spec.location.validate()?;
        store_repository(&ctx, &spec.location.repository).await
    }

    async fn execute(&self, ctx: ExecutionContext<'_>) -> Result<()> {
        let spec: UploadArtifactSpec = decode(ctx.configuration)?;
        spec.location.validate()?;
        if spec.content.is_empty() {
            return Err(Error::required("content"));
        }

        let client =
            ArtifactoryClient::from_store(ctx.http, ctx.integration.configuration()).await?;
        let ArtifactLocation { repository, path } = &spec.location;
        let deployed = client
            .deploy_artifact(repository, path, spec.content.clone(), &spec.content_type)
            .await
            .map_err(|err| err.into_execution("error uploading artifact"))?;

        tracing::info!(
            target: TRACING_TARGET,
            repository = %repository,
            path = %deployed.path,
            size = %deployed.size,
            "artifact uploaded"
        );

        ctx.execution_state
            .emit(
                DEFAULT_OUTPUT_CHANNEL,
                PAYLOAD_TYPE,
                vec![serde_json::to_value(&deployed)?],
            )
            .await
    }
}
