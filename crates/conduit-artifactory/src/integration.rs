//! The `jfrogArtifactory` integration descriptor.

use std::sync::Arc;

use conduit_core::prelude::*;
use serde::Deserialize;

use crate::client::ArtifactoryClient;
use crate::delete_artifact::DeleteArtifact;
use crate::get_artifact_info::GetArtifactInfo;
use crate::upload_artifact::UploadArtifact;

/// Tracing target for integration lifecycle calls.
pub const TRACING_TARGET: &str = "conduit_artifactory::integration";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactoryConfiguration {
    #[serde(default)]
    url: String,
    #[serde(default)]
    access_token: String,
}

/// Manage artifacts in JFrog Artifactory.
#[derive(Debug, Default, Clone, Copy)]
pub struct JFrogArtifactory;

#[async_trait::async_trait]
impl Integration for JFrogArtifactory {
    fn name(&self) -> &'static str {
        "jfrogArtifactory"
    }

    fn label(&self) -> &'static str {
        "JFrog Artifactory"
    }

    fn icon(&self) -> &'static str {
        "jfrogArtifactory"
    }

    fn description(&self) -> &'static str {
        "Manage artifacts in JFrog Artifactory repositories"
    }

    fn instructions(&self) -> &'static str {
        include_str!("docs/instructions.md")
    }

    fn configuration(&self) -> Vec<Field> {
        vec![
            Field::new("url", "Artifactory URL", FieldType::String)
                .required()
                .with_description("Base URL of your Artifactory instance")
                .with_placeholder("e.g. https://mycompany.jfrog.io/artifactory"),
            Field::new("accessToken", "Access Token", FieldType::String)
                .required()
                .sensitive()
                .with_description("JFrog identity or access token"),
        ]
    }

    fn components(&self) -> Vec<Arc<dyn Component>> {
        vec![
            Arc::new(GetArtifactInfo),
            Arc::new(UploadArtifact),
            Arc::new(DeleteArtifact),
        ]
    }

    fn triggers(&self) -> Vec<Arc<dyn Trigger>> {
        Vec::new()
    }

    async fn sync(&self, ctx: SyncContext<'_>) -> Result<()> {
        let config: ArtifactoryConfiguration = decode(ctx.configuration)?;
        require("url", &config.url)?;
        require("accessToken", &config.access_token)?;

        let client =
            ArtifactoryClient::from_store(ctx.http, ctx.integration.configuration()).await?;
        client
            .ping()
            .await
            .map_err(|err| err.reclassify(ErrorKind::Credential, "error verifying credentials"))?;

        ctx.integration.mark_ready().await?;
        tracing::info!(target: TRACING_TARGET, "artifactory integration ready");
        Ok(())
    }

    async fn list_resources(
        &self,
        resource_type: &str,
        ctx: ListResourcesContext<'_>,
    ) -> Result<Vec<IntegrationResource>> {
        if resource_type != "repository" {
            return Ok(Vec::new());
        }

        let client =
            ArtifactoryClient::from_store(ctx.http, ctx.integration.configuration()).await?;
        let repositories = client.list_repositories().await?;
        Ok(collect_resources(
            resource_type,
            repositories.into_iter().map(|repository| repository.key),
        ))
    }
}

#[cfg(test)]
mod tests {
    use conduit_core::memory::{MemoryConfigurationStore, MemoryIntegration};
    use conduit_core::mock::MockTransport;
    use serde_json::{Value, json};

    use super::*;

    fn configuration(value: Value) -> Configuration {
        value.as_object().cloned().unwrap_or_default()
    }

    fn integration_for(config: &Configuration) -> MemoryIntegration {
        MemoryIntegration::new(MemoryConfigurationStore::from_configuration(
            config,
            &JFrogArtifactory.configuration(),
        ))
    }

    #[tokio::test]
    async fn test_sync_requires_url_before_token() {
        let config = configuration(json!({}));
        let transport = MockTransport::new();
        let integration = integration_for(&config);

        let error = JFrogArtifactory
            .sync(SyncContext {
                configuration: &config,
                http: &transport,
                integration: &integration,
                webhooks_base_url: None,
            })
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::Validation);
        assert_eq!(error.message.as_deref(), Some("url is required"));
        assert_eq!(transport.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_sync_marks_ready_after_ping() {
        let config = configuration(json!({
            "url": "https://acme.jfrog.io/artifactory/",
            "accessToken": "tok"
        }));
        let transport = MockTransport::new().respond(200, "OK");
        let integration = integration_for(&config);

        JFrogArtifactory
            .sync(SyncContext {
                configuration: &config,
                http: &transport,
                integration: &integration,
                webhooks_base_url: None,
            })
            .await
            .unwrap();

        assert!(integration.is_ready());
        let requests = transport.requests().await;
        assert_eq!(requests[0].url.path(), "/artifactory/api/system/ping");
        assert!(integration.webhook_registry().registrations().await.is_empty());
    }

    #[tokio::test]
    async fn test_sync_rejected_token() {
        let config = configuration(json!({
            "url": "https://acme.jfrog.io/artifactory",
            "accessToken": "bad"
        }));
        let transport = MockTransport::new().respond(401, "Bad credentials");
        let integration = integration_for(&config);

        let error = JFrogArtifactory
            .sync(SyncContext {
                configuration: &config,
                http: &transport,
                integration: &integration,
                webhooks_base_url: None,
            })
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::Credential);
        assert!(
            error
                .message
                .unwrap_or_default()
                .starts_with("error verifying credentials")
        );
        assert!(!integration.is_ready());
    }

    #[tokio::test]
    async fn test_list_repositories() {
        let config = configuration(json!({
            "url": "https://acme.jfrog.io/artifactory",
            "accessToken": "tok"
        }));
        let transport = MockTransport::new().respond_json(
            200,
            json!([
                {"key": "libs-release-local", "type": "LOCAL", "packageType": "Maven"},
                {"key": "libs-release-local", "type": "LOCAL"},
                {"key": "docker-remote", "type": "REMOTE"}
            ]),
        );
        let integration = integration_for(&config);
        let ctx = ListResourcesContext {
            http: &transport,
            integration: &integration,
        };

        let resources = JFrogArtifactory
            .list_resources("repository", ctx)
            .await
            .unwrap();
        assert_eq!(
            resources,
            vec![
                IntegrationResource::named("repository", "libs-release-local"),
                IntegrationResource::named("repository", "docker-remote"),
            ]
        );

        assert!(JFrogArtifactory.list_resources("job", ctx).await.unwrap().is_empty());
        assert_eq!(transport.request_count().await, 1);
    }

    #[test]
    fn test_descriptor() {
        let names: Vec<_> = JFrogArtifactory
            .components()
            .iter()
            .map(|component| component.name())
            .collect();
        assert_eq!(
            names,
            [
                "jfrogArtifactory.getArtifactInfo",
                "jfrogArtifactory.uploadArtifact",
                "jfrogArtifactory.deleteArtifact",
            ]
        );
        assert!(JFrogArtifactory.triggers().is_empty());
    }
}
