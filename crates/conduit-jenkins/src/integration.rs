//! The `jenkins` integration descriptor.

use std::sync::Arc;

use conduit_core::prelude::*;
use conduit_core::webhook::webhook_url;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::JenkinsClient;
use crate::on_build_finished::OnBuildFinished;
use crate::trigger_build::TriggerBuild;

/// Tracing target for integration lifecycle calls.
pub const TRACING_TARGET: &str = "conduit_jenkins::integration";

/// Metadata key holding the public webhook URL.
pub const WEBHOOK_URL_KEY: &str = "webhookURL";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JenkinsConfiguration {
    #[serde(default)]
    url: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    api_token: String,
}

impl JenkinsConfiguration {
    fn validate(&self) -> Result<()> {
        require("url", &self.url)?;
        require("username", &self.username)?;
        require("apiToken", &self.api_token)
    }
}

/// Trigger, monitor and react to Jenkins builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct Jenkins;

#[async_trait::async_trait]
impl Integration for Jenkins {
    fn name(&self) -> &'static str {
        "jenkins"
    }

    fn label(&self) -> &'static str {
        "Jenkins"
    }

    fn icon(&self) -> &'static str {
        "jenkins"
    }

    fn description(&self) -> &'static str {
        "Trigger, monitor, and react to Jenkins builds"
    }

    fn instructions(&self) -> &'static str {
        include_str!("docs/instructions.md")
    }

    fn configuration(&self) -> Vec<Field> {
        vec![
            Field::new("url", "URL", FieldType::String)
                .required()
                .with_description("Jenkins server URL")
                .with_placeholder("e.g. https://jenkins.example.com"),
            Field::new("username", "Username", FieldType::String)
                .required()
                .with_description("Jenkins username"),
            Field::new("apiToken", "API Token", FieldType::String)
                .required()
                .sensitive()
                .with_description("Jenkins API token"),
        ]
    }

    fn components(&self) -> Vec<Arc<dyn Component>> {
        vec![Arc::new(TriggerBuild)]
    }

    fn triggers(&self) -> Vec<Arc<dyn Trigger>> {
        vec![Arc::new(OnBuildFinished)]
    }

    async fn sync(&self, ctx: SyncContext<'_>) -> Result<()> {
        let config: JenkinsConfiguration = decode(ctx.configuration)?;
        config.validate()?;

        let client = JenkinsClient::from_store(ctx.http, ctx.integration.configuration()).await?;
        let info = client
            .server_info()
            .await
            .map_err(|err| err.reclassify(ErrorKind::Credential, "error verifying credentials"))?;

        tracing::debug!(
            target: TRACING_TARGET,
            mode = %info.mode,
            use_security = info.use_security,
            "jenkins credentials verified"
        );

        let webhook_id = ctx
            .integration
            .webhooks()
            .ensure_integration_webhook(&WebhookConfiguration::default())
            .await
            .map_err(|err| err.context("error ensuring webhook"))?;

        let mut metadata = match ctx.integration.metadata().get().await? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let (Some(id), Some(base)) = (webhook_id, ctx.webhooks_base_url) {
            metadata.insert(WEBHOOK_URL_KEY.to_owned(), webhook_url(base, &id).into());
        }
        ctx.integration.metadata().set(Value::Object(metadata)).await?;

        ctx.integration.mark_ready().await?;
        tracing::info!(target: TRACING_TARGET, "jenkins integration ready");
        Ok(())
    }

    async fn list_resources(
        &self,
        resource_type: &str,
        ctx: ListResourcesContext<'_>,
    ) -> Result<Vec<IntegrationResource>> {
        if resource_type != "job" {
            return Ok(Vec::new());
        }

        let client = JenkinsClient::from_store(ctx.http, ctx.integration.configuration()).await?;
        let jobs = client.list_jobs().await?;
        Ok(collect_resources(
            resource_type,
            jobs.into_iter().map(|job| job.full_name),
        ))
    }
}
