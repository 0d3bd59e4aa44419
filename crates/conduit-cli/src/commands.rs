//! Subcommand handlers.
//!
//! Each handler drives one lifecycle entry point against the in-memory host
//! and prints its result as pretty JSON on stdout.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use conduit_core::context::{EventBus, ListResourcesContext, SyncContext};
use conduit_core::http::HttpTransport;
use conduit_core::memory::{EmittedEvent, MemoryConfigurationStore, MemoryIntegration};
use conduit_core::webhook::WebhookResponse;
use conduit_core::{Configuration, Registry, WebhookBinding, WebhookDelivery, WebhookDispatcher};
use serde::Serialize;
use serde_json::{Value, json};
use url::Url;

use crate::TRACING_TARGET_REPLAY;
use crate::config::Command;
use crate::events::LoggingEventBus;

/// Runs one subcommand.
pub async fn execute(
    command: Command,
    registry: Arc<Registry>,
    http: &dyn HttpTransport,
    webhooks_base_url: Option<&Url>,
) -> anyhow::Result<()> {
    match command {
        Command::Integrations => print_json(&describe(&registry)),
        Command::Sync {
            integration,
            config,
        } => sync(&registry, http, &integration, &config, webhooks_base_url).await,
        Command::Resources {
            integration,
            resource_type,
            config,
        } => resources(&registry, http, &integration, &resource_type, &config).await,
        Command::Replay {
            trigger,
            trigger_config,
            body,
            header,
        } => replay(registry, &trigger, &trigger_config, &body, header).await,
    }
}

/// Describes every registered integration and its nodes.
fn describe(registry: &Registry) -> Value {
    let integrations: Vec<Value> = registry
        .integrations()
        .map(|integration| {
            let triggers: Vec<Value> = integration
                .triggers()
                .iter()
                .map(|trigger| {
                    json!({
                        "name": trigger.name(),
                        "label": trigger.label(),
                        "description": trigger.description(),
                        "payloadType": trigger.payload_type(),
                        "configuration": trigger.configuration(),
                    })
                })
                .collect();
            let components: Vec<Value> = integration
                .components()
                .iter()
                .map(|component| {
                    json!({
                        "name": component.name(),
                        "label": component.label(),
                        "description": component.description(),
                        "payloadType": component.payload_type(),
                        "configuration": component.configuration(),
                    })
                })
                .collect();

            json!({
                "name": integration.name(),
                "label": integration.label(),
                "description": integration.description(),
                "configuration": integration.configuration(),
                "triggers": triggers,
                "components": components,
            })
        })
        .collect();

    Value::Array(integrations)
}

async fn sync(
    registry: &Registry,
    http: &dyn HttpTransport,
    name: &str,
    config_path: &Path,
    webhooks_base_url: Option<&Url>,
) -> anyhow::Result<()> {
    let integration = registry.require_integration(name)?;
    let configuration = read_configuration(config_path)?;
    let handle = MemoryIntegration::new(MemoryConfigurationStore::from_configuration(
        &configuration,
        &integration.configuration(),
    ));

    integration
        .sync(SyncContext {
            configuration: &configuration,
            http,
            integration: &handle,
            webhooks_base_url,
        })
        .await
        .with_context(|| format!("failed to sync {name}"))?;

    let webhooks: Vec<Value> = handle
        .webhook_registry()
        .registrations()
        .await
        .into_iter()
        .map(|(configuration, id)| json!({"id": id, "configuration": configuration}))
        .collect();

    print_json(&json!({
        "integration": name,
        "ready": handle.is_ready(),
        "metadata": handle.metadata_store().snapshot().await,
        "webhooks": webhooks,
    }))
}

async fn resources(
    registry: &Registry,
    http: &dyn HttpTransport,
    name: &str,
    resource_type: &str,
    config_path: &Path,
) -> anyhow::Result<()> {
    let integration = registry.require_integration(name)?;
    let configuration = read_configuration(config_path)?;
    let handle = MemoryIntegration::new(MemoryConfigurationStore::from_configuration(
        &configuration,
        &integration.configuration(),
    ));

    let resources = integration
        .list_resources(
            resource_type,
            ListResourcesContext {
                http,
                integration: &handle,
            },
        )
        .await
        .with_context(|| format!("failed to list {resource_type} resources of {name}"))?;

    print_json(&resources)
}

async fn replay(
    registry: Arc<Registry>,
    trigger: &str,
    trigger_config: &str,
    body_path: &Path,
    headers: Vec<(String, String)>,
) -> anyhow::Result<()> {
    let configuration =
        parse_configuration(trigger_config).context("invalid trigger configuration")?;
    let body = std::fs::read(body_path)
        .with_context(|| format!("failed to read {}", body_path.display()))?;
    let delivery = headers
        .into_iter()
        .fold(WebhookDelivery::new(body), |delivery, (name, value)| {
            delivery.with_header(name, value)
        });

    let (response, emitted) = replay_delivery(registry, trigger, configuration, &delivery).await;
    print_json(&json!({"response": response, "events": emitted}))?;

    if !response.is_success() {
        bail!(
            "webhook answered {}: {}",
            response.status_code,
            response.error.unwrap_or_default()
        );
    }
    Ok(())
}

/// Dispatches one delivery to `trigger` and returns the response with the
/// events it emitted.
async fn replay_delivery(
    registry: Arc<Registry>,
    trigger: &str,
    configuration: Configuration,
    delivery: &WebhookDelivery,
) -> (WebhookResponse, Vec<EmittedEvent>) {
    let events = Arc::new(LoggingEventBus::new());
    let binding = WebhookBinding {
        node: trigger.to_owned(),
        configuration,
        events: Arc::clone(&events) as Arc<dyn EventBus>,
    };

    let response = WebhookDispatcher::new(registry)
        .dispatch(&binding, delivery)
        .await;
    let emitted = events.events().await;

    tracing::debug!(
        target: TRACING_TARGET_REPLAY,
        status_code = response.status_code,
        events = emitted.len(),
        "replay finished"
    );

    (response, emitted)
}

fn read_configuration(path: &Path) -> anyhow::Result<Configuration> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_configuration(&raw).with_context(|| format!("invalid configuration in {}", path.display()))
}

fn parse_configuration(raw: &str) -> anyhow::Result<Configuration> {
    match serde_json::from_str(raw)? {
        Value::Object(map) => Ok(map),
        _ => bail!("expected a JSON object"),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
