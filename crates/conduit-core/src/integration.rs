//! Integration descriptors.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::config::Field;
use crate::context::{
    ActionContext, CleanupContext, ListResourcesContext, RequestContext, SyncContext,
};
use crate::trigger::Trigger;
use crate::{Error, Result};

/// A remote resource offered in configuration pickers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntegrationResource {
    /// Resource type tag (e.g. `"job"`).
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Canonical name.
    pub name: String,
    /// Identifier; equal to the name for every shipped integration.
    pub id: String,
}

impl IntegrationResource {
    /// Creates a resource whose id is its name.
    pub fn named(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            resource_type: resource_type.into(),
            id: name.clone(),
            name,
        }
    }
}

/// Builds a resource listing from raw names.
///
/// Empty names are skipped and duplicate ids keep their first occurrence.
pub fn collect_resources<I, S>(resource_type: &str, names: I) -> Vec<IntegrationResource>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(Into::into)
        .filter(|name| !name.trim().is_empty())
        .map(|name| IntegrationResource::named(resource_type, name))
        .filter(|resource| seen.insert(resource.id.clone()))
        .collect()
}

/// A user-invocable action exposed by an integration, trigger or component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<Field>,
}

/// Error returned for an action name nobody declared.
pub fn unknown_action(name: &str) -> Error {
    Error::validation().with_message(format!("unknown action: {name}"))
}

/// An external service integration.
#[async_trait::async_trait]
pub trait Integration: Send + Sync {
    /// Unique name tag (e.g. `"jenkins"`).
    fn name(&self) -> &'static str;

    fn label(&self) -> &'static str;

    fn icon(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Markdown setup instructions shown to the user.
    fn instructions(&self) -> &'static str {
        ""
    }

    /// Declared configuration schema.
    fn configuration(&self) -> Vec<Field>;

    fn components(&self) -> Vec<Arc<dyn Component>>;

    fn triggers(&self) -> Vec<Arc<dyn Trigger>>;

    /// Verifies credentials, provisions shared webhooks and marks the
    /// integration ready.
    async fn sync(&self, ctx: SyncContext<'_>) -> Result<()>;

    /// Tears the integration down. Best effort and repeatable.
    async fn cleanup(&self, _ctx: CleanupContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Lists remote resources of `resource_type`.
    ///
    /// Unknown types yield an empty list without touching the network.
    async fn list_resources(
        &self,
        resource_type: &str,
        ctx: ListResourcesContext<'_>,
    ) -> Result<Vec<IntegrationResource>>;

    /// Handles an HTTP request addressed to the integration itself.
    async fn handle_request(&self, _ctx: RequestContext<'_>) -> Result<()> {
        Ok(())
    }

    fn actions(&self) -> Vec<Action> {
        Vec::new()
    }

    async fn handle_action(&self, ctx: ActionContext<'_>) -> Result<()> {
        Err(unknown_action(ctx.name))
    }
}
