//! Explicit, host-driven registry of integration descriptors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::component::Component;
use crate::integration::Integration;
use crate::trigger::Trigger;
use crate::{Error, Result};

/// Tracing target for registry operations.
pub const TRACING_TARGET: &str = "conduit_core::registry";

/// Name-keyed index of integrations and the nodes they expose.
///
/// Populated by the host at startup; nothing registers itself.
#[derive(Clone, Default)]
pub struct Registry {
    integrations: BTreeMap<&'static str, Arc<dyn Integration>>,
    triggers: BTreeMap<&'static str, Arc<dyn Trigger>>,
    components: BTreeMap<&'static str, Arc<dyn Component>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an integration together with its triggers and components.
    ///
    /// Fails without modifying the registry when any name is already taken.
    pub fn register(&mut self, integration: Arc<dyn Integration>) -> Result<()> {
        let name = integration.name();
        if self.integrations.contains_key(name) {
            return Err(duplicate("integration", name));
        }

        let triggers = integration.triggers();
        let components = integration.components();

        if let Some(t) = triggers.iter().find(|t| self.triggers.contains_key(t.name())) {
            return Err(duplicate("trigger", t.name()));
        }
        if let Some(c) = components
            .iter()
            .find(|c| self.components.contains_key(c.name()))
        {
            return Err(duplicate("component", c.name()));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            integration = name,
            triggers = triggers.len(),
            components = components.len(),
            "registered integration"
        );

        self.triggers
            .extend(triggers.into_iter().map(|t| (t.name(), t)));
        self.components
            .extend(components.into_iter().map(|c| (c.name(), c)));
        self.integrations.insert(name, integration);
        Ok(())
    }

    /// Builder-style variant of [`Registry::register`].
    pub fn with(mut self, integration: Arc<dyn Integration>) -> Result<Self> {
        self.register(integration)?;
        Ok(self)
    }

    pub fn integration(&self, name: &str) -> Option<Arc<dyn Integration>> {
        self.integrations.get(name).cloned()
    }

    pub fn trigger(&self, name: &str) -> Option<Arc<dyn Trigger>> {
        self.triggers.get(name).cloned()
    }

    pub fn component(&self, name: &str) -> Option<Arc<dyn Component>> {
        self.components.get(name).cloned()
    }

    /// Iterates over registered integrations in name order.
    pub fn integrations(&self) -> impl Iterator<Item = &Arc<dyn Integration>> {
        self.integrations.values()
    }

    /// Looks up an integration, failing with a not found error.
    pub fn require_integration(&self, name: &str) -> Result<Arc<dyn Integration>> {
        self.integration(name)
            .ok_or_else(|| Error::not_found().with_message(format!("unknown integration: {name}")))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("integrations", &self.integrations.keys().collect::<Vec<_>>())
            .field("triggers", &self.triggers.keys().collect::<Vec<_>>())
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn duplicate(kind: &str, name: &str) -> Error {
    Error::configuration().with_message(format!("{kind} {name} is already registered"))
}
