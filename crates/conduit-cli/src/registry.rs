//! Integrations known to the CLI.

use std::sync::Arc;

use conduit_artifactory::JFrogArtifactory;
use conduit_core::{Registry, Result};
use conduit_jenkins::Jenkins;

/// Builds the registry of every bundled integration.
pub fn registry() -> Result<Registry> {
    Registry::new()
        .with(Arc::new(Jenkins))?
        .with(Arc::new(JFrogArtifactory))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_integrations() {
        let registry = registry().unwrap();
        let names: Vec<_> = registry.integrations().map(|i| i.name()).collect();

        assert_eq!(names, ["jenkins", "jfrogArtifactory"]);
        assert!(registry.trigger("jenkins.onBuildFinished").is_some());
        assert!(registry.component("jfrogArtifactory.uploadArtifact").is_some());
    }
}
