//! Artifact location shared by every component.

use conduit_core::context::SetupContext;
use conduit_core::Result;
use conduit_core::config::require;
use serde::{Deserialize, Serialize};

/// Repository and path of an artifact, as configured on a node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtifactLocation {
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub path: String,
}

impl ArtifactLocation {
    /// Fails unless both repository and path are set.
    pub fn validate(&self) -> Result<()> {
        require("repository", &self.repository)?;
        require("path", &self.path)
    }
}

/// Metadata stored on every Artifactory node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    pub repository: String,
}

/// Records the node's repository in its metadata.
pub async fn store_repository(ctx: &SetupContext<'_>, repository: &str) -> Result<()> {
    let metadata = RepositoryMetadata {
        repository: repository.to_owned(),
    };
    ctx.metadata.set(serde_json::to_value(metadata)?).await
}
