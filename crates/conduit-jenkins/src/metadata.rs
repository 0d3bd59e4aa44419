//! Persisted node metadata shared by the Jenkins trigger and component.

use conduit_core::context::SetupContext;
use conduit_core::{Result, decode_metadata};
use serde::{Deserialize, Serialize};

use crate::client::JenkinsClient;

/// Tracing target for node setup.
pub const TRACING_TARGET: &str = "conduit_jenkins::setup";

/// Resolved identity of a Jenkins job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    pub name: String,
    pub url: String,
}

/// Metadata stored on a node bound to a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobInfo>,
    /// Job name exactly as configured when `job` was resolved.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
}

impl JobMetadata {
    /// Returns the resolved job when it was resolved for `job`.
    pub fn resolved_for(&self, job: &str) -> Option<&JobInfo> {
        let info = self.job.as_ref()?;
        let matches = if self.target.is_empty() {
            info.name == job
        } else {
            self.target == job
        };
        matches.then_some(info)
    }
}

/// Resolves `job` into node metadata unless it is already recorded.
///
/// Returns `true` when a remote lookup was performed. A job that cannot be
/// found leaves the stored metadata untouched.
pub async fn ensure_job(ctx: &SetupContext<'_>, job: &str) -> Result<bool> {
    let metadata: JobMetadata = decode_metadata(&ctx.metadata.get().await?)?;

    if metadata.resolved_for(job).is_some() {
        tracing::debug!(target: TRACING_TARGET, job, "job already resolved");
        return Ok(false);
    }

    let client = JenkinsClient::from_store(ctx.http, ctx.integration.configuration()).await?;
    let found = client
        .get_job(job)
        .await
        .map_err(|err| err.context(&format!("error finding job {job}")))?;

    let metadata = JobMetadata {
        job: Some(JobInfo {
            name: found.full_name,
            url: found.url,
        }),
        target: job.to_owned(),
    };
    ctx.metadata.set(serde_json::to_value(&metadata)?).await?;

    tracing::info!(target: TRACING_TARGET, job, "job resolved");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(name: &str, target: &str) -> JobMetadata {
        JobMetadata {
            job: Some(JobInfo {
                name: name.to_owned(),
                url: String::new(),
            }),
            target: target.to_owned(),
        }
    }

    #[test]
    fn test_resolved_for_prefers_configured_target() {
        let normalized = metadata("team/build", "team/build/");
        assert!(normalized.resolved_for("team/build/").is_some());
        assert!(normalized.resolved_for("team/build").is_none());

        let legacy = metadata("my-job", "");
        assert!(legacy.resolved_for("my-job").is_some());
        assert!(legacy.resolved_for("other").is_none());

        assert!(JobMetadata::default().resolved_for("my-job").is_none());
    }
}
