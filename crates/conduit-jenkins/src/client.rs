//! Minimal Jenkins REST client over the host transport.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use conduit_core::context::ConfigurationStore;
use conduit_core::http::{HttpRequest, HttpResponse, HttpTransport};
use conduit_core::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Tracing target for Jenkins API calls.
pub const TRACING_TARGET: &str = "conduit_jenkins::client";

/// Server description returned by `GET /api/json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub node_description: String,
    #[serde(default)]
    pub use_security: bool,
}

/// A Jenkins job (possibly inside folders).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default)]
    pub name: String,
    /// Slash-separated path including parent folders.
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub color: String,
    /// Child jobs when this job is a folder.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Default, Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<Job>,
}

/// A build parameter passed to `buildWithParameters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildParameter {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Result of queueing a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedBuild {
    /// Queue item URL taken from the `Location` header.
    pub queue_url: String,
    /// Queue item id parsed from the URL, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_id: Option<u64>,
}

/// Authenticated Jenkins client bound to one server.
pub struct JenkinsClient<'a> {
    http: &'a dyn HttpTransport,
    base: Url,
    authorization: String,
}

impl std::fmt::Debug for JenkinsClient<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JenkinsClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl<'a> JenkinsClient<'a> {
    /// Creates a client from explicit credentials.
    pub fn new(
        http: &'a dyn HttpTransport,
        url: &str,
        username: &str,
        api_token: &str,
    ) -> Result<Self> {
        let base = parse_base_url(url)?;
        let credentials = STANDARD.encode(format!("{username}:{api_token}"));

        Ok(Self {
            http,
            base,
            authorization: format!("Basic {credentials}"),
        })
    }

    /// Creates a client from the integration's stored configuration.
    pub async fn from_store(
        http: &'a dyn HttpTransport,
        store: &dyn ConfigurationStore,
    ) -> Result<Self> {
        let url = store.required_str("url").await?;
        let username = store.required_str("username").await?;
        let api_token = store.required_str("apiToken").await?;
        Self::new(http, &url, &username, &api_token)
    }

    /// Fetches the server description; used to verify credentials.
    pub async fn server_info(&self) -> Result<ServerInfo> {
        let url = self.endpoint(&["api", "json"])?;
        self.get(url).await?.json()
    }

    /// Lists jobs, flattening one level of folders.
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let mut url = self.endpoint(&["api", "json"])?;
        url.query_pairs_mut().append_pair(
            "tree",
            "jobs[name,fullName,url,color,jobs[name,fullName,url,color]]",
        );

        let list: JobList = self.get(url).await?.json()?;
        let mut jobs = Vec::with_capacity(list.jobs.len());
        for mut job in list.jobs {
            let children = std::mem::take(&mut job.jobs);
            jobs.push(job);
            jobs.extend(children);
        }
        Ok(jobs)
    }

    /// Fetches one job by its full name.
    pub async fn get_job(&self, full_name: &str) -> Result<Job> {
        let mut segments = job_segments(full_name);
        segments.extend(["api", "json"]);
        let url = self.endpoint(&segments)?;
        self.get(url).await?.json()
    }

    /// Queues a build of a job, with parameters when any are given.
    pub async fn trigger_build(
        &self,
        full_name: &str,
        parameters: &[BuildParameter],
    ) -> Result<QueuedBuild> {
        let mut segments = job_segments(full_name);
        let request = if parameters.is_empty() {
            segments.push("build");
            HttpRequest::post(self.endpoint(&segments)?)
        } else {
            segments.push("buildWithParameters");
            let form = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(parameters.iter().map(|p| (p.name.as_str(), p.value.as_str())))
                .finish();
            HttpRequest::post(self.endpoint(&segments)?)
                .with_body(form, "application/x-www-form-urlencoded")
        };

        let response = self.send(request).await?.error_for_status(&[])?;
        let queue_url = response.header("location").unwrap_or_default().to_owned();
        let queue_id = queue_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|id| id.parse().ok());

        Ok(QueuedBuild {
            queue_url,
            queue_id,
        })
    }

    async fn get(&self, url: Url) -> Result<HttpResponse> {
        self.send(HttpRequest::get(url)).await?.error_for_status(&[])
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(
            target: TRACING_TARGET,
            method = %request.method,
            path = request.url.path(),
            "calling jenkins"
        );

        let request = request
            .with_header("authorization", self.authorization.clone())
            .with_header("accept", "application/json");
        self.http.execute(request).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::validation().with_message("url must be an absolute http(s) URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Splits `folder/sub/job` into `job/folder/job/sub/job/job`.
fn job_segments(full_name: &str) -> Vec<&str> {
    full_name
        .split('/')
        .filter(|part| !part.is_empty())
        .flat_map(|part| ["job", part])
        .collect()
}

fn parse_base_url(url: &str) -> Result<Url> {
    let url = Url::parse(url.trim().trim_end_matches('/'))
        .map_err(|err| Error::from(err).with_message(format!("url is invalid: {url}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::validation().with_message(format!("unsupported url scheme: {scheme}"))),
    }
}
