//! JFrog Artifactory REST client over the host transport.

use bytes::Bytes;
use conduit_core::context::ConfigurationStore;
use conduit_core::http::{HttpRequest, HttpResponse, HttpTransport};
use conduit_core::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Tracing target for Artifactory API calls.
pub const TRACING_TARGET: &str = "conduit_artifactory::client";

/// Content type used when none is configured.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A repository as listed by `GET /api/repositories`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub repository_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub package_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksums {
    #[serde(default)]
    pub sha1: String,
    #[serde(default)]
    pub md5: String,
    #[serde(default)]
    pub sha256: String,
}

/// Storage information about a single artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactInfo {
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub modified_by: String,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub download_uri: String,
    #[serde(default)]
    pub mime_type: String,
    /// Size in bytes, as a decimal string.
    #[serde(default)]
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksums: Option<Checksums>,
    #[serde(default)]
    pub uri: String,
}

/// Response to a successful deploy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub download_uri: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksums: Option<Checksums>,
    #[serde(default)]
    pub uri: String,
}

/// Authenticated Artifactory client bound to one instance.
pub struct ArtifactoryClient<'a> {
    http: &'a dyn HttpTransport,
    base: String,
    access_token: String,
}

impl std::fmt::Debug for ArtifactoryClient<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactoryClient")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl<'a> ArtifactoryClient<'a> {
    /// Creates a client; trailing slashes of `url` are ignored.
    pub fn new(http: &'a dyn HttpTransport, url: &str, access_token: &str) -> Result<Self> {
        let base = url.trim().trim_end_matches('/').to_owned();
        let parsed = Url::parse(&base)
            .map_err(|err| Error::from(err).with_message(format!("url is invalid: {base}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::validation()
                .with_message(format!("unsupported url scheme: {}", parsed.scheme())));
        }

        Ok(Self {
            http,
            base,
            access_token: access_token.to_owned(),
        })
    }

    /// Creates a client from the integration's stored configuration.
    pub async fn from_store(
        http: &'a dyn HttpTransport,
        store: &dyn ConfigurationStore,
    ) -> Result<Self> {
        let url = store.required_str("url").await?;
        let access_token = store.required_str("accessToken").await?;
        Self::new(http, &url, &access_token)
    }

    /// Checks connectivity and credentials. The endpoint answers plain text.
    pub async fn ping(&self) -> Result<()> {
        let request = HttpRequest::get(self.api_url("/api/system/ping")?);
        self.send(request, &[]).await?;
        Ok(())
    }

    pub async fn list_repositories(&self) -> Result<Vec<Repository>> {
        let request = HttpRequest::get(self.api_url("/api/repositories")?)
            .with_header("accept", "application/json");
        self.send(request, &[])
            .await?
            .json()
            .map_err(|err| err.context("error parsing repositories response"))
    }

    pub async fn artifact_info(&self, repository: &str, path: &str) -> Result<ArtifactInfo> {
        let url = self.api_url(&format!("/api/storage/{repository}/{}", trim_path(path)))?;
        let request = HttpRequest::get(url).with_header("accept", "application/json");
        self.send(request, &[])
            .await?
            .json()
            .map_err(|err| err.context("error parsing artifact info response"))
    }

    /// Deploys `content` to `repository/path`.
    ///
    /// An empty `content_type` falls back to [`DEFAULT_CONTENT_TYPE`].
    pub async fn deploy_artifact(
        &self,
        repository: &str,
        path: &str,
        content: impl Into<Bytes>,
        content_type: &str,
    ) -> Result<DeployResponse> {
        let content_type = match content_type.trim() {
            "" => DEFAULT_CONTENT_TYPE,
            other => other,
        };
        let url = self.api_url(&format!("/{repository}/{}", trim_path(path)))?;
        let request = HttpRequest::put(url)
            .with_header("accept", "application/json")
            .with_body(content, content_type);

        self.send(request, &[201])
            .await?
            .json()
            .map_err(|err| err.context("error parsing deploy response"))
    }

    pub async fn delete_artifact(&self, repository: &str, path: &str) -> Result<()> {
        let url = self.api_url(&format!("/{repository}/{}", trim_path(path)))?;
        self.send(HttpRequest::delete(url), &[204]).await?;
        Ok(())
    }

    async fn send(&self, request: HttpRequest, allowed: &[u16]) -> Result<HttpResponse> {
        tracing::debug!(
            target: TRACING_TARGET,
            method = %request.method,
            path = request.url.path(),
            "calling artifactory"
        );

        let request =
            request.with_header("authorization", format!("Bearer {}", self.access_token));
        self.http.execute(request).await?.error_for_status(allowed)
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{path}", self.base))?)
    }
}

fn trim_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use conduit_core::ErrorKind;
    use conduit_core::http::HttpMethod;
    use conduit_core::mock::MockTransport;
    use serde_json::json;

    use super::*;

    const BASE: &str = "https://acme.jfrog.io/artifactory/";

    #[tokio::test]
    async fn test_ping_uses_bearer_token() {
        let transport = MockTransport::new().respond(200, "OK");
        let client = ArtifactoryClient::new(&transport, BASE, "tok").unwrap();

        client.ping().await.unwrap();

        let request = &transport.requests().await[0];
        assert_eq!(
            request.url.as_str(),
            "https://acme.jfrog.io/artifactory/api/system/ping"
        );
        assert_eq!(request.header("authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_deploy_trims_leading_slash_and_defaults_content_type() {
        let transport = MockTransport::new().respond_json(
            201,
            json!({"repo": "libs-release", "path": "/app/app.jar", "size": "3"}),
        );
        let client = ArtifactoryClient::new(&transport, BASE, "tok").unwrap();

        let response = client
            .deploy_artifact("libs-release", "/app/app.jar", "abc", "")
            .await
            .unwrap();
        assert_eq!(response.size, "3");
        assert!(response.checksums.is_none());

        let request = &transport.requests().await[0];
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(
            request.url.as_str(),
            "https://acme.jfrog.io/artifactory/libs-release/app/app.jar"
        );
        assert_eq!(request.header("content-type"), Some(DEFAULT_CONTENT_TYPE));
        assert_eq!(request.body.as_deref(), Some(b"abc".as_slice()));
    }

    #[tokio::test]
    async fn test_delete_accepts_no_content() {
        let transport = MockTransport::new().respond(204, "");
        let client = ArtifactoryClient::new(&transport, BASE, "tok").unwrap();

        client.delete_artifact("libs", "a/b.txt").await.unwrap();
        assert_eq!(transport.requests().await[0].method, HttpMethod::Delete);
    }

    #[tokio::test]
    async fn test_error_carries_status_and_body() {
        let transport = MockTransport::new().respond(404, r#"{"errors":[{"status":404}]}"#);
        let client = ArtifactoryClient::new(&transport, BASE, "tok").unwrap();

        let error = client.artifact_info("libs", "missing.txt").await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::NotFound);
        assert_eq!(
            error.message.as_deref(),
            Some(r#"request got 404 code: {"errors":[{"status":404}]}"#)
        );
    }

    #[tokio::test]
    async fn test_list_repositories_parse_error() {
        let transport = MockTransport::new().respond(200, "<html>");
        let client = ArtifactoryClient::new(&transport, BASE, "tok").unwrap();

        let error = client.list_repositories().await.unwrap_err();
        assert!(
            error
                .message
                .as_deref()
                .unwrap_or_default()
                .starts_with("error parsing repositories response")
        );
    }
}
