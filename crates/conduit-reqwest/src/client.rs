//! [`HttpTransport`] implementation over reqwest.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use conduit_core::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ReqwestConfig;
use crate::error::{Error, Result};

/// Tracing target for transport operations.
pub const TRACING_TARGET: &str = "conduit_reqwest::client";

struct ReqwestTransportInner {
    http: Client,
    config: ReqwestConfig,
}

impl std::fmt::Debug for ReqwestTransportInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransportInner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// HTTP transport backed by a shared reqwest [`Client`].
///
/// Cheap to clone. Performs exactly one call per request; retries are left
/// to the host.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    inner: Arc<ReqwestTransportInner>,
}

impl ReqwestTransport {
    /// Creates a new transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ReqwestConfig) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET,
            timeout_secs = config.effective_timeout().as_secs(),
            "creating reqwest transport"
        );

        let http = Client::builder()
            .timeout(config.effective_timeout())
            .user_agent(config.effective_user_agent())
            .build()?;

        Ok(Self {
            inner: Arc::new(ReqwestTransportInner { http, config }),
        })
    }

    /// Creates a new transport with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ReqwestConfig::default())
    }

    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::Header(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| Error::Header(name.as_str().to_owned()))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .inner
            .http
            .request(method, request.url)
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> conduit_core::Result<HttpResponse> {
        let started_at = Instant::now();
        let method = request.method;
        let url = request.url.clone();

        match self.send(request).await {
            Ok(response) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    %method,
                    url = %url,
                    status_code = response.status,
                    elapsed_ms = started_at.elapsed().as_millis(),
                    "request completed"
                );
                Ok(response)
            }
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    %method,
                    url = %url,
                    error = %err,
                    elapsed_ms = started_at.elapsed().as_millis(),
                    "request failed"
                );
                Err(err.into())
            }
        }
    }
}
