//! Minimal HTTP request/response model and the transport port.
//!
//! Integrations build [`HttpRequest`] values and hand them to the
//! host-provided [`HttpTransport`]. The transport performs exactly one call
//! with its own timeout; it never retries.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use strum::{AsRefStr, Display};
use url::Url;

use crate::{Error, ErrorKind, Result};

/// HTTP methods used by integrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An outbound HTTP request.
#[derive(Clone)]
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: Url,
    /// Request headers (lower-cased names).
    pub headers: BTreeMap<String, String>,
    /// Optional request body.
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Creates a new request without headers or body.
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Creates a `GET` request.
    pub fn get(url: Url) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a `POST` request.
    pub fn post(url: Url) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Creates a `PUT` request.
    pub fn put(url: Url) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    /// Creates a `DELETE` request.
    pub fn delete(url: Url) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Sets a header, replacing any previous value.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the request body together with its content type.
    pub fn with_body(mut self, body: impl Into<Bytes>, content_type: &str) -> Self {
        self.body = Some(body.into());
        self.with_header("content-type", content_type)
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .finish()
    }
}

/// A response received from the remote service.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers (lower-cased names).
    pub headers: BTreeMap<String, String>,
    /// Raw response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a response with the given status and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Sets a header, replacing any previous value.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Returns whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the body decoded as lossy UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|err| {
            let message = format!("error parsing response: {err}");
            Error::from(err).with_message(message)
        })
    }

    /// Fails unless the status is 2xx or explicitly allowed.
    ///
    /// The error message follows the `request got {status} code: {body}`
    /// shape so callers can surface the remote's own explanation. 404 maps to
    /// not found, 401 and 403 to credential errors, anything else to an
    /// execution error.
    pub fn error_for_status(self, allowed: &[u16]) -> Result<Self> {
        if self.is_success() || allowed.contains(&self.status) {
            return Ok(self);
        }

        let kind = match self.status {
            404 => ErrorKind::NotFound,
            401 | 403 => ErrorKind::Credential,
            _ => ErrorKind::Execution,
        };

        Err(Error::new(kind).with_message(format!(
            "request got {} code: {}",
            self.status,
            self.text()
        )))
    }
}

/// Transport used by integrations to reach the remote service.
///
/// Implemented by the host (e.g. over `reqwest`); tests use a recording fake.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs a single HTTP call. No automatic retry.
    ///
    /// Non-2xx statuses are returned as responses, not errors; only failures
    /// to obtain a response at all are reported as [`Error`]s.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_headers_are_case_insensitive() {
        let url = Url::parse("https://ci.example.com/api/json").unwrap();
        let request = HttpRequest::get(url).with_header("Authorization", "Basic abc");

        assert_eq!(request.header("authorization"), Some("Basic abc"));
        assert_eq!(request.header("AUTHORIZATION"), Some("Basic abc"));
        assert_eq!(request.method.as_ref(), "GET");
    }

    #[test]
    fn test_request_debug_hides_header_values() {
        let url = Url::parse("https://ci.example.com").unwrap();
        let request = HttpRequest::get(url).with_header("Authorization", "Bearer secret");

        assert!(!format!("{request:?}").contains("secret"));
    }

    #[test]
    fn test_error_for_status() {
        let ok = HttpResponse::new(201, "{}");
        assert!(ok.error_for_status(&[]).is_ok());

        let allowed = HttpResponse::new(304, "");
        assert!(allowed.error_for_status(&[304]).is_ok());

        let error = HttpResponse::new(403, "Forbidden")
            .error_for_status(&[])
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Credential);
        assert_eq!(
            error.message.as_deref(),
            Some("request got 403 code: Forbidden")
        );

        let missing = HttpResponse::new(404, "").error_for_status(&[]).unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);

        let failed = HttpResponse::new(500, "boom").error_for_status(&[]).unwrap_err();
        assert_eq!(failed.kind, ErrorKind::Execution);
    }

    #[test]
    fn test_json_body() {
        let response = HttpResponse::new(200, r#"{"name":"my-job"}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["name"], "my-job");

        let broken = HttpResponse::new(200, "not json");
        assert!(broken.json::<serde_json::Value>().is_err());
    }
}
