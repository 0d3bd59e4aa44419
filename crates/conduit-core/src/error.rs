//! Structured error handling for integration lifecycle operations.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while driving an integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required configuration field is missing, empty or malformed.
    Validation,
    /// The remote service rejected the credentials or the verification call.
    Credential,
    /// A referenced remote target does not exist.
    NotFound,
    /// An inbound webhook body could not be parsed.
    Parse,
    /// The host event bus or execution state rejected a publication.
    Emission,
    /// A mutating call against the remote service failed.
    Execution,
    /// The HTTP transport failed before a response was received.
    Transport,
    /// Serialization/deserialization error.
    Serialization,
    /// The host-side configuration store is inconsistent.
    Configuration,
    /// Internal error.
    #[default]
    Internal,
}

impl ErrorKind {
    /// Check if this error kind is typically retryable by the host.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport)
    }

    /// Returns the HTTP status code a host should report for this kind.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Parse => 400,
            Self::NotFound => 404,
            Self::Validation => 422,
            _ => 500,
        }
    }
}

/// Structured error type with classification and context tracking.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<String>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Creates a new validation error.
    pub fn validation() -> Self {
        Self::new(ErrorKind::Validation)
    }

    /// Creates a new credential error.
    pub fn credential() -> Self {
        Self::new(ErrorKind::Credential)
    }

    /// Creates a new not found error.
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    /// Creates a new parse error.
    pub fn parse() -> Self {
        Self::new(ErrorKind::Parse)
    }

    /// Creates a new emission error.
    pub fn emission() -> Self {
        Self::new(ErrorKind::Emission)
    }

    /// Creates a new execution error.
    pub fn execution() -> Self {
        Self::new(ErrorKind::Execution)
    }

    /// Creates a new transport error.
    pub fn transport() -> Self {
        Self::new(ErrorKind::Transport)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new internal error.
    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal)
    }

    /// Shorthand for a validation error reporting a missing required field.
    pub fn required(field: &str) -> Self {
        Self::validation().with_message(format!("{field} is required"))
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Check if this error is retryable based on its kind.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns the HTTP status code a host should report for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Re-tags this error with another kind, prefixing the message.
    ///
    /// Used when a lower-level failure (e.g. a transport error) surfaces
    /// through a lifecycle step that has its own classification.
    pub fn reclassify(self, kind: ErrorKind, prefix: &str) -> Self {
        let message = match self.message {
            Some(ref m) => format!("{prefix}: {m}"),
            None => format!("{prefix}: {}", self.kind),
        };

        Self {
            kind,
            message: Some(message),
            source: self.source,
        }
    }

    /// Prefixes the message, keeping the kind.
    pub fn context(self, prefix: &str) -> Self {
        let kind = self.kind;
        self.reclassify(kind, prefix)
    }

    /// Re-tags a remote rejection as an execution failure.
    ///
    /// Transport failures keep their kind.
    pub fn into_execution(self, prefix: &str) -> Self {
        let kind = match self.kind {
            ErrorKind::Transport => ErrorKind::Transport,
            _ => ErrorKind::Execution,
        };
        self.reclassify(kind, prefix)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::from_source(ErrorKind::Serialization, error).with_message("invalid JSON")
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Self::from_source(ErrorKind::Validation, error).with_message("invalid URL")
    }
}
