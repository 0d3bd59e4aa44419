//! Internal error types for conduit-reqwest.

use thiserror::Error;

/// Result type alias for conduit-reqwest operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Internal error type for conduit-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Request could not be converted.
    #[error("invalid header: {0}")]
    Header(String),
}

impl From<Error> for conduit_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                let message = if e.is_timeout() {
                    "request timed out".to_owned()
                } else if e.is_connect() {
                    "connection failed".to_owned()
                } else {
                    e.to_string()
                };
                conduit_core::Error::transport()
                    .with_message(message)
                    .with_source(e)
            }
            Error::Header(name) => {
                conduit_core::Error::validation().with_message(format!("invalid header: {name}"))
            }
        }
    }
}
