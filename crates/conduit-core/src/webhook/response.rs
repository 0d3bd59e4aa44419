//! HTTP-level answer to an inbound webhook delivery.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::WebhookOutcome;
use crate::{Error, ErrorKind, Result};

/// Response the host returns to the remote that delivered a webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    /// HTTP status code: 200, 400 for unparseable input, 500 otherwise.
    pub status_code: u16,
    /// Outcome when the trigger handled the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<WebhookOutcome>,
    /// Error message when handling failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Kind of the error when handling failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// When the delivery was handled.
    pub handled_at: Timestamp,
}

impl WebhookResponse {
    /// Creates a successful response.
    pub fn ok(outcome: WebhookOutcome) -> Self {
        Self {
            status_code: 200,
            outcome: Some(outcome),
            error: None,
            error_kind: None,
            handled_at: Timestamp::now(),
        }
    }

    /// Creates a failed response from an error.
    ///
    /// Only parse errors map to 400; every other failure is a 500.
    pub fn failed(error: &Error) -> Self {
        let status_code = match error.kind {
            ErrorKind::Parse => 400,
            _ => 500,
        };

        Self {
            status_code,
            outcome: None,
            error: Some(error.message.clone().unwrap_or_else(|| error.to_string())),
            error_kind: Some(error.kind),
            handled_at: Timestamp::now(),
        }
    }

    /// Maps a trigger's result to a response.
    pub fn from_result(result: &Result<WebhookOutcome>) -> Self {
        match result {
            Ok(outcome) => Self::ok(outcome.clone()),
            Err(error) => Self::failed(error),
        }
    }

    /// Returns whether the status code is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::IgnoreReason;

    #[test]
    fn test_from_result_status_codes() {
        let ok = WebhookResponse::from_result(&Ok(WebhookOutcome::ignored(IgnoreReason::NoBuild)));
        assert_eq!(ok.status_code, 200);
        assert!(ok.is_success());

        let parse = WebhookResponse::from_result(&Err(
            Error::parse().with_message("error parsing request body")
        ));
        assert_eq!(parse.status_code, 400);
        assert_eq!(parse.error.as_deref(), Some("error parsing request body"));

        let emission = WebhookResponse::from_result(&Err(Error::emission()));
        assert_eq!(emission.status_code, 500);

        let validation = WebhookResponse::from_result(&Err(Error::required("job")));
        assert_eq!(validation.status_code, 500);
    }
}
