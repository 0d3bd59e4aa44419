//! Result of a trigger handling one inbound payload.

use serde::{Deserialize, Serialize};

/// What a trigger did with an inbound webhook payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// Exactly one event was published.
    Emitted {
        /// Payload type of the published event.
        payload_type: String,
    },
    /// The payload was accepted but did not qualify for an event.
    Ignored {
        /// Why the payload was filtered out.
        reason: IgnoreReason,
    },
}

impl WebhookOutcome {
    /// Creates an emitted outcome.
    pub fn emitted(payload_type: impl Into<String>) -> Self {
        Self::Emitted {
            payload_type: payload_type.into(),
        }
    }

    /// Creates an ignored outcome.
    pub fn ignored(reason: IgnoreReason) -> Self {
        Self::Ignored { reason }
    }

    /// Returns whether an event was published.
    pub fn is_emitted(&self) -> bool {
        matches!(self, Self::Emitted { .. })
    }
}

/// Reason a well-formed payload produced no event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IgnoreReason {
    /// The payload carries no build information.
    NoBuild,
    /// The build has not reached a terminal phase.
    NonTerminalPhase { phase: String },
    /// The payload refers to another target than the trigger is bound to.
    TargetMismatch { expected: String, actual: String },
    /// The trigger does not consume webhooks.
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let outcome = WebhookOutcome::ignored(IgnoreReason::NonTerminalPhase {
            phase: "STARTED".into(),
        });
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["outcome"], "ignored");
        assert_eq!(value["reason"]["reason"], "non_terminal_phase");
        assert_eq!(value["reason"]["phase"], "STARTED");
        assert!(!outcome.is_emitted());
    }
}
