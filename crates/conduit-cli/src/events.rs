//! Event bus that logs and records emitted events.

use conduit_core::Result;
use conduit_core::context::EventBus;
use conduit_core::memory::{EmittedEvent, MemoryEventBus};
use serde_json::Value;

use crate::TRACING_TARGET_REPLAY;

/// Logs every event before recording it in memory.
#[derive(Debug, Default)]
pub struct LoggingEventBus {
    inner: MemoryEventBus,
}

impl LoggingEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in emission order.
    pub async fn events(&self) -> Vec<EmittedEvent> {
        self.inner.events().await
    }
}

#[async_trait::async_trait]
impl EventBus for LoggingEventBus {
    async fn emit(&self, payload_type: &str, data: Value) -> Result<()> {
        tracing::info!(
            target: TRACING_TARGET_REPLAY,
            payload_type,
            data = %data,
            "event emitted"
        );
        self.inner.emit(payload_type, data).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_records_events() {
        let bus = LoggingEventBus::new();
        bus.emit("jenkins.build.finished", json!({"job": {"name": "a"}}))
            .await
            .unwrap();

        let events = bus.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload_type, "jenkins.build.finished");
    }
}
