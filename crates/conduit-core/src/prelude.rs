//! Convenient re-exports for integration authors.

pub use crate::component::{Component, DEFAULT_OUTPUT_CHANNEL, OutputChannel};
pub use crate::config::{
    ConfigValue, Configuration, Field, FieldType, decode, decode_metadata, require,
};
pub use crate::context::{
    ActionContext, CleanupContext, ConfigurationStore, EventBus, ExecutionContext,
    ExecutionState, IntegrationHandle, ListResourcesContext, MetadataStore, RequestContext,
    SetupContext, SyncContext, WebhookContext, WebhookRegistry,
};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use crate::integration::{Action, Integration, IntegrationResource, collect_resources};
pub use crate::trigger::Trigger;
pub use crate::webhook::{IgnoreReason, WebhookConfiguration, WebhookId, WebhookOutcome};
