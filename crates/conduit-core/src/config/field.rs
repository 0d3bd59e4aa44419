//! Declarative configuration schema.

use serde::{Deserialize, Serialize};

/// Type of a configuration field, as rendered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldType {
    /// Free-form string.
    String,
    /// Boolean toggle.
    Bool,
    /// Numeric value.
    Number,
    /// String that the host evaluates as an expression before execution.
    Expression,
    /// Value picked from the integration's resource listing.
    #[serde(rename_all = "camelCase")]
    IntegrationResource {
        /// Resource type tag passed to `list_resources`.
        resource_type: String,
        /// Whether the picked resource's name (rather than its id) is stored.
        use_name_as_value: bool,
    },
}

impl FieldType {
    /// Creates an integration resource field type keyed by name.
    pub fn resource(resource_type: impl Into<String>) -> Self {
        Self::IntegrationResource {
            resource_type: resource_type.into(),
            use_name_as_value: true,
        }
    }
}

/// A single declared configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Key under which the value is stored.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Field type.
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Whether a non-empty value must be provided.
    pub required: bool,
    /// Whether the value must be masked and stored encrypted by the host.
    pub sensitive: bool,
    /// Optional help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional placeholder shown in empty inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl Field {
    /// Creates a new optional, non-sensitive field.
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: false,
            sensitive: false,
            description: None,
            placeholder: None,
        }
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Sets the help text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the placeholder.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}
