//! Integration, trigger and component configuration.
//!
//! The host hands every lifecycle entry point an untyped [`Configuration`]
//! map. Each entry point decodes it into its own typed struct with [`decode`]
//! and re-validates required fields, even when an earlier step already did
//! so: persisted configuration may have been migrated or edited by hand.

mod field;

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use field::{Field, FieldType};

use crate::{Error, Result};

/// Untyped configuration as stored by the host.
pub type Configuration = Map<String, Value>;

/// Decodes a configuration map into a typed struct.
///
/// Keys holding `null` are treated as absent so that `#[serde(default)]`
/// fields fall back to their defaults rather than failing to decode.
pub fn decode<T: DeserializeOwned>(configuration: &Configuration) -> Result<T> {
    let cleaned: Configuration = configuration
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    serde_json::from_value(Value::Object(cleaned)).map_err(|err| {
        let message = format!("failed to decode configuration: {err}");
        Error::from_source(crate::ErrorKind::Validation, err).with_message(message)
    })
}

/// Decodes a persisted metadata blob into a typed struct.
///
/// A missing (`null`) blob decodes to `T::default()`.
pub fn decode_metadata<T: DeserializeOwned + Default>(metadata: &Value) -> Result<T> {
    match metadata {
        Value::Null => Ok(T::default()),
        Value::Object(map) => decode(map).map_err(|err| {
            let message = err
                .message
                .as_deref()
                .unwrap_or_default()
                .replace("configuration", "metadata");
            err.with_message(message)
        }),
        _ => Err(Error::validation().with_message("failed to decode metadata: expected an object")),
    }
}

/// Fails with a validation error when `value` is empty or whitespace only.
pub fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::required(field));
    }
    Ok(())
}

/// Checks a configuration map against a declared schema.
///
/// Every required field must be present and non-empty; strings are checked
/// for content, other JSON types only for presence.
pub fn validate(fields: &[Field], configuration: &Configuration) -> Result<()> {
    for field in fields.iter().filter(|f| f.required) {
        let present = match configuration.get(&field.name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };

        if !present {
            return Err(Error::required(&field.name));
        }
    }
    Ok(())
}

/// A single configuration value read through a
/// [`ConfigurationStore`](crate::context::ConfigurationStore).
#[derive(Clone, PartialEq, Eq)]
pub enum ConfigValue {
    /// Plain string value.
    String(String),
    /// Sensitive string value; never printed.
    Secret(String),
    /// Boolean value.
    Bool(bool),
}

impl ConfigValue {
    /// Returns the value as a string slice, exposing secrets.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Secret(s) => Some(s),
            Self::Bool(_) => None,
        }
    }

    /// Returns the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Secret(_) => f.write_str("Secret(\"***\")"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        #[serde(default)]
        url: String,
        #[serde(default)]
        api_token: String,
    }

    fn configuration(value: Value) -> Configuration {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_decode_treats_null_as_absent() {
        let config = configuration(json!({"url": "https://ci.example.com", "apiToken": null}));
        let sample: Sample = decode(&config).unwrap();

        assert_eq!(sample.url, "https://ci.example.com");
        assert!(sample.api_token.is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        let config = configuration(json!({"url": 42}));
        let error = decode::<Sample>(&config).unwrap_err();

        assert_eq!(error.kind, crate::ErrorKind::Validation);
    }

    #[test]
    fn test_decode_metadata_null_is_default() {
        let sample: Sample = decode_metadata(&Value::Null).unwrap();
        assert!(sample.url.is_empty());

        assert!(decode_metadata::<Sample>(&json!("oops")).is_err());
    }

    #[test]
    fn test_validate_required_fields() {
        let fields = vec![
            Field::new("url", "URL", FieldType::String).required(),
            Field::new("verbose", "Verbose", FieldType::Bool),
        ];

        assert!(validate(&fields, &configuration(json!({"url": "x"}))).is_ok());

        let error = validate(&fields, &configuration(json!({"url": "  "}))).unwrap_err();
        assert_eq!(error.message.as_deref(), Some("url is required"));

        assert!(validate(&fields, &configuration(json!({}))).is_err());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let value = ConfigValue::Secret("hunter2".into());
        assert!(!format!("{value:?}").contains("hunter2"));
        assert_eq!(value.as_str(), Some("hunter2"));
    }
}
