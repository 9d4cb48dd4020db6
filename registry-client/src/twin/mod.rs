//! # Device Twin
//!
//! Read-only view of a device's property-bag document (tags, desired and
//! reported properties) together with its etag. A `Twin` is only produced by
//! parsing a service response; every fetch yields a new value.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use shared::error::{RegistryError, RegistryResult};

use crate::transport::ResponseBody;

/// Desired and reported property trees
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TwinProperties {
    #[serde(default, deserialize_with = "null_as_default")]
    desired: Map<String, Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    reported: Map<String, Value>,
}

impl TwinProperties {
    pub fn desired(&self) -> &Map<String, Value> {
        &self.desired
    }

    pub fn reported(&self) -> &Map<String, Value> {
        &self.reported
    }
}

/// A device twin as returned by the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Twin {
    #[serde(default)]
    device_id: String,

    #[serde(default)]
    etag: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    tags: Map<String, Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    properties: TwinProperties,

    /// Fields this SDK does not model
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Twin {
    /// Parse a response body, accepting either a pre-parsed document or its
    /// serialized text.
    pub fn from_body(body: ResponseBody) -> RegistryResult<Self> {
        Self::from_value(body.into_json()?)
    }

    /// Parse an already-decoded document
    pub fn from_value(value: Value) -> RegistryResult<Self> {
        match value {
            Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Err(RegistryError::MalformedResponse(format!(
                "expected a twin document, got {}",
                other
            ))),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Optimistic concurrency tag for conditional updates
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn tags(&self) -> &Map<String, Value> {
        &self.tags
    }

    pub fn properties(&self) -> &TwinProperties {
        &self.properties
    }

    /// Any other top-level field of the document
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Reads an explicit `null` the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
