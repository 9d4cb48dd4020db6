//! # Configuration for the Device Registry SDK
//!
//! The connection descriptor handed to the registry at construction. It can be
//! built directly or loaded from environment variables, and is treated as an
//! immutable value once the registry captures it.

use crate::constants::*;
use crate::error::{ArgumentError, ArgumentResult};
use serde::{Deserialize, Serialize};
use std::env;

/// Connection descriptor for a device registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Registry host name (e.g. "hub.example.net")
    pub host: String,

    /// Shared access signature sent as the Authorization header
    #[serde(skip_serializing, default)]
    pub shared_access_signature: String,

    /// API version appended to every path
    pub api_version: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent sent by the HTTP executor
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            shared_access_signature: String::new(),
            api_version: API_VERSION.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

impl RegistryConfig {
    /// Create a configuration for a host and signature with default settings
    pub fn new(host: impl Into<String>, shared_access_signature: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            shared_access_signature: shared_access_signature.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> ArgumentResult<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var(ENV_REGISTRY_HOST) {
            config.host = host;
        }

        if let Ok(sas) = env::var(ENV_REGISTRY_SAS) {
            config.shared_access_signature = sas;
        }

        if let Ok(version) = env::var(ENV_REGISTRY_API_VERSION) {
            config.api_version = version;
        }

        if let Ok(timeout) = env::var(ENV_REGISTRY_TIMEOUT_SECS) {
            config.request_timeout_secs = timeout.parse().map_err(|_| {
                ArgumentError::InvalidType(format!(
                    "{} must be a number of seconds, got '{}'",
                    ENV_REGISTRY_TIMEOUT_SECS, timeout
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ArgumentResult<()> {
        if self.host.is_empty() {
            return Err(ArgumentError::ReferenceMissing("host".into()));
        }
        if self.shared_access_signature.is_empty() {
            return Err(ArgumentError::ReferenceMissing("shared_access_signature".into()));
        }
        Ok(())
    }

    /// Query-string suffix carrying the configured API version
    pub fn version_query(&self) -> String {
        version_query_string(&self.api_version)
    }

    /// Base URL of the registry
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            self.host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.host)
        }
    }
}
