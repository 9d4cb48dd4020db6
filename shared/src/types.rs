//! # Shared Data Types for the Device Registry SDK
//!
//! Wire shapes exchanged with the registry service. Field names follow the
//! service's camelCase JSON; unknown fields are kept in `extra` so that a
//! value read from the service can be written back without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// DEVICE IDENTITY
// =============================================================================

/// A device's registration record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Identity key of the device
    pub device_id: String,

    /// Service-assigned generation identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_id: Option<String>,

    /// Optimistic concurrency tag of the identity record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// "enabled" or "disabled"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_updated_time: Option<String>,

    /// "connected" or "disconnected"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_state_updated_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_to_device_message_count: Option<u64>,

    /// Authentication descriptor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,

    /// Device capabilities, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Value>,

    /// Fields this SDK does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Device {
    /// Create a device record with only its identity key set
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Default::default()
        }
    }

    /// Serialize into the loosely-typed identity value accepted by the registry
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Kind of authentication a device uses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AuthenticationType {
    /// Symmetric key pair
    Sas,
    /// Self-signed X.509 certificate, identified by thumbprint
    SelfSigned,
    /// Certificate issued by a registered authority; no key material
    CertificateAuthority,
}

impl AuthenticationType {
    /// Wire name of the authentication type
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticationType::Sas => "sas",
            AuthenticationType::SelfSigned => "selfSigned",
            AuthenticationType::CertificateAuthority => "certificateAuthority",
        }
    }
}

/// Authentication descriptor of a device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Authentication {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthenticationType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub symmetric_key: Option<SymmetricKey>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_thumbprint: Option<X509Thumbprint>,
}

/// Primary/secondary symmetric keys
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SymmetricKey {
    #[serde(default)]
    pub primary_key: String,
    #[serde(default)]
    pub secondary_key: String,
}

/// Primary/secondary X.509 certificate thumbprints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct X509Thumbprint {
    #[serde(default)]
    pub primary_thumbprint: String,
    #[serde(default)]
    pub secondary_thumbprint: String,
}

// =============================================================================
// BULK OPERATIONS
// =============================================================================

/// Server-side directive for each entry of a bulk operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImportMode {
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "Update")]
    Update,
    #[serde(rename = "UpdateIfMatchETag")]
    UpdateIfMatchETag,
    #[serde(rename = "Delete")]
    Delete,
    #[serde(rename = "DeleteIfMatchETag")]
    DeleteIfMatchETag,
}

impl ImportMode {
    /// Wire name of the import mode
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Create => "create",
            ImportMode::Update => "Update",
            ImportMode::UpdateIfMatchETag => "UpdateIfMatchETag",
            ImportMode::Delete => "Delete",
            ImportMode::DeleteIfMatchETag => "DeleteIfMatchETag",
        }
    }
}

impl std::fmt::Display for ImportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a bulk add/update/remove
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BulkRegistryOperationResult {
    #[serde(default)]
    pub is_successful: bool,

    #[serde(default)]
    pub errors: Vec<DeviceRegistryOperationError>,

    #[serde(default)]
    pub warnings: Vec<DeviceRegistryOperationWarning>,
}

/// Per-device failure reported by a bulk operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistryOperationError {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub error_code: Value,
    #[serde(default)]
    pub error_status: String,
}

/// Per-device warning reported by a bulk operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistryOperationWarning {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub warning_code: Value,
    #[serde(default)]
    pub warning_status: String,
}

// =============================================================================
// IMPORT / EXPORT JOBS
// =============================================================================

/// Kind of bulk job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum JobType {
    Import,
    Export,
    /// Job types this SDK does not create
    #[serde(other)]
    Unknown,
}

/// Body of a job creation request
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobCreationRequest {
    #[serde(rename = "type")]
    pub job_type: JobType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_blob_container_uri: Option<String>,

    pub output_blob_container_uri: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_keys_in_export: Option<bool>,
}

impl JobCreationRequest {
    /// Serialize into the request body
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Import/export job as reported by the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default)]
    pub job_id: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,

    /// e.g. "enqueued", "running", "completed", "failed", "cancelled"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_blob_container_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_blob_container_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_keys_in_export: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time_utc: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time_utc: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Fields this SDK does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Device counts reported by the registry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStatistics {
    #[serde(default)]
    pub total_device_count: u64,
    #[serde(default)]
    pub enabled_device_count: u64,
    #[serde(default)]
    pub disabled_device_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_keeps_unknown_fields() {
        let raw = json!({
            "deviceId": "dev-1",
            "status": "enabled",
            "authentication": { "type": "sas", "symmetricKey": { "primaryKey": "a", "secondaryKey": "b" } },
            "customField": 42
        });

        let device: Device = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(device.device_id, "dev-1");
        assert_eq!(device.status.as_deref(), Some("enabled"));
        assert_eq!(
            device.authentication.as_ref().and_then(|a| a.auth_type),
            Some(AuthenticationType::Sas)
        );
        assert_eq!(device.extra.get("customField"), Some(&json!(42)));
        assert_eq!(device.to_value(), raw);
    }

    #[test]
    fn test_new_device_serializes_only_id() {
        assert_eq!(Device::new("dev-1").to_value(), json!({ "deviceId": "dev-1" }));
    }

    #[test]
    fn test_import_mode_wire_names() {
        assert_eq!(serde_json::to_value(ImportMode::Create).unwrap(), json!("create"));
        assert_eq!(
            serde_json::to_value(ImportMode::UpdateIfMatchETag).unwrap(),
            json!("UpdateIfMatchETag")
        );
        assert_eq!(ImportMode::DeleteIfMatchETag.to_string(), "DeleteIfMatchETag");
    }

    #[test]
    fn test_job_creation_request_omits_absent_fields() {
        let request = JobCreationRequest {
            job_type: JobType::Export,
            input_blob_container_uri: None,
            output_blob_container_uri: "https://blob/out".into(),
            exclude_keys_in_export: Some(true),
        };
        assert_eq!(
            request.to_value(),
            json!({
                "type": "export",
                "outputBlobContainerUri": "https://blob/out",
                "excludeKeysInExport": true
            })
        );
    }

    #[test]
    fn test_job_parses_unknown_type() {
        let job: Job = serde_json::from_value(json!({
            "jobId": "j1",
            "type": "scheduleUpdateTwin",
            "status": "running"
        }))
        .unwrap();
        assert_eq!(job.job_type, Some(JobType::Unknown));
        assert_eq!(job.status.as_deref(), Some("running"));
    }

    #[test]
    fn test_bulk_result_defaults() {
        let result: BulkRegistryOperationResult = serde_json::from_value(json!({
            "isSuccessful": false,
            "errors": [{ "deviceId": "d1", "errorCode": 409001, "errorStatus": "exists" }]
        }))
        .unwrap();
        assert!(!result.is_successful);
        assert_eq!(result.errors[0].device_id, "d1");
        assert!(result.warnings.is_empty());
    }
}
