//! # Device-Identity Normalizer
//!
//! Turns a caller-supplied identity record into the canonical shape the
//! service expects: an `authentication` descriptor that always carries an
//! explicit `type` tag.
//!
//! Rules, applied in order:
//! 1. No authentication (absent or null): synthesize `sas` with empty keys.
//! 2. Authentication without a type tag: `selfSigned` if it carries an
//!    `x509Thumbprint`, otherwise `sas`.
//! 3. Authentication already tagged: left as-is.
//!
//! The input is never modified; a new value is returned.

use serde_json::{json, Map, Value};

use shared::types::{AuthenticationType, ImportMode};

const AUTHENTICATION: &str = "authentication";
const TYPE: &str = "type";
const X509_THUMBPRINT: &str = "x509Thumbprint";
const DEVICE_ID: &str = "deviceId";
const ENTRY_ID: &str = "id";
const IMPORT_MODE: &str = "importMode";

/// Descriptor synthesized for identities that carry no authentication
pub fn default_authentication() -> Value {
    json!({
        "type": AuthenticationType::Sas.as_str(),
        "symmetricKey": {
            "primaryKey": "",
            "secondaryKey": ""
        }
    })
}

/// Normalize an identity record. Non-object values are returned unchanged.
pub fn normalize(identity: &Value) -> Value {
    let mut normalized = identity.clone();
    if let Value::Object(record) = &mut normalized {
        let authentication = normalize_authentication(record.remove(AUTHENTICATION));
        record.insert(AUTHENTICATION.into(), authentication);
    }
    normalized
}

fn normalize_authentication(authentication: Option<Value>) -> Value {
    match authentication {
        None | Some(Value::Null) => default_authentication(),
        Some(Value::Object(mut descriptor)) => {
            if !has_type_tag(&descriptor) {
                let tag = if has_value(&descriptor, X509_THUMBPRINT) {
                    AuthenticationType::SelfSigned
                } else {
                    AuthenticationType::Sas
                };
                descriptor.insert(TYPE.into(), Value::String(tag.as_str().into()));
            }
            Value::Object(descriptor)
        }
        Some(other) => other,
    }
}

fn has_type_tag(descriptor: &Map<String, Value>) -> bool {
    match descriptor.get(TYPE) {
        Some(Value::String(tag)) => !tag.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

fn has_value(descriptor: &Map<String, Value>, key: &str) -> bool {
    !matches!(descriptor.get(key), None | Some(Value::Null))
}

/// Build the bulk import/export entry for an identity: normalized, with
/// `deviceId` relabeled to `id` and tagged with the import mode.
pub fn to_import_export_entry(identity: &Value, mode: ImportMode) -> Value {
    let mut entry = normalize(identity);
    if let Value::Object(record) = &mut entry {
        if let Some(device_id) = record.remove(DEVICE_ID) {
            record.insert(ENTRY_ID.into(), device_id);
        }
        record.insert(IMPORT_MODE.into(), Value::String(mode.as_str().into()));
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_authentication_gets_empty_sas() {
        let identity = json!({ "deviceId": "deviceId" });
        let normalized = normalize(&identity);

        assert_eq!(
            normalized,
            json!({
                "deviceId": "deviceId",
                "authentication": {
                    "type": "sas",
                    "symmetricKey": { "primaryKey": "", "secondaryKey": "" }
                }
            })
        );
        // Input untouched
        assert_eq!(identity, json!({ "deviceId": "deviceId" }));
        assert_ne!(identity, normalized);
    }

    #[test]
    fn test_null_authentication_is_treated_as_missing() {
        let normalized = normalize(&json!({ "deviceId": "d", "authentication": null }));
        assert_eq!(normalized["authentication"], default_authentication());
    }

    #[test]
    fn test_thumbprint_without_type_is_self_signed() {
        let identity = json!({
            "deviceId": "d",
            "authentication": {
                "x509Thumbprint": { "primaryThumbprint": "ABC", "secondaryThumbprint": "" }
            }
        });
        let normalized = normalize(&identity);

        assert_eq!(normalized["authentication"]["type"], "selfSigned");
        assert_eq!(normalized["authentication"]["x509Thumbprint"]["primaryThumbprint"], "ABC");
        assert!(identity["authentication"].get("type").is_none());
    }

    #[test]
    fn test_symmetric_key_without_type_is_sas() {
        let normalized = normalize(&json!({
            "deviceId": "d",
            "authentication": { "symmetricKey": { "primaryKey": "p", "secondaryKey": "s" } }
        }));
        assert_eq!(normalized["authentication"]["type"], "sas");
        assert_eq!(normalized["authentication"]["symmetricKey"]["primaryKey"], "p");
    }

    #[test]
    fn test_empty_descriptor_is_sas_without_keys() {
        let normalized = normalize(&json!({ "deviceId": "d", "authentication": {} }));
        assert_eq!(normalized["authentication"], json!({ "type": "sas" }));
    }

    #[test]
    fn test_tagged_descriptor_left_as_is() {
        let identity = json!({
            "deviceId": "d",
            "authentication": { "type": "certificateAuthority", "x509Thumbprint": { "primaryThumbprint": "A" } }
        });
        assert_eq!(normalize(&identity), identity);
    }

    #[test]
    fn test_pass_through_fields_preserved() {
        let normalized = normalize(&json!({
            "deviceId": "d",
            "status": "disabled",
            "capabilities": { "iotEdge": true }
        }));
        assert_eq!(normalized["status"], "disabled");
        assert_eq!(normalized["capabilities"]["iotEdge"], true);
    }

    #[test]
    fn test_import_export_entry() {
        let identity = json!({ "deviceId": "d1", "status": "enabled" });
        let entry = to_import_export_entry(&identity, ImportMode::UpdateIfMatchETag);

        assert_eq!(
            entry,
            json!({
                "id": "d1",
                "status": "enabled",
                "importMode": "UpdateIfMatchETag",
                "authentication": {
                    "type": "sas",
                    "symmetricKey": { "primaryKey": "", "secondaryKey": "" }
                }
            })
        );
        assert_eq!(identity["deviceId"], "d1");
    }
}
