//! Argument checks run before any request is shaped.
//!
//! Each check maps one failure class to one [`ArgumentError`] variant:
//! absent → `ReferenceMissing`, wrong primitive type → `InvalidType`,
//! present but structurally wrong → `InvalidArgument`.

use serde_json::Value;

use shared::{
    constants::MAX_BULK_DEVICES,
    error::{ArgumentError, ArgumentResult},
};

/// A required string argument (id, etag, uri, query text)
pub(crate) fn require_str<'a>(value: &'a str, name: &str) -> ArgumentResult<&'a str> {
    if value.is_empty() {
        return Err(ArgumentError::ReferenceMissing(name.into()));
    }
    Ok(value)
}

/// A single identity record; returns its device id
pub(crate) fn require_identity(identity: &Value) -> ArgumentResult<&str> {
    match identity {
        Value::Null => Err(ArgumentError::ReferenceMissing("device".into())),
        Value::Object(_) => device_id_of(identity)
            .ok_or_else(|| ArgumentError::InvalidArgument("device must have a deviceId".into())),
        _ => Err(ArgumentError::InvalidType("device must be an object".into())),
    }
}

/// A free-form JSON document such as a twin patch
pub(crate) fn require_document(document: &Value, name: &str) -> ArgumentResult<()> {
    match document {
        Value::Null => Err(ArgumentError::ReferenceMissing(name.into())),
        Value::Object(_) => Ok(()),
        _ => Err(ArgumentError::InvalidType(format!("{} must be an object", name))),
    }
}

/// The device list of a bulk operation.
///
/// Checked in order: presence, sequence shape, length in
/// `1..=MAX_BULK_DEVICES`, then a deviceId on every element.
pub(crate) fn require_devices(devices: &Value) -> ArgumentResult<&[Value]> {
    let list = match devices {
        Value::Null => return Err(ArgumentError::ReferenceMissing("devices".into())),
        Value::Array(list) => list,
        _ => return Err(ArgumentError::InvalidArgument("devices must be an array".into())),
    };

    if list.is_empty() || list.len() > MAX_BULK_DEVICES {
        return Err(ArgumentError::InvalidArgument(format!(
            "The number of devices must be between 1 and {}, got {}",
            MAX_BULK_DEVICES,
            list.len()
        )));
    }

    if let Some(index) = list.iter().position(|device| device_id_of(device).is_none()) {
        return Err(ArgumentError::InvalidArgument(format!(
            "device at index {} must have a deviceId",
            index
        )));
    }

    Ok(list.as_slice())
}

/// The `force` flag of bulk update/remove.
///
/// An absent flag is reported as `ReferenceMissing`; a wrongly typed flag
/// cannot reach this point since the parameter is a `bool`.
pub(crate) fn require_force(force: Option<bool>) -> ArgumentResult<bool> {
    force.ok_or_else(|| ArgumentError::ReferenceMissing("force".into()))
}

/// Optional query page size: positive when given
pub(crate) fn check_page_size(page_size: Option<u32>) -> ArgumentResult<Option<u32>> {
    match page_size {
        Some(0) => Err(ArgumentError::InvalidArgument("pageSize must be positive".into())),
        other => Ok(other),
    }
}

fn device_id_of(device: &Value) -> Option<&str> {
    device
        .get("deviceId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_str() {
        assert_eq!(require_str("d1", "deviceId").unwrap(), "d1");
        assert_eq!(
            require_str("", "deviceId").unwrap_err(),
            ArgumentError::ReferenceMissing("deviceId".into())
        );
    }

    #[test]
    fn test_require_identity() {
        assert_eq!(require_identity(&json!({ "deviceId": "d1" })).unwrap(), "d1");
        assert!(matches!(
            require_identity(&Value::Null),
            Err(ArgumentError::ReferenceMissing(_))
        ));
        assert!(matches!(
            require_identity(&json!({ "status": "enabled" })),
            Err(ArgumentError::InvalidArgument(_))
        ));
        assert!(matches!(
            require_identity(&json!({ "deviceId": "" })),
            Err(ArgumentError::InvalidArgument(_))
        ));
        assert!(matches!(
            require_identity(&json!({ "deviceId": 7 })),
            Err(ArgumentError::InvalidArgument(_))
        ));
        assert!(matches!(
            require_identity(&json!("d1")),
            Err(ArgumentError::InvalidType(_))
        ));
    }

    #[test]
    fn test_require_devices_order() {
        assert!(matches!(
            require_devices(&Value::Null),
            Err(ArgumentError::ReferenceMissing(_))
        ));
        assert!(matches!(
            require_devices(&json!({ "deviceId": "d1" })),
            Err(ArgumentError::InvalidArgument(_))
        ));
        assert!(matches!(
            require_devices(&json!([])),
            Err(ArgumentError::InvalidArgument(_))
        ));

        let too_many: Vec<Value> = (0..=MAX_BULK_DEVICES)
            .map(|i| json!({ "deviceId": format!("d{}", i) }))
            .collect();
        assert!(matches!(
            require_devices(&Value::Array(too_many)),
            Err(ArgumentError::InvalidArgument(_))
        ));

        let exactly_max: Vec<Value> = (0..MAX_BULK_DEVICES)
            .map(|i| json!({ "deviceId": format!("d{}", i) }))
            .collect();
        assert_eq!(require_devices(&Value::Array(exactly_max)).unwrap().len(), MAX_BULK_DEVICES);

        assert_eq!(
            require_devices(&json!([{ "deviceId": "d1" }, { "status": "enabled" }])).unwrap_err(),
            ArgumentError::InvalidArgument("device at index 1 must have a deviceId".into())
        );
    }

    #[test]
    fn test_require_force() {
        assert!(require_force(Some(true)).unwrap());
        assert!(!require_force(Some(false)).unwrap());
        assert_eq!(
            require_force(None).unwrap_err(),
            ArgumentError::ReferenceMissing("force".into())
        );
    }

    #[test]
    fn test_page_size() {
        assert_eq!(check_page_size(None).unwrap(), None);
        assert_eq!(check_page_size(Some(50)).unwrap(), Some(50));
        assert!(check_page_size(Some(0)).is_err());
    }
}
