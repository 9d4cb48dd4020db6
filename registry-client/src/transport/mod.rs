//! # Transport Seam
//!
//! The registry never touches sockets, TLS or signatures. It hands a
//! [`RestRequest`] to an injected [`RestExecutor`] and reads back the parsed
//! body plus the raw [`TransportResponse`].
//!
//! The executor is also responsible for classifying non-success statuses into
//! [`RegistryError`] variants; the registry forwards those errors unchanged.

pub mod http;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use uuid::Uuid;

use shared::{
    constants::{CONTENT_TYPE_JSON, HEADER_CONTENT_TYPE, HEADER_REQUEST_ID},
    error::{RegistryError, RegistryResult},
};

pub use http::HttpExecutor;

/// HTTP method of a registry request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully shaped request: method, path (with API version), headers, body
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    pub method: Method,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl RestRequest {
    /// Start a request carrying a fresh correlation identifier
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(HEADER_REQUEST_ID.to_string(), Uuid::new_v4().to_string());
        Self {
            method,
            path: path.into(),
            headers,
            body: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }

    /// Attach a JSON body and its content type
    pub fn with_json_body(mut self, body: Value) -> Self {
        self.headers
            .insert(HEADER_CONTENT_TYPE.to_string(), CONTENT_TYPE_JSON.to_string());
        self.body = Some(body);
        self
    }

    /// Look up a request header by exact name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Response body as delivered by the executor.
///
/// Some transports hand back a pre-parsed document, others the serialized
/// text. Both are accepted and normalized by [`ResponseBody::into_json`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseBody {
    #[default]
    Empty,
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Turn the body into a JSON value; an empty body yields `Value::Null`
    pub fn into_json(self) -> RegistryResult<Value> {
        match self {
            ResponseBody::Empty => Ok(Value::Null),
            ResponseBody::Json(value) => Ok(value),
            ResponseBody::Text(text) if text.trim().is_empty() => Ok(Value::Null),
            ResponseBody::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        ResponseBody::Json(value)
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        ResponseBody::Text(text)
    }
}

impl From<&str> for ResponseBody {
    fn from(text: &str) -> Self {
        ResponseBody::Text(text.to_string())
    }
}

/// Raw transport response, forwarded to callers for introspection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportResponse {
    pub status: u16,
    /// Header names are stored lowercased
    pub headers: BTreeMap<String, String>,
}

impl TransportResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
        }
    }

    /// Add a header (name is lowercased)
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// The injected "execute a REST call" capability.
///
/// Implementations must resolve to exactly one outcome: the parsed body with
/// its transport response, or an error. Non-success statuses are reported as
/// classified [`RegistryError`]s (see [`RegistryError::from_status`]); failures
/// before a response arrives are reported as [`RegistryError::Transport`].
#[async_trait]
pub trait RestExecutor: Send + Sync {
    async fn execute(&self, request: RestRequest) -> RegistryResult<(ResponseBody, TransportResponse)>;
}

/// Build a generic transport failure
pub fn transport_error(reason: impl std::fmt::Display) -> RegistryError {
    RegistryError::Transport(reason.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_accepts_parsed_and_text() {
        let parsed = ResponseBody::Json(json!({ "deviceId": "d1" })).into_json().unwrap();
        let text = ResponseBody::from(r#"{"deviceId":"d1"}"#).into_json().unwrap();
        assert_eq!(parsed, text);
    }

    #[test]
    fn test_empty_body_is_null() {
        assert_eq!(ResponseBody::Empty.into_json().unwrap(), Value::Null);
        assert_eq!(ResponseBody::from("  ").into_json().unwrap(), Value::Null);
    }

    #[test]
    fn test_malformed_text_body() {
        let err = ResponseBody::from("{not json").into_json().unwrap_err();
        assert!(matches!(err, RegistryError::MalformedResponse(_)));
    }

    #[test]
    fn test_each_request_gets_its_own_request_id() {
        let first = RestRequest::new(Method::Get, "/devices");
        let second = RestRequest::new(Method::Get, "/devices");

        let first_id = first.header(HEADER_REQUEST_ID).unwrap();
        assert!(Uuid::parse_str(first_id).is_ok());
        assert_ne!(Some(first_id), second.header(HEADER_REQUEST_ID));
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let request = RestRequest::new(Method::Put, "/devices/d1").with_json_body(json!({ "deviceId": "d1" }));
        assert_eq!(request.header(HEADER_CONTENT_TYPE), Some(CONTENT_TYPE_JSON));
        assert_eq!(request.body, Some(json!({ "deviceId": "d1" })));
    }

    #[test]
    fn test_response_header_lookup_is_case_insensitive() {
        let response = TransportResponse::new(200).with_header("X-MS-Continuation", "tok");
        assert_eq!(response.header("x-ms-continuation"), Some("tok"));
        assert_eq!(response.header("X-Ms-Continuation"), Some("tok"));
        assert_eq!(response.header("etag"), None);
    }
}
