//! # HTTP Executor
//!
//! Default [`RestExecutor`] backed by reqwest. It prefixes paths with the
//! registry base URL, attaches the authorization signature and user agent,
//! and classifies non-success statuses.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use shared::{
    config::RegistryConfig,
    constants::{HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE},
    error::{RegistryError, RegistryResult},
};

use super::{transport_error, Method, ResponseBody, RestExecutor, RestRequest, TransportResponse};

/// reqwest-backed executor
pub struct HttpExecutor {
    /// Registry base URL (scheme + host)
    base_url: String,

    /// Value of the Authorization header
    authorization: String,

    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpExecutor {
    /// Create a new HttpExecutor for the configured registry
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url(),
            authorization: config.shared_access_signature.clone(),
            http_client,
        })
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    fn build(&self, url: &str, request: &RestRequest) -> reqwest::RequestBuilder {
        let mut builder = self
            .http_client
            .request(Self::method(request.method), url)
            .header(HEADER_AUTHORIZATION, &self.authorization);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder
    }
}

#[async_trait]
impl RestExecutor for HttpExecutor {
    async fn execute(&self, request: RestRequest) -> RegistryResult<(ResponseBody, TransportResponse)> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, url = %url, "Sending registry request");

        let response = self.build(&url, &request).send().await.map_err(transport_error)?;

        let status = response.status();
        let mut transport = TransportResponse::new(status.as_u16());
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                transport = transport.with_header(name.as_str(), value);
            }
        }

        let is_json = transport
            .header(HEADER_CONTENT_TYPE)
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            warn!(status = status.as_u16(), url = %url, "Registry request failed");
            return Err(RegistryError::from_status(status.as_u16(), text));
        }

        let body = if text.is_empty() {
            ResponseBody::Empty
        } else if is_json {
            ResponseBody::Json(serde_json::from_str(&text)?)
        } else {
            ResponseBody::Text(text)
        };

        Ok((body, transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use shared::constants::{CONTENT_TYPE_JSON, HEADER_REQUEST_ID};

    #[test]
    fn test_executor_uses_config_base_url() {
        let config = RegistryConfig::new("hub.example.net", "SharedAccessSignature sr=hub");
        let executor = HttpExecutor::new(&config).unwrap();
        assert_eq!(executor.base_url, "https://hub.example.net");
        assert_eq!(executor.authorization, "SharedAccessSignature sr=hub");
    }

    #[test]
    fn test_request_carries_headers_and_json_body() {
        let config = RegistryConfig::new("hub.example.net", "SharedAccessSignature sr=hub");
        let executor = HttpExecutor::new(&config).unwrap();
        let request = RestRequest::new(Method::Put, "/devices/d1?api-version=2016-11-14")
            .with_json_body(json!({ "deviceId": "d1" }));

        let built = executor
            .build("https://hub.example.net/devices/d1", &request)
            .build()
            .unwrap();

        let headers = built.headers();
        assert_eq!(headers[HEADER_AUTHORIZATION], "SharedAccessSignature sr=hub");
        assert_eq!(headers[HEADER_CONTENT_TYPE], CONTENT_TYPE_JSON);
        assert_eq!(headers.get_all(HEADER_CONTENT_TYPE).iter().count(), 1);
        assert!(headers.contains_key(HEADER_REQUEST_ID));

        let body: Value = serde_json::from_slice(built.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body, json!({ "deviceId": "d1" }));
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(HttpExecutor::method(Method::Patch), reqwest::Method::PATCH);
        assert_eq!(HttpExecutor::method(Method::Delete), reqwest::Method::DELETE);
    }
}
