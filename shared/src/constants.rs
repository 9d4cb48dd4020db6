//! # Constants for the Device Registry SDK
//!
//! This module contains the wire-level constants shared by the registry
//! client and its transport: API version, header names, paths and limits.

// =============================================================================
// API VERSION
// =============================================================================

/// Service API version appended to every request path
pub const API_VERSION: &str = "2016-11-14";

/// Build the query-string suffix carrying the API version
pub fn version_query_string(api_version: &str) -> String {
    format!("?api-version={}", api_version)
}

// =============================================================================
// RESOURCE PATHS
// =============================================================================

/// Device identity collection
pub const DEVICES_PATH: &str = "/devices";

/// Device twin collection
pub const TWINS_PATH: &str = "/twins";

/// Query endpoint for the device collection
pub const DEVICES_QUERY_PATH: &str = "/devices/query";

/// Import/export job collection
pub const JOBS_PATH: &str = "/jobs";

/// Import/export job creation endpoint
pub const JOBS_CREATE_PATH: &str = "/jobs/create";

/// Registry statistics endpoint
pub const STATISTICS_PATH: &str = "/statistics/devices";

// =============================================================================
// HEADERS
// =============================================================================

/// Content-Type header name
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Content type used by every body-bearing request
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Conditional request header
pub const HEADER_IF_MATCH: &str = "If-Match";

/// Wildcard etag for unconditional operations
pub const ETAG_WILDCARD: &str = "*";

/// Per-call correlation identifier
pub const HEADER_REQUEST_ID: &str = "Request-Id";

/// Authorization header name (carries the shared access signature)
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// Continuation token header (request and response)
pub const HEADER_CONTINUATION: &str = "x-ms-continuation";

/// Page size header for queries
pub const HEADER_MAX_ITEM_COUNT: &str = "x-ms-max-item-count";

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum number of identities accepted by a single bulk operation
pub const MAX_BULK_DEVICES: usize = 100;

/// Default request timeout for the HTTP executor (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default user agent
pub const DEFAULT_USER_AGENT: &str = concat!("device-registry-sdk/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// ENVIRONMENT VARIABLE NAMES
// =============================================================================

/// Environment variable for the registry host name
pub const ENV_REGISTRY_HOST: &str = "REGISTRY_HOST";

/// Environment variable for the shared access signature
pub const ENV_REGISTRY_SAS: &str = "REGISTRY_SHARED_ACCESS_SIGNATURE";

/// Environment variable overriding the API version
pub const ENV_REGISTRY_API_VERSION: &str = "REGISTRY_API_VERSION";

/// Environment variable overriding the request timeout
pub const ENV_REGISTRY_TIMEOUT_SECS: &str = "REGISTRY_REQUEST_TIMEOUT_SECS";
