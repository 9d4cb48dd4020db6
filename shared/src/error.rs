//! # Error Types for the Device Registry SDK
//!
//! Errors fall into two disjoint classes:
//!
//! - [`ArgumentError`]: malformed calls, reported synchronously before any
//!   request is built.
//! - [`RegistryError`]: operational failures, reported only by the future
//!   returned from an operation.

use thiserror::Error;

/// Programmer/input errors raised before any network attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// A required argument is absent
    #[error("Required argument missing: {0}")]
    ReferenceMissing(String),

    /// An argument is present but structurally invalid
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An argument has the wrong primitive type
    #[error("Invalid type: {0}")]
    InvalidType(String),
}

/// Result type alias for synchronous argument validation
pub type ArgumentResult<T> = Result<T, ArgumentError>;

/// Operational errors delivered through an operation's future
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    // =========================================================================
    // CLIENT ERRORS (4xx)
    // =========================================================================

    /// 400
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 401
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// 409
    #[error("Device already exists: {0}")]
    DeviceAlreadyExists(String),

    /// 412
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// 413
    #[error("Request entity too large: {0}")]
    RequestEntityTooLarge(String),

    /// 429
    #[error("Throttled: {0}")]
    Throttled(String),

    // =========================================================================
    // SERVICE ERRORS (5xx)
    // =========================================================================

    /// 500
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    /// 502
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// 503
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// 504
    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    /// Any other non-success status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    // =========================================================================
    // TRANSPORT / PARSING
    // =========================================================================

    /// The call could not be issued or completed
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be turned into the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type alias using RegistryError
pub type RegistryResult<T> = Result<T, RegistryError>;

impl RegistryError {
    /// Classify a non-success HTTP status.
    ///
    /// Used by the transport that performs the call; the registry itself only
    /// forwards whatever the transport returns.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => RegistryError::BadRequest(message),
            401 => RegistryError::Unauthorized(message),
            403 => RegistryError::Forbidden(message),
            404 => RegistryError::DeviceNotFound(message),
            409 => RegistryError::DeviceAlreadyExists(message),
            412 => RegistryError::PreconditionFailed(message),
            413 => RegistryError::RequestEntityTooLarge(message),
            429 => RegistryError::Throttled(message),
            500 => RegistryError::InternalServerError(message),
            502 => RegistryError::BadGateway(message),
            503 => RegistryError::ServiceUnavailable(message),
            504 => RegistryError::GatewayTimeout(message),
            _ => RegistryError::UnexpectedStatus { status, message },
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            RegistryError::BadRequest(_)
            | RegistryError::Unauthorized(_)
            | RegistryError::Forbidden(_)
            | RegistryError::DeviceNotFound(_)
            | RegistryError::DeviceAlreadyExists(_)
            | RegistryError::PreconditionFailed(_)
            | RegistryError::RequestEntityTooLarge(_)
            | RegistryError::Throttled(_) => "client",

            RegistryError::InternalServerError(_)
            | RegistryError::BadGateway(_)
            | RegistryError::ServiceUnavailable(_)
            | RegistryError::GatewayTimeout(_) => "service",

            RegistryError::UnexpectedStatus { .. } => "status",

            RegistryError::Transport(_) => "transport",

            RegistryError::MalformedResponse(_) => "parse",
        }
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RegistryError::Throttled(_)
                | RegistryError::InternalServerError(_)
                | RegistryError::BadGateway(_)
                | RegistryError::ServiceUnavailable(_)
                | RegistryError::GatewayTimeout(_)
                | RegistryError::Transport(_)
        )
    }
}

// =============================================================================
// ERROR CONVERSIONS
// =============================================================================

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::MalformedResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(
            RegistryError::from_status(404, "gone"),
            RegistryError::DeviceNotFound("gone".into())
        );
        assert_eq!(
            RegistryError::from_status(409, "dup"),
            RegistryError::DeviceAlreadyExists("dup".into())
        );
        assert_eq!(
            RegistryError::from_status(412, "etag"),
            RegistryError::PreconditionFailed("etag".into())
        );
        assert_eq!(
            RegistryError::from_status(418, "teapot"),
            RegistryError::UnexpectedStatus { status: 418, message: "teapot".into() }
        );
    }

    #[test]
    fn test_error_category() {
        assert_eq!(RegistryError::DeviceNotFound("d".into()).category(), "client");
        assert_eq!(RegistryError::ServiceUnavailable("s".into()).category(), "service");
        assert_eq!(RegistryError::Transport("reset".into()).category(), "transport");
    }

    #[test]
    fn test_is_retryable() {
        assert!(RegistryError::Throttled("slow down".into()).is_retryable());
        assert!(RegistryError::Transport("connection reset".into()).is_retryable());
        assert!(!RegistryError::PreconditionFailed("etag".into()).is_retryable());
    }

    #[test]
    fn test_malformed_json_conversion() {
        let err: RegistryError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.category(), "parse");
    }
}
