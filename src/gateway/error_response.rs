//! Unified error response handling for the gateway
//!
//! Relay failures propagate to the host untouched; this module decides
//! the client-visible status and a standardized JSON body. Compile-time
//! pattern failures never reach here: they abort route registration at
//! startup.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::gateway::headers::X_REQUEST_ID;
use crate::gateway::types::GatewayError;
use crate::pattern::PatternError;

/// Standard error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Unique error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Request ID for correlation
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Convert to an HTTP response with proper headers
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        let request_id = self.request_id.clone();
        let mut response = (status, Json(self)).into_response();

        if let Some(id) = request_id {
            if let Ok(header_value) = HeaderValue::from_str(&id) {
                response.headers_mut().insert(X_REQUEST_ID, header_value);
            }
        }
        response
    }
}

/// Extension trait for consistent error formatting
pub trait ErrorResponseExt {
    /// Convert to standardized error response
    fn to_error_response(&self) -> ErrorResponse;

    /// Get the appropriate HTTP status code
    fn status_code(&self) -> StatusCode;
}

impl ErrorResponseExt for GatewayError {
    fn to_error_response(&self) -> ErrorResponse {
        use GatewayError::*;

        match self {
            Pattern(PatternError::MissingVariable(name)) => ErrorResponse::new(
                "MISSING_VARIABLE",
                format!("No value available for variable {name}"),
            ),
            Pattern(e) => ErrorResponse::new("PATTERN_ERROR", e.to_string()),
            UnboundRemoteVariable { .. } => {
                ErrorResponse::new("ROUTE_MISCONFIGURED", self.to_string())
            }
            UpstreamUnreachable(msg) => {
                ErrorResponse::new("UPSTREAM_UNREACHABLE", format!("Upstream unreachable: {msg}"))
            }
            UpstreamTimeout(duration) => ErrorResponse::new(
                "UPSTREAM_TIMEOUT",
                format!("Upstream timed out after {duration:?}"),
            ),
            InvalidUpstreamUri(uri) => {
                ErrorResponse::new("INVALID_UPSTREAM_URI", format!("Invalid upstream URI: {uri}"))
            }
            RequestBodyTooLarge { max } => ErrorResponse::new(
                "REQUEST_TOO_LARGE",
                format!("Request body exceeds maximum of {max} bytes"),
            ),
            Tls(msg) => ErrorResponse::new("TLS_ERROR", msg.clone()),
            Http(e) => ErrorResponse::new("HTTP_ERROR", format!("HTTP error: {e}")),
            Internal(msg) => ErrorResponse::new("INTERNAL_ERROR", msg.clone()),
        }
    }

    fn status_code(&self) -> StatusCode {
        use GatewayError::*;

        match self {
            UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RequestBodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Pattern(_) | UnboundRemoteVariable { .. } | InvalidUpstreamUri(_) | Tls(_)
            | Http(_) | Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "request failed");
        }
        self.to_error_response().into_response_with_status(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn unreachable_maps_to_bad_gateway() {
        let err = GatewayError::UpstreamUnreachable("connection refused".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_error_response().code, "UPSTREAM_UNREACHABLE");
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let err = GatewayError::UpstreamTimeout(Duration::from_secs(30));
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.to_error_response().code, "UPSTREAM_TIMEOUT");
    }

    #[test]
    fn oversized_body_maps_to_payload_too_large() {
        let err = GatewayError::RequestBodyTooLarge { max: 1024 };
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn error_response_carries_request_id_header() {
        let response = ErrorResponse::new("INTERNAL_ERROR", "boom")
            .with_request_id("0198a9c1-0000-7000-8000-000000000000")
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }
}
