//! Type definitions for the gateway module

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use nutype::nutype;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::pattern::PatternError;

/// Request ID for correlating gateway log lines with upstream calls
#[nutype(derive(Clone, Copy, Debug, Display, Serialize, Deserialize, From, AsRef))]
pub struct RequestId(Uuid);

impl RequestId {
    /// Create a fresh v7 request ID
    pub fn generate() -> Self {
        Self::new(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::generate()
    }
}

/// Base URL of an upstream backend
///
/// Rendered relative URLs are appended directly, so a trailing slash is
/// stripped during sanitization.
#[nutype(
    sanitize(trim, with = |url: String| url.trim_end_matches('/').to_string()),
    validate(predicate = |url: &str| url.starts_with("http://") || url.starts_with("https://")),
    derive(Clone, Debug, Display, PartialEq, Eq, Serialize, Deserialize, TryFrom, AsRef)
)]
pub struct UpstreamBaseUrl(String);

/// The relayed upstream reply, after hop-by-hop headers were stripped
///
/// Exists only for the duration of one request; hooks may replace any
/// part of it before it is serialized to the wire.
#[derive(Clone, Debug)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IntoResponse for ForwardedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Errors that can occur in the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("route {local}: remote path variable {variable} is not declared by the local pattern")]
    UnboundRemoteVariable { local: String, variable: String },

    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("upstream timed out after {0:?}")]
    UpstreamTimeout(Duration),

    #[error("invalid upstream URI: {0}")]
    InvalidUpstreamUri(String),

    #[error("request body too large (max: {max} bytes)")]
    RequestBodyTooLarge { max: usize },

    #[error("TLS configuration error: {0}")]
    Tls(String),

    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_v7() {
        let id = RequestId::generate();
        assert_eq!(id.as_ref().get_version_num(), 7);
    }

    #[test]
    fn base_url_requires_http_scheme() {
        assert!(UpstreamBaseUrl::try_new("ftp://example.com".to_string()).is_err());
        assert!(UpstreamBaseUrl::try_new("https://example.com".to_string()).is_ok());
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        let url = UpstreamBaseUrl::try_new("http://example.com/".to_string()).unwrap();
        assert_eq!(url.as_ref(), "http://example.com");
    }

    #[test]
    fn forwarded_response_serializes_status_and_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-demo", "1".parse().unwrap());
        let forwarded = ForwardedResponse {
            status: StatusCode::CREATED,
            headers,
            body: Bytes::from_static(b"done"),
        };
        let response = forwarded.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("x-demo").unwrap(), "1");
    }
}
