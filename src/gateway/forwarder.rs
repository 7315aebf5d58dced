//! The per-request forwarding pipeline
//!
//! Strictly sequential, no retries, every failure terminal for that one
//! request: merge the router-supplied path values with translated query
//! values, render the remote pattern, relay the call through the
//! injected client, strip the relay's own framing headers from the
//! reply, and fold the route's hooks over the result. Bindings are
//! immutable and shared read-only, so one request's failure never
//! affects another's routing state.

use axum::body::Body;
use bytes::Bytes;
use http::{Request, Uri};
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::time::Duration;

use crate::gateway::headers::{outbound_headers, strip_hop_by_hop};
use crate::gateway::route::RouteBinding;
use crate::gateway::transport::UpstreamClient;
use crate::gateway::types::{
    ForwardedResponse, GatewayError, GatewayResult, RequestId, UpstreamBaseUrl,
};
use crate::pattern::VariableMap;

/// Relays one upstream's requests through an injected HTTP client
///
/// Constructed once at startup per upstream; the client lives for the
/// process and is shared across concurrent requests.
#[derive(Clone)]
pub struct Forwarder {
    base_url: UpstreamBaseUrl,
    client: UpstreamClient,
    request_timeout: Duration,
}

impl Forwarder {
    pub fn new(
        base_url: UpstreamBaseUrl,
        client: UpstreamClient,
        request_timeout: Duration,
    ) -> Self {
        Self {
            base_url,
            client,
            request_timeout,
        }
    }

    pub fn base_url(&self) -> &UpstreamBaseUrl {
        &self.base_url
    }

    /// Relay one inbound request along `route`.
    ///
    /// `path_values` comes from the host router, which matched the local
    /// pattern's path shape and must supply a value for every path
    /// variable name. Inbound query keys with no binding on the local
    /// pattern are dropped (a simplification, not input sanitization).
    /// The raw body and the headers in `parts` (minus `Host`, cookies
    /// included) are relayed unmodified.
    pub async fn forward(
        &self,
        route: &RouteBinding,
        path_values: HashMap<String, String>,
        query_values: HashMap<String, String>,
        parts: http::request::Parts,
        body: Bytes,
        request_id: RequestId,
    ) -> GatewayResult<ForwardedResponse> {
        // Merge path values with translated query values.
        let mut variables: VariableMap = path_values.into_iter().collect();
        for (key, value) in query_values {
            if let Some(name) = route.local().query_variable_for_key(&key) {
                variables.insert(name.to_string(), value);
            }
        }

        let relative = route.remote().render(&variables)?;
        let target = format!("{}{}", self.base_url, relative);
        let uri: Uri = target
            .parse()
            .map_err(|_| GatewayError::InvalidUpstreamUri(target.clone()))?;

        tracing::debug!(
            request_id = %request_id,
            method = %parts.method,
            target = %target,
            "relaying request upstream"
        );

        let mut outgoing = Request::builder()
            .method(parts.method)
            .uri(uri)
            .body(Body::from(body))?;
        *outgoing.headers_mut() = outbound_headers(&parts.headers);

        // The client does not follow redirects; 3xx replies are relayed
        // to the caller as-is.
        let response = tokio::time::timeout(self.request_timeout, self.client.request(outgoing))
            .await
            .map_err(|_| GatewayError::UpstreamTimeout(self.request_timeout))?
            .map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))?;

        let (parts, incoming) = response.into_parts();
        let body = incoming
            .collect()
            .await
            .map_err(|e| GatewayError::Internal(format!("failed to read upstream body: {e}")))?
            .to_bytes();

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);

        let response = ForwardedResponse {
            status: parts.status,
            headers,
            body,
        };
        Ok(route.post_process(response, &variables))
    }
}
