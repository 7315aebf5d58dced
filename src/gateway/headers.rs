//! HTTP header constants and filtering for the relay
//!
//! The four headers stripped from upstream replies describe the relay's
//! own framing (the relay re-frames the body it buffered), not the
//! upstream's, so they are never copied verbatim. `Host` is excluded
//! outbound only: the HTTP client sets it for the upstream authority.

use http::header::{self, HeaderMap};

/// Header name for request ID used for tracing and correlation
pub const X_REQUEST_ID: &str = "x-request-id";

/// Well-known paths served by the gateway itself
pub mod paths {
    /// Health check endpoint path
    pub const HEALTH: &str = "/health";
}

/// Remove the hop-by-hop framing headers from an upstream reply.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in [
        header::CONTENT_ENCODING,
        header::CONTENT_LENGTH,
        header::TRANSFER_ENCODING,
        header::CONNECTION,
    ] {
        headers.remove(name);
    }
}

/// Build the outbound header set: everything inbound except `Host`.
///
/// Cookies ride along unchanged in the `Cookie` header.
pub fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(header::HOST);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_framing_headers_only() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_ENCODING, "gzip".parse().unwrap());
        headers.insert(header::CONTENT_LENGTH, "42".parse().unwrap());
        headers.insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());
        headers.insert(header::CONNECTION, "keep-alive".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        headers.insert(header::ETAG, "\"abc\"".parse().unwrap());

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 2);
        assert!(headers.contains_key(header::CONTENT_TYPE));
        assert!(headers.contains_key(header::ETAG));
    }

    #[test]
    fn outbound_headers_drop_host_and_keep_cookies() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, "gateway.local".parse().unwrap());
        inbound.insert(header::COOKIE, "session=abc".parse().unwrap());
        inbound.insert(header::ACCEPT, "application/json".parse().unwrap());

        let outbound = outbound_headers(&inbound);

        assert!(!outbound.contains_key(header::HOST));
        assert_eq!(outbound.get(header::COOKIE).unwrap(), "session=abc");
        assert_eq!(outbound.get(header::ACCEPT).unwrap(), "application/json");
    }
}
