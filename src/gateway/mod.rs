//! Gateway module: the forwarding pipeline and its host wiring
//!
//! Requests flow through six sequential steps: receive, translate the
//! inbound variables, dispatch to the remote template, relay the call
//! upstream, post-process the reply through the route's hooks, and
//! respond. Routing state is frozen at startup; a failing request
//! affects nothing but itself.

pub mod error_response;
pub mod forwarder;
pub mod headers;
pub mod hooks;
pub mod route;
pub mod service;
pub mod transport;
pub mod types;

pub use error_response::{ErrorResponse, ErrorResponseExt};
pub use forwarder::Forwarder;
pub use hooks::Hook;
pub use route::{Route, RouteBinding};
pub use service::GatewayService;
pub use types::{ForwardedResponse, GatewayError, GatewayResult, RequestId, UpstreamBaseUrl};
