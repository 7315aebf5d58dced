//! Gateway service: turns route tables into a running Axum router
//!
//! ## Service Lifecycle
//!
//! ```rust,ignore
//! use ehr_gateway::config::Settings;
//! use ehr_gateway::gateway::GatewayService;
//!
//! // 1. Build the service from configuration (compiles every route)
//! let settings = Settings::new()?;
//! let service = GatewayService::from_settings(&settings)?;
//!
//! // 2. Convert to an Axum router
//! let router = service.into_router()?;
//!
//! // 3. Serve with Axum
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```
//!
//! Each registered upstream owns one HTTP client and one set of route
//! bindings. Route compilation failures surface here, at startup, never
//! at request time.

use axum::{
    extract::{Path, Query, Request},
    routing::{get, on, MethodFilter},
    Router,
};
use http::{HeaderMap, Method};
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::config::{Settings, UpstreamConfig};
use crate::gateway::forwarder::Forwarder;
use crate::gateway::headers::{paths, X_REQUEST_ID};
use crate::gateway::route::RouteBinding;
use crate::gateway::transport::build_client;
use crate::gateway::types::{
    ForwardedResponse, GatewayError, GatewayResult, RequestId, UpstreamBaseUrl,
};

/// One upstream backend: its forwarder plus the routes it serves
struct UpstreamRoutes {
    name: &'static str,
    forwarder: Forwarder,
    routes: Vec<RouteBinding>,
}

/// Main gateway service combining the registered upstreams
pub struct GatewayService {
    upstreams: Vec<UpstreamRoutes>,
    max_body_bytes: usize,
    request_timeout: Duration,
}

impl GatewayService {
    /// Create an empty service with the given relay limits.
    pub fn new(request_timeout: Duration, max_body_bytes: usize) -> Self {
        Self {
            upstreams: Vec::new(),
            max_body_bytes,
            request_timeout,
        }
    }

    /// Build the service from configuration, registering every known
    /// upstream and its route table.
    pub fn from_settings(settings: &Settings) -> GatewayResult<Self> {
        let mut service = Self::new(
            Duration::from_secs(settings.relay.request_timeout_secs),
            settings.relay.max_body_bytes,
        );
        service.register("ehr", &settings.upstreams.ehr, crate::upstreams::ehr::routes()?)?;
        service.register(
            "demographic",
            &settings.upstreams.demographic,
            crate::upstreams::demographic::routes()?,
        )?;
        service.register(
            "provenance",
            &settings.upstreams.provenance,
            crate::upstreams::provenance::routes()?,
        )?;
        Ok(service)
    }

    /// Register an upstream: build its client and attach its routes.
    pub fn register(
        &mut self,
        name: &'static str,
        config: &UpstreamConfig,
        routes: Vec<RouteBinding>,
    ) -> GatewayResult<()> {
        let base_url = UpstreamBaseUrl::try_new(config.base_url.clone())
            .map_err(|e| GatewayError::Internal(format!("upstream {name}: {e}")))?;
        let client = build_client(&config.tls)?;
        let forwarder = Forwarder::new(base_url, client, self.request_timeout);

        tracing::info!(
            upstream = name,
            base_url = %forwarder.base_url(),
            routes = routes.len(),
            "registered upstream"
        );
        self.upstreams.push(UpstreamRoutes {
            name,
            forwarder,
            routes,
        });
        Ok(())
    }

    /// Create the Axum router for the service.
    pub fn into_router(self) -> GatewayResult<Router> {
        let mut router = Router::new().route(paths::HEALTH, get(health_handler));

        for upstream in self.upstreams {
            let forwarder = Arc::new(upstream.forwarder);
            for binding in upstream.routes {
                let path = binding.local().axum_path();
                let filter = method_filter(binding.methods())?;
                tracing::debug!(
                    upstream = upstream.name,
                    path = %path,
                    methods = ?binding.methods(),
                    "route registered"
                );

                let route = Arc::new(binding);
                let forwarder = Arc::clone(&forwarder);
                let max_body_bytes = self.max_body_bytes;
                let handler = move |Path(path_values): Path<HashMap<String, String>>,
                                    Query(query_values): Query<HashMap<String, String>>,
                                    request: Request| {
                    let forwarder = Arc::clone(&forwarder);
                    let route = Arc::clone(&route);
                    async move {
                        relay(
                            forwarder,
                            route,
                            max_body_bytes,
                            path_values,
                            query_values,
                            request,
                        )
                        .await
                    }
                };
                router = router.route(&path, on(filter, handler));
            }
        }

        // Backstop timeout only: the forwarder's own deadline fires first.
        let backstop = self.request_timeout + Duration::from_secs(5);
        Ok(router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(backstop)),
        ))
    }
}

/// Buffer the inbound body and hand the request to the forwarder.
async fn relay(
    forwarder: Arc<Forwarder>,
    route: Arc<RouteBinding>,
    max_body_bytes: usize,
    path_values: HashMap<String, String>,
    query_values: HashMap<String, String>,
    request: Request,
) -> Result<ForwardedResponse, GatewayError> {
    let request_id = extract_request_id(request.headers());
    let (parts, body) = request.into_parts();

    let body = http_body_util::Limited::new(body, max_body_bytes)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<http_body_util::LengthLimitError>() {
                GatewayError::RequestBodyTooLarge {
                    max: max_body_bytes,
                }
            } else {
                GatewayError::Internal(format!("failed to read request body: {e}"))
            }
        })?
        .to_bytes();

    forwarder
        .forward(&route, path_values, query_values, parts, body, request_id)
        .await
}

/// Use the middleware-assigned request ID when present.
fn extract_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .map(RequestId::new)
        .unwrap_or_else(RequestId::generate)
}

fn method_filter(methods: &[Method]) -> GatewayResult<MethodFilter> {
    let mut filter: Option<MethodFilter> = None;
    for method in methods {
        let next = MethodFilter::try_from(method.clone())
            .map_err(|e| GatewayError::Internal(e.to_string()))?;
        filter = Some(match filter {
            Some(existing) => existing.or(next),
            None => next,
        });
    }
    filter.ok_or_else(|| GatewayError::Internal("route allows no methods".to_string()))
}

async fn health_handler() -> &'static str {
    "OK"
}
