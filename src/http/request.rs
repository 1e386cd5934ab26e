//! Inbound request plumbing shared by both services.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID unless the caller sent one
//! - Echo the ID on the response and carry it in the request span
//! - Record per-route request metrics
//! - Enforce the inbound request deadline

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::observability::metrics;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID generator backed by UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read the request ID set by [`with_request_layers`].
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Wrap a service router in the layers every endpoint gets.
///
/// Requests exceeding `request_timeout` answer 408.
pub fn with_request_layers(router: Router, request_timeout: Duration) -> Router {
    router
        .layer(middleware::from_fn(track_requests))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id(request),
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = request.method().to_string();

    let response = next.run(request).await;
    metrics::record_request(&route, &method, response.status().as_u16(), start);
    response
}
