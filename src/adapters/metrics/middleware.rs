//! Request Observation Middleware
//!
//! Runs around every routed request and records the final status in
//! `http_requests_total` once the inner service has responded.

use std::sync::Arc;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::facade::PrometheusMetrics;

/// Count 4xx/5xx responses by method, route template and status.
///
/// Requests that matched no route are labelled with their raw path.
pub async fn track_http_errors(
    State(metrics): State<Arc<PrometheusMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| req.uri().path().to_owned(), |path| path.as_str().to_owned());

    let response = next.run(req).await;

    metrics.observe_response(&method, &route, response.status().as_u16());
    response
}
