//! Prometheus Metrics Facade - HTTP Error Counting and Liveness
//!
//! Owns the built-in metrics (`http_requests_total`, `server_status`),
//! hands out custom metrics, and attaches the observation middleware
//! plus the `/metrics` scrape route to a host axum router.

use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{CounterVec, Gauge, GaugeVec, IntCounterVec, Opts};
use tracing::{debug, error, info};

use crate::domain::status::{is_error_status, ServerStatus};
use crate::error::MetricsError;
use crate::ports::liveness::LivenessReporter;

use super::middleware::track_http_errors;
use super::registry::MetricsRegistry;

/// Path the scrape endpoint is mounted on.
pub const METRICS_PATH: &str = "/metrics";

/// Name of the error request counter.
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// Name of the liveness gauge.
pub const SERVER_STATUS: &str = "server_status";

/// Facade over a [`MetricsRegistry`] with the built-in HTTP metrics.
pub struct PrometheusMetrics {
    /// Registry holding built-in and custom metrics.
    registry: Arc<MetricsRegistry>,
    /// Responses with status 4xx/5xx by method, route and status.
    http_requests: IntCounterVec,
    /// 1 while serving, 0 once shutdown started.
    server_status: Gauge,
}

impl PrometheusMetrics {
    /// Register the built-in metrics in `registry` and mark the server up.
    ///
    /// # Errors
    /// Fails if `http_requests_total` or `server_status` is already
    /// registered in `registry`.
    pub fn new(registry: Arc<MetricsRegistry>) -> Result<Self, MetricsError> {
        let http_requests = IntCounterVec::new(
            Opts::new(
                HTTP_REQUESTS_TOTAL,
                "Total number of HTTP requests with status codes 4xx and 5xx",
            ),
            &["method", "route", "status"],
        )?;

        let server_status = Gauge::new(
            SERVER_STATUS,
            "Gauge for monitoring server up/down status. 1 means up, 0 means down.",
        )?;

        registry.register(&http_requests)?;
        registry.register(&server_status)?;

        server_status.set(ServerStatus::Up.as_gauge());
        info!("Prometheus metrics facade initialized");

        Ok(Self {
            registry,
            http_requests,
            server_status,
        })
    }

    /// Mount the scrape route and the observation middleware on `router`.
    ///
    /// The middleware wraps every route already present on `router`,
    /// the scrape route and the fallback, so it should be called after
    /// the host has added its own routes.
    pub fn attach<S>(self: &Arc<Self>, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let scrape_self = Arc::clone(self);

        router
            .route(
                METRICS_PATH,
                get(move || {
                    let metrics = Arc::clone(&scrape_self);
                    async move { metrics.scrape_response() }
                }),
            )
            .layer(axum::middleware::from_fn_with_state(
                Arc::clone(self),
                track_http_errors,
            ))
    }

    /// Count one finished request if its status is in [400, 600).
    pub fn observe_response(&self, method: &str, route: &str, status: u16) {
        if !is_error_status(status) {
            return;
        }
        let status = status.to_string();
        self.http_requests
            .with_label_values(&[method, route, status.as_str()])
            .inc();
        debug!(method, route, status = %status, "Counted error response");
    }

    /// Set `server_status` to 1 when `is_up`, 0 otherwise.
    pub fn set_server_status(&self, is_up: bool) {
        self.server_status.set(ServerStatus::from(is_up).as_gauge());
    }

    /// Current value of `server_status`.
    pub fn server_status(&self) -> ServerStatus {
        if self.server_status.get() > 0.0 {
            ServerStatus::Up
        } else {
            ServerStatus::Down
        }
    }

    /// Register (or look up) a custom gauge.
    pub fn add_custom_gauge(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<GaugeVec, MetricsError> {
        self.registry.get_or_create_gauge(name, help, label_names)
    }

    /// Register (or look up) a custom counter.
    pub fn add_custom_counter(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<CounterVec, MetricsError> {
        self.registry.get_or_create_counter(name, help, label_names)
    }

    /// Shared registry backing this facade.
    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    /// Serialize the registry in the Prometheus text format.
    pub fn scrape(&self) -> Result<String, MetricsError> {
        self.registry.render()
    }

    fn scrape_response(&self) -> Response {
        match self.scrape() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, self.registry.content_type())],
                body,
            )
                .into_response(),
            Err(e) => {
                error!(error = %e, "Failed to encode metrics");
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
            }
        }
    }
}

impl LivenessReporter for PrometheusMetrics {
    fn set_server_status(&self, is_up: bool) {
        Self::set_server_status(self, is_up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facade() -> PrometheusMetrics {
        PrometheusMetrics::new(Arc::new(MetricsRegistry::new())).unwrap()
    }

    #[test]
    fn test_server_status_starts_up() {
        let metrics = facade();
        assert_eq!(metrics.server_status(), ServerStatus::Up);
        assert!(metrics.scrape().unwrap().contains("\nserver_status 1\n"));
    }

    #[test]
    fn test_set_server_status_toggles() {
        let metrics = facade();
        metrics.set_server_status(false);
        assert!(metrics.scrape().unwrap().contains("\nserver_status 0\n"));
        metrics.set_server_status(true);
        assert!(metrics.scrape().unwrap().contains("\nserver_status 1\n"));
    }

    #[test]
    fn test_liveness_port_writes_the_gauge() {
        let metrics = facade();
        LivenessReporter::set_server_status(&metrics, false);
        assert_eq!(metrics.server_status(), ServerStatus::Down);
        LivenessReporter::set_server_status(&metrics, true);
        assert_eq!(metrics.server_status(), ServerStatus::Up);
    }

    #[test]
    fn test_success_responses_are_not_counted() {
        let metrics = facade();
        metrics.observe_response("GET", "/", 200);
        metrics.observe_response("GET", "/", 302);
        metrics.observe_response("GET", "/", 600);
        assert!(!metrics.scrape().unwrap().contains(HTTP_REQUESTS_TOTAL));
    }

    #[test]
    fn test_error_response_series() {
        let metrics = facade();
        metrics.observe_response("GET", "/users/:id", 404);
        let body = metrics.scrape().unwrap();
        assert!(body.contains(
            "http_requests_total{method=\"GET\",route=\"/users/:id\",status=\"404\"} 1"
        ));
    }

    #[test]
    fn test_builtin_names_cannot_be_registered_twice() {
        let registry = Arc::new(MetricsRegistry::new());
        let _first = PrometheusMetrics::new(Arc::clone(&registry)).unwrap();
        assert!(PrometheusMetrics::new(registry).is_err());
    }

    #[test]
    fn test_custom_metric_cannot_shadow_builtin() {
        let metrics = facade();
        let err = metrics.add_custom_gauge(SERVER_STATUS, "dup", &[]).unwrap_err();
        assert!(matches!(err, MetricsError::Prometheus(_)));
    }
}
