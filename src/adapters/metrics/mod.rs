//! Metrics Adapters - Prometheus Facade for an axum Host
//!
//! Explicit registry, built-in HTTP error and liveness metrics, the
//! request-observation middleware, the `/metrics` scrape route, and
//! the shutdown hook that marks the server down.

pub mod facade;
pub mod middleware;
pub mod registry;
pub mod shutdown;

pub use facade::PrometheusMetrics;
pub use registry::{CustomMetric, MetricsRegistry};
pub use shutdown::{
    drain_until, shutdown_on, shutdown_signal, wait_for_signal, DrainOutcome, LivenessGuard,
    ShutdownSignal,
};
