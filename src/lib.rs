//! HTTP Metrics Facade — Library Root
//!
//! Re-exports all modules for integration tests and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

pub use adapters::metrics::{MetricsRegistry, PrometheusMetrics};
pub use error::MetricsError;
