//! Adapters Layer - axum and Prometheus Integration
//!
//! Adapter categories:
//! - `http`: demo host routes served by the binary
//! - `metrics`: Prometheus registry, facade, middleware and shutdown hook

pub mod http;
pub mod metrics;
