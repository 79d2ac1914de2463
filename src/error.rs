//! Error Types - Metric Registration and Exposition Failures

use thiserror::Error;

/// Errors raised by registry operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Metric name was empty or whitespace.
    #[error("metric name must not be empty")]
    EmptyName,

    /// One of the label names was empty.
    #[error("metric {metric} has an empty label name")]
    EmptyLabel { metric: String },

    /// Name already registered with a different definition.
    #[error("metric {name} already registered as {existing}, requested {requested}")]
    Conflict {
        name: String,
        existing: String,
        requested: String,
    },

    /// Collector creation, registration or encoding failed.
    #[error("prometheus: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// Encoder produced non UTF-8 output.
    #[error("exposition output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
