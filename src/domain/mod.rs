//! Domain layer - metric definitions and server status.
//!
//! No axum or Prometheus types here; the adapters translate these
//! into registry collectors.

pub mod metric;
pub mod status;

pub use metric::{MetricKind, MetricSpec};
pub use status::{is_error_status, ServerStatus, ERROR_STATUS_RANGE};
