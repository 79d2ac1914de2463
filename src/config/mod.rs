//! Configuration Module - TOML-based Server Configuration
//!
//! Loads and validates configuration from `config.toml`. Holds the
//! listen address, logging setup and any custom metrics that should
//! exist from startup.

pub mod loader;

use serde::Deserialize;

use crate::domain::metric::{MetricKind, MetricSpec};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// HTTP server and logging.
  pub server: ServerConfig,
  /// Metrics registration.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// Human-readable service name, logged at startup.
  #[serde(default = "default_name")]
  pub name: String,
  /// Listen address of the host server (metrics share this listener).
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Emit JSON log lines instead of human-readable ones.
  #[serde(default = "default_true")]
  pub json_logs: bool,
  /// Maximum time to wait for in-flight requests on shutdown.
  #[serde(default = "default_shutdown_timeout")]
  pub shutdown_timeout_seconds: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
  /// Custom metrics registered before the server starts.
  #[serde(default)]
  pub custom: Vec<CustomMetricConfig>,
}

/// One `[[metrics.custom]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomMetricConfig {
  /// `counter` or `gauge`.
  pub kind: MetricKind,
  /// Metric name.
  pub name: String,
  /// Help text.
  pub help: String,
  /// Label names, in order.
  #[serde(default)]
  pub labels: Vec<String>,
}

impl CustomMetricConfig {
  /// Domain view of this entry.
  pub fn spec(&self) -> MetricSpec {
    MetricSpec {
      kind: self.kind,
      name: self.name.clone(),
      help: self.help.clone(),
      label_names: self.labels.clone(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "http-metrics-facade".to_string()
}

fn default_bind_address() -> String {
  "0.0.0.0:3000".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_shutdown_timeout() -> u64 {
  30
}
