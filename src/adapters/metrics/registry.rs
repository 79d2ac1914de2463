//! Metrics Registry - Explicit Prometheus Registry with Custom Metrics
//!
//! Wraps a `prometheus::Registry` owned by the caller instead of the
//! crate-wide default registry, so independent instances never share
//! series. Custom metrics are kept in a name-keyed map of tagged
//! variants with lookup-or-create semantics.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use prometheus::core::Collector;
use prometheus::proto::MetricFamily;
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tracing::{debug, info};

use crate::domain::metric::{MetricKind, MetricSpec};
use crate::error::MetricsError;

/// A custom metric registered at runtime.
#[derive(Clone)]
pub enum CustomMetric {
    /// Float counter keyed by the declared label names.
    Counter(CounterVec),
    /// Float gauge keyed by the declared label names.
    Gauge(GaugeVec),
}

/// Stored custom metric together with the definition it was created from.
struct CustomEntry {
    spec: MetricSpec,
    metric: CustomMetric,
}

/// Process-lifetime collection of all registered metrics.
pub struct MetricsRegistry {
    /// Underlying Prometheus registry.
    registry: Registry,
    /// Runtime-registered metrics by name.
    custom: Mutex<HashMap<String, CustomEntry>>,
}

impl MetricsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            custom: Mutex::new(HashMap::new()),
        }
    }

    /// Register an already constructed collector.
    pub fn register<C>(&self, collector: &C) -> Result<(), MetricsError>
    where
        C: Collector + Clone + 'static,
    {
        self.registry.register(Box::new(collector.clone()))?;
        Ok(())
    }

    /// Return the counter registered under `name`, creating it if absent.
    pub fn get_or_create_counter(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<CounterVec, MetricsError> {
        let spec = MetricSpec::new(MetricKind::Counter, name, help, label_names);
        match self.get_or_create(spec)? {
            CustomMetric::Counter(counter) => Ok(counter),
            CustomMetric::Gauge(_) => Err(kind_mismatch(name, MetricKind::Gauge, MetricKind::Counter)),
        }
    }

    /// Return the gauge registered under `name`, creating it if absent.
    pub fn get_or_create_gauge(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<GaugeVec, MetricsError> {
        let spec = MetricSpec::new(MetricKind::Gauge, name, help, label_names);
        match self.get_or_create(spec)? {
            CustomMetric::Gauge(gauge) => Ok(gauge),
            CustomMetric::Counter(_) => Err(kind_mismatch(name, MetricKind::Counter, MetricKind::Gauge)),
        }
    }

    fn get_or_create(&self, spec: MetricSpec) -> Result<CustomMetric, MetricsError> {
        spec.validate()?;

        let mut custom = self.lock_custom();

        if let Some(entry) = custom.get(&spec.name) {
            entry.spec.ensure_compatible(&spec)?;
            debug!(metric = %spec.name, "Reusing registered custom metric");
            return Ok(entry.metric.clone());
        }

        let labels: Vec<&str> = spec.label_names.iter().map(String::as_str).collect();
        let opts = Opts::new(spec.name.as_str(), spec.help.as_str());
        let metric = match spec.kind {
            MetricKind::Counter => {
                let counter = CounterVec::new(opts, &labels)?;
                self.register(&counter)?;
                CustomMetric::Counter(counter)
            }
            MetricKind::Gauge => {
                let gauge = GaugeVec::new(opts, &labels)?;
                self.register(&gauge)?;
                CustomMetric::Gauge(gauge)
            }
        };

        info!(
            metric = %spec.name,
            kind = %spec.kind,
            labels = spec.label_names.len(),
            "Registered custom metric"
        );

        custom.insert(
            spec.name.clone(),
            CustomEntry {
                spec,
                metric: metric.clone(),
            },
        );
        Ok(metric)
    }

    /// Whether a custom metric with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.lock_custom().contains_key(name)
    }

    /// Number of custom metrics registered.
    pub fn custom_len(&self) -> usize {
        self.lock_custom().len()
    }

    // Updates are single inserts, so a poisoned map is still consistent.
    fn lock_custom(&self) -> MutexGuard<'_, HashMap<String, CustomEntry>> {
        self.custom.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot every metric family, sorted by name.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Media type of the output of [`Self::render`].
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Serialize the current state in the Prometheus text format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn kind_mismatch(name: &str, existing: MetricKind, requested: MetricKind) -> MetricsError {
    MetricsError::Conflict {
        name: name.to_string(),
        existing: existing.to_string(),
        requested: requested.to_string(),
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
