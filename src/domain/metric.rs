//! Metric Definitions - Names, Help Text and Label Schemas
//!
//! Pure description of a metric, independent of the registry that
//! stores it. Used to validate registrations and to detect
//! conflicting re-registrations of the same name.

use serde::Deserialize;

use crate::error::MetricsError;

/// Kind of numeric instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonically increasing value.
    Counter,
    /// Point-in-time value, can go up and down.
    Gauge,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Counter => write!(f, "counter"),
            Self::Gauge => write!(f, "gauge"),
        }
    }
}

/// Full definition of a metric: kind, name, help and label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    /// Counter or gauge.
    pub kind: MetricKind,
    /// Unique name within a registry.
    pub name: String,
    /// Help text emitted on the `# HELP` line.
    pub help: String,
    /// Ordered label names; each observation supplies one value per name.
    pub label_names: Vec<String>,
}

impl MetricSpec {
    /// Build a definition from borrowed parts.
    pub fn new(kind: MetricKind, name: &str, help: &str, label_names: &[&str]) -> Self {
        Self {
            kind,
            name: name.to_string(),
            help: help.to_string(),
            label_names: label_names.iter().map(|l| (*l).to_string()).collect(),
        }
    }

    /// Reject empty metric names and empty label names.
    ///
    /// Character-level rules are left to the `prometheus` crate, which
    /// checks them when the collector is created.
    pub fn validate(&self) -> Result<(), MetricsError> {
        if self.name.trim().is_empty() {
            return Err(MetricsError::EmptyName);
        }
        if self.label_names.iter().any(|l| l.trim().is_empty()) {
            return Err(MetricsError::EmptyLabel {
                metric: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Ensure `requested` describes the same metric as `self`.
    ///
    /// Same name with a different kind, help or label schema is rejected.
    pub fn ensure_compatible(&self, requested: &Self) -> Result<(), MetricsError> {
        if self == requested {
            return Ok(());
        }
        Err(MetricsError::Conflict {
            name: self.name.clone(),
            existing: self.describe(),
            requested: requested.describe(),
        })
    }

    /// Short human-readable summary used in conflict errors.
    fn describe(&self) -> String {
        format!(
            "{} help={:?} labels=[{}]",
            self.kind,
            self.help,
            self.label_names.join(",")
        )
    }
}
