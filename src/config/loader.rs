//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    bind_address = %config.server.bind_address,
    custom_metrics = config.metrics.custom.len(),
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A parseable listen address
/// - A non-empty log level
/// - Well-formed, uniquely named custom metrics
fn validate_config(config: &AppConfig) -> Result<()> {
  config
    .server
    .bind_address
    .parse::<SocketAddr>()
    .with_context(|| {
      format!(
        "server.bind_address must be a socket address, got {:?}",
        config.server.bind_address
      )
    })?;

  anyhow::ensure!(
    !config.server.log_level.trim().is_empty(),
    "server.log_level must not be empty"
  );

  let mut seen = HashSet::new();
  for (i, custom) in config.metrics.custom.iter().enumerate() {
    custom
      .spec()
      .validate()
      .with_context(|| format!("Custom metric {i} ({}) is invalid", custom.name))?;
    anyhow::ensure!(
      seen.insert(custom.name.as_str()),
      "Custom metric {} is declared more than once",
      custom.name
    );
  }

  Ok(())
}
