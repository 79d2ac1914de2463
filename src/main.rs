//! HTTP Metrics Facade — Entry Point
//!
//! Serves a small demo application instrumented with the Prometheus
//! facade. Runs until SIGINT/SIGTERM.
//!
//! Wiring sequence:
//! 1. Load config.toml (path from the first CLI argument) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create the registry and the facade (server_status = 1)
//! 4. Register custom metrics declared in config
//! 5. Attach middleware + /metrics to the demo router and serve
//! 6. Wait for SIGINT/SIGTERM → server_status = 0 → drain → exit 0

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tokio::sync::broadcast;
use tracing::{error, info, instrument, warn};

use http_metrics_facade::adapters::http::demo_routes;
use http_metrics_facade::adapters::metrics::{
    drain_until, shutdown_signal, wait_for_signal, DrainOutcome, LivenessGuard,
};
use http_metrics_facade::config::{self, AppConfig, ServerConfig};
use http_metrics_facade::domain::MetricKind;
use http_metrics_facade::{MetricsRegistry, PrometheusMetrics};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured logging ────────────────────
    init_tracing(&config.server);

    info!(
        name = %config.server.name,
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.server.bind_address,
        "Starting HTTP metrics facade"
    );

    // ── 3. Registry + facade ────────────────────────────────
    let registry = Arc::new(MetricsRegistry::new());
    let metrics = Arc::new(
        PrometheusMetrics::new(registry).context("Failed to register built-in metrics")?,
    );

    // ── 4. Custom metrics from config ───────────────────────
    register_custom_metrics(&metrics, &config)?;

    // server_status drops to 0 however main exits from here on.
    let _liveness = LivenessGuard::new(Arc::clone(&metrics));

    // ── 5. Serve until shutdown ─────────────────────────────
    let app = metrics.attach(demo_routes());
    serve(app, &config.server, metrics).await?;

    info!("Shutdown complete");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&server.log_level));

    if server.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn register_custom_metrics(metrics: &PrometheusMetrics, config: &AppConfig) -> Result<()> {
    for custom in &config.metrics.custom {
        let labels: Vec<&str> = custom.labels.iter().map(String::as_str).collect();
        match custom.kind {
            MetricKind::Counter => {
                metrics
                    .add_custom_counter(&custom.name, &custom.help, &labels)
                    .with_context(|| format!("Failed to register counter {}", custom.name))?;
            }
            MetricKind::Gauge => {
                metrics
                    .add_custom_gauge(&custom.name, &custom.help, &labels)
                    .with_context(|| format!("Failed to register gauge {}", custom.name))?;
            }
        }
    }
    Ok(())
}

/// Serve `app` until a shutdown signal, then drain within the configured timeout.
#[instrument(skip(app, server, metrics), fields(bind_address = %server.bind_address))]
async fn serve(app: Router, server: &ServerConfig, metrics: Arc<PrometheusMetrics>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", server.bind_address))?;
    info!("HTTP server listening (metrics at /metrics)");

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
    let mut server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await
    });

    tokio::select! {
        () = shutdown_signal(Arc::clone(&metrics)) => {}
        result = &mut server_handle => {
            metrics.set_server_status(false);
            return result
                .context("HTTP server task panicked")?
                .context("HTTP server failed");
        }
    }

    let _ = shutdown_tx.send(());
    info!(
        timeout_seconds = server.shutdown_timeout_seconds,
        "Draining in-flight requests"
    );

    // A second SIGINT/SIGTERM abandons the drain.
    match drain_until(
        server_handle,
        Duration::from_secs(server.shutdown_timeout_seconds),
        wait_for_signal(),
    )
    .await
    {
        DrainOutcome::Completed(Ok(Ok(()))) => info!("HTTP server drained"),
        DrainOutcome::Completed(Ok(Err(e))) => error!(error = %e, "HTTP server failed during drain"),
        DrainOutcome::Completed(Err(e)) => {
            error!(error = %e, "HTTP server task panicked during drain");
        }
        DrainOutcome::TimedOut => warn!("Drain timed out, exiting with requests in flight"),
        DrainOutcome::Interrupted(_) => warn!("Drain abandoned, exiting with requests in flight"),
    }

    Ok(())
}
