//! Shutdown Hook - Signal Handling and Scoped Liveness Reset
//!
//! `shutdown_signal` resolves on SIGINT (or SIGTERM on unix) after
//! reporting the server down, and plugs into axum's graceful shutdown.
//! `LivenessGuard` repeats the down report on drop, so the gauge is
//! reset even when a later shutdown step errors out or panics.
//! `drain_until` bounds the drain by a timeout and a second signal.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};

use crate::ports::liveness::LivenessReporter;

/// Signal that triggered shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// Ctrl-C / SIGINT.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Wait for SIGINT, or SIGTERM on unix.
pub async fn wait_for_signal() -> ShutdownSignal {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => ShutdownSignal::Interrupt,
        () = terminate => ShutdownSignal::Terminate,
    }
}

/// Resolve once a shutdown signal arrives, reporting the server down first.
///
/// Scrapes served while the server drains observe `server_status 0`.
pub async fn shutdown_signal<R>(reporter: Arc<R>)
where
    R: LivenessReporter + ?Sized,
{
    shutdown_on(wait_for_signal(), reporter).await;
}

/// Await `signal`, then report the server down.
pub async fn shutdown_on<F, R>(signal: F, reporter: Arc<R>) -> ShutdownSignal
where
    F: Future<Output = ShutdownSignal>,
    R: LivenessReporter + ?Sized,
{
    let received = signal.await;
    info!(signal = %received, "Shutdown signal received, marking server down");
    reporter.set_server_status(false);
    received
}

/// How a graceful drain ended.
#[derive(Debug, PartialEq, Eq)]
pub enum DrainOutcome<T> {
    /// The drain future finished with this output.
    Completed(T),
    /// The timeout elapsed first.
    TimedOut,
    /// A second signal arrived first.
    Interrupted(ShutdownSignal),
}

/// Run `drain` until it completes, `timeout` elapses or `interrupt` resolves.
pub async fn drain_until<F, I>(drain: F, timeout: Duration, interrupt: I) -> DrainOutcome<F::Output>
where
    F: Future,
    I: Future<Output = ShutdownSignal>,
{
    tokio::select! {
        result = tokio::time::timeout(timeout, drain) => match result {
            Ok(output) => DrainOutcome::Completed(output),
            Err(_) => DrainOutcome::TimedOut,
        },
        received = interrupt => {
            warn!(signal = %received, "Second shutdown signal received, abandoning drain");
            DrainOutcome::Interrupted(received)
        }
    }
}

/// Reports the server down when dropped.
pub struct LivenessGuard<R: LivenessReporter + ?Sized> {
    reporter: Arc<R>,
    armed: bool,
}

impl<R: LivenessReporter + ?Sized> LivenessGuard<R> {
    /// Arm a guard for `reporter`.
    pub fn new(reporter: Arc<R>) -> Self {
        Self {
            reporter,
            armed: true,
        }
    }

    /// Drop without reporting.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl<R: LivenessReporter + ?Sized> Drop for LivenessGuard<R> {
    fn drop(&mut self) {
        if self.armed {
            self.reporter.set_server_status(false);
        }
    }
}
