//! Liveness Port - Up/Down Reporting Interface
//!
//! Shutdown handling only needs to flip the liveness signal, so it
//! depends on this trait rather than on the Prometheus facade.

/// Sink for the server's up/down state.
pub trait LivenessReporter: Send + Sync + 'static {
    /// Report the server as up (`true`) or down (`false`).
    fn set_server_status(&self, is_up: bool);
}
