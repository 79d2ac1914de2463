//! Server Status - Liveness State and Error Classification
//!
//! The liveness gauge only ever holds 1 (up) or 0 (down). Request
//! outcomes are counted only when the final status code is an error.

use std::ops::Range;

/// Status codes counted by the request-observation hook.
pub const ERROR_STATUS_RANGE: Range<u16> = 400..600;

/// Liveness of the host server as reported by `server_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// Serving traffic (gauge value 1).
    Up,
    /// Shutting down or stopped (gauge value 0).
    Down,
}

impl ServerStatus {
    /// Gauge value for this state.
    pub const fn as_gauge(self) -> f64 {
        match self {
            Self::Up => 1.0,
            Self::Down => 0.0,
        }
    }
}

impl From<bool> for ServerStatus {
    fn from(is_up: bool) -> Self {
        if is_up { Self::Up } else { Self::Down }
    }
}

/// Whether a final response status should be counted.
pub fn is_error_status(status: u16) -> bool {
    ERROR_STATUS_RANGE.contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_range_is_half_open() {
        assert!(!is_error_status(399));
        assert!(is_error_status(400));
        assert!(is_error_status(599));
        assert!(!is_error_status(600));
    }

    #[test]
    fn test_status_from_bool() {
        assert_eq!(ServerStatus::from(true).as_gauge(), 1.0);
        assert_eq!(ServerStatus::from(false).as_gauge(), 0.0);
    }
}
