//! Ports Layer - Boundaries Between the Facade and the Host Process
//!
//! Port categories:
//! - `LivenessReporter`: up/down reporting used by shutdown handling

pub mod liveness;
