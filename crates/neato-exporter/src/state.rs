//! Application state shared by the collector and the scrape handler.
//!
//! The collector is the only writer of the gauges; the scrape handler reads
//! them on every request. Gauge updates are atomic per series, so no lock is
//! held here. A scrape taken mid-cycle can see some robots already updated
//! and others still carrying the previous cycle's values.

use std::sync::Arc;

use crate::metrics::RobotMetrics;

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    /// Gauge vectors and the registry they are exposed from.
    pub metrics: RobotMetrics,
}

impl AppState {
    /// Create new application state.
    pub fn new(metrics: RobotMetrics) -> Arc<Self> {
        Arc::new(Self { metrics })
    }
}
