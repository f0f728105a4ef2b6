//! Prometheus exporter for Neato robot vacuums.
//!
//! This crate provides a service that:
//! - Polls the selected robots through the Neato cloud on a fixed interval
//! - Publishes battery, cleaned area, and state as Prometheus gauges
//! - Serves the gauges on a single scrape endpoint
//!
//! # Metrics
//!
//! - `neato_battery{name,serial,model,firmware,mac}` - battery charge (0-100)
//! - `neato_area{name,serial,model,firmware,mac}` - area cleaned in the latest run
//! - `neato_state{name,serial,model,firmware,mac,error,alert,state,action,category,
//!   navigation_mode,is_charging,is_docked,is_schedule_enabled,dock_has_been_seen,charge}` -
//!   always `1`
//!
//! # Configuration
//!
//! The exporter reads `~/.config/neato-exporter/config.toml` if it exists;
//! CLI flags override it:
//!
//! ```toml
//! [server]
//! listen = ":9110"
//! path = "/metrics"
//!
//! [cloud]
//! token = "your-neato-token"
//!
//! [collector]
//! bots = "1,3"        # empty or "0" polls every robot
//! interval = "1m"
//! failure_policy = "abort-cycle"
//! ```

pub mod api;
pub mod collector;
pub mod config;
pub mod metrics;
pub mod startup;
pub mod state;

pub use collector::{Collector, CycleReport, FailurePolicy};
pub use config::{
    CloudConfig, CollectorConfig, Config, ConfigError, ServerConfig, ValidationError,
};
pub use metrics::{MetricsError, RobotMetrics};
pub use startup::StartupError;
pub use state::AppState;
