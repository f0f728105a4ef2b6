//! Prometheus metric families for Neato robots.
//!
//! Three gauge vectors are exported:
//!
//! - `neato_battery` - battery charge percentage
//! - `neato_area` - area cleaned during the most recent run, in square meters
//! - `neato_state` - always `1`; the robot state is carried by the labels
//!
//! All three carry the robot identity labels `name`, `serial`, `model`,
//! `firmware` and `mac`. Label sets are upserted on every poll and are never
//! removed, so a robot whose state changes leaves its previous `neato_state`
//! series behind until the process restarts.

use neato_types::{Robot, RobotState};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

/// Labels identifying a robot, shared by every family.
pub const IDENTITY_LABELS: [&str; 5] = ["name", "serial", "model", "firmware", "mac"];

/// Extra labels of the `neato_state` family, after the identity labels.
pub const STATE_LABELS: [&str; 11] = [
    "error",
    "alert",
    "state",
    "action",
    "category",
    "navigation_mode",
    "is_charging",
    "is_docked",
    "is_schedule_enabled",
    "dock_has_been_seen",
    "charge",
];

pub const BATTERY_METRIC: &str = "neato_battery";
pub const AREA_METRIC: &str = "neato_area";
pub const STATE_METRIC: &str = "neato_state";

/// Errors from building, registering or encoding metrics.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Failed to create gauge {name}: {source}")]
    Create {
        name: &'static str,
        #[source]
        source: prometheus::Error,
    },
    #[error("Failed to register Neato {name} gauge: {source}")]
    Register {
        name: &'static str,
        #[source]
        source: prometheus::Error,
    },
    #[error("Failed to encode metrics: {0}")]
    Encode(String),
}

/// The exporter's gauge vectors and the registry they are registered in.
#[derive(Clone)]
pub struct RobotMetrics {
    registry: Registry,
    battery: GaugeVec,
    area: GaugeVec,
    state: GaugeVec,
}

impl std::fmt::Debug for RobotMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotMetrics").finish_non_exhaustive()
    }
}

impl RobotMetrics {
    /// Create the metric families in a fresh registry.
    pub fn new() -> Result<Self, MetricsError> {
        Self::register(Registry::new())
    }

    /// Create the metric families and register them in `registry`.
    ///
    /// Fails if the registry already holds any of the families.
    pub fn register(registry: Registry) -> Result<Self, MetricsError> {
        let battery = gauge_vec(BATTERY_METRIC, "battery level (percentage)", &IDENTITY_LABELS)?;
        let area = gauge_vec(AREA_METRIC, "cleaned area (square meters)", &IDENTITY_LABELS)?;

        let state_labels: Vec<&str> = IDENTITY_LABELS
            .iter()
            .chain(STATE_LABELS.iter())
            .copied()
            .collect();
        let state = gauge_vec(STATE_METRIC, "robot state", &state_labels)?;

        for (name, gauge) in [("battery", &battery), ("area", &area), ("state", &state)] {
            registry
                .register(Box::new(gauge.clone()))
                .map_err(|source| MetricsError::Register { name, source })?;
        }

        Ok(Self {
            registry,
            battery,
            area,
            state,
        })
    }

    /// The registry holding the families.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a robot's battery charge.
    pub fn set_battery(&self, robot: &Robot, charge: u8) {
        self.battery
            .with_label_values(&identity_values(robot))
            .set(f64::from(charge));
    }

    /// Record a robot's state as a label set with value `1`.
    pub fn set_state(&self, robot: &Robot, state: &RobotState) {
        let category = state.cleaning.category.label();
        let navigation_mode = state.cleaning.navigation_mode.label();
        let operating = state.state.label();
        let action = state.action.label();
        let is_charging = state.details.is_charging.to_string();
        let is_docked = state.details.is_docked.to_string();
        let is_schedule_enabled = state.details.is_schedule_enabled.to_string();
        let dock_has_been_seen = state.details.dock_has_been_seen.to_string();
        let charge = state.details.charge.to_string();

        let mut values = identity_values(robot).to_vec();
        values.extend([
            state.error_label(),
            state.alert_label(),
            operating.as_str(),
            action.as_str(),
            category.as_str(),
            navigation_mode.as_str(),
            is_charging.as_str(),
            is_docked.as_str(),
            is_schedule_enabled.as_str(),
            dock_has_been_seen.as_str(),
            charge.as_str(),
        ]);

        self.state.with_label_values(&values).set(1.0);
    }

    /// Record the area cleaned in the robot's most recent run.
    pub fn set_area(&self, robot: &Robot, area: f64) {
        self.area.with_label_values(&identity_values(robot)).set(area);
    }

    /// Render all families in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| MetricsError::Encode(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Encode(e.to_string()))
    }

    /// Current values of `family` for the robot with this serial, one per label set.
    ///
    /// An introspection aid for tests and debugging; scrapes go through
    /// [`RobotMetrics::encode`]. Reads through a gather so that no new series
    /// are created.
    pub fn values_for(&self, family: &str, serial: &str) -> Vec<f64> {
        self.registry
            .gather()
            .iter()
            .filter(|mf| mf.get_name() == family)
            .flat_map(|mf| mf.get_metric().iter())
            .filter(|m| {
                m.get_label()
                    .iter()
                    .any(|l| l.get_name() == "serial" && l.get_value() == serial)
            })
            .map(|m| m.get_gauge().get_value())
            .collect()
    }
}

fn gauge_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<GaugeVec, MetricsError> {
    GaugeVec::new(Opts::new(name, format!("Neato - {}", help)), labels)
        .map_err(|source| MetricsError::Create { name, source })
}

fn identity_values(robot: &Robot) -> [&str; 5] {
    [
        robot.name.as_str(),
        robot.serial.as_str(),
        robot.model_label(),
        robot.firmware_label(),
        robot.mac_label(),
    ]
}
