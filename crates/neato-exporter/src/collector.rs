//! Background collector.
//!
//! Robots are polled one after another, in the order they were selected at
//! startup. Each cycle fetches every robot's state and maps and writes the
//! result into the gauges, then the collector sleeps for the poll interval.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use neato_core::RobotApi;
use neato_types::Robot;

use crate::state::AppState;

/// What happens to the rest of a cycle when fetching a robot's state fails.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the cycle; the remaining robots wait for the next interval.
    #[default]
    AbortCycle,
    /// Skip the failed robot and keep polling the others.
    SkipDevice,
}

/// Outcome of one poll cycle, by robot serial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Robots whose state was fetched and published.
    pub polled: Vec<String>,
    /// Robots whose state fetch failed.
    pub failed: Vec<String>,
    /// The robot whose failure ended the cycle early, if any.
    pub aborted_at: Option<String>,
    /// Robots whose area gauge was updated.
    pub area_updated: Vec<String>,
    /// Robots whose area gauge was left as it was.
    pub area_skipped: Vec<String>,
}

impl CycleReport {
    /// Whether the cycle visited every robot.
    pub fn is_complete(&self) -> bool {
        self.aborted_at.is_none()
    }
}

/// Background collector that polls the selected robots on a fixed interval.
pub struct Collector {
    api: Arc<dyn RobotApi>,
    robots: Vec<Robot>,
    state: Arc<AppState>,
    interval: Duration,
    policy: FailurePolicy,
}

impl Collector {
    /// Create a new collector with the default failure policy.
    pub fn new(
        api: Arc<dyn RobotApi>,
        robots: Vec<Robot>,
        state: Arc<AppState>,
        interval: Duration,
    ) -> Self {
        Self {
            api,
            robots,
            state,
            interval,
            policy: FailurePolicy::default(),
        }
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The robots this collector polls, in polling order.
    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    /// Spawn the collection loop.
    ///
    /// Returns immediately; collection happens in the background.
    pub fn start(self) -> JoinHandle<()> {
        info!(
            "Starting collector for {} robot(s) (interval: {}, on failure: {:?})",
            self.robots.len(),
            humantime::format_duration(self.interval),
            self.policy
        );
        tokio::spawn(self.run())
    }

    /// Poll forever.
    pub async fn run(self) {
        loop {
            let report = self.poll_cycle().await;
            debug!(
                polled = report.polled.len(),
                failed = report.failed.len(),
                complete = report.is_complete(),
                "Poll cycle finished"
            );
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Run one pass over the robots and publish what was fetched.
    pub async fn poll_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        for robot in &self.robots {
            let robot_state = match self.api.state(robot).await {
                Ok(robot_state) => robot_state,
                Err(e) => {
                    warn!(
                        robot = %robot.name,
                        serial = %robot.serial,
                        "Failed to get state: {}",
                        e
                    );
                    report.failed.push(robot.serial.clone());
                    match self.policy {
                        FailurePolicy::AbortCycle => {
                            report.aborted_at = Some(robot.serial.clone());
                            break;
                        }
                        FailurePolicy::SkipDevice => continue,
                    }
                }
            };

            let metrics = &self.state.metrics;
            metrics.set_battery(robot, robot_state.details.charge);
            metrics.set_state(robot, &robot_state);
            report.polled.push(robot.serial.clone());

            if self.update_area(robot).await {
                report.area_updated.push(robot.serial.clone());
            } else {
                report.area_skipped.push(robot.serial.clone());
            }
        }

        report
    }

    /// Publish the cleaned area of the robot's latest map. Returns whether the
    /// gauge was updated; every failure here is logged and otherwise ignored.
    async fn update_area(&self, robot: &Robot) -> bool {
        let maps = match self.api.maps(robot).await {
            Ok(maps) => maps,
            Err(e) => {
                warn!(
                    robot = %robot.name,
                    serial = %robot.serial,
                    "Failed to get maps: {}",
                    e
                );
                return false;
            }
        };

        let Some(latest) = maps.first() else {
            info!(
                "No maps found for robot '{}' (serial '{}')",
                robot.name, robot.serial
            );
            return false;
        };

        match latest.cleaned_area {
            Some(area) => {
                self.state.metrics.set_area(robot, area);
                true
            }
            None => {
                info!(
                    "No cleaned area is set for robot '{}' (serial '{}')",
                    robot.name, robot.serial
                );
                false
            }
        }
    }
}
