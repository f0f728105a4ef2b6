//! Mock cloud implementation for testing.
//!
//! [`MockApi`] implements [`RobotApi`] entirely in memory so the collector
//! can be exercised without network access or a Neato account.
//!
//! # Features
//!
//! - **Failure injection**: make the roster, or a given robot's state or map
//!   requests, fail
//! - **Call log**: every request is recorded in order, so tests can check
//!   which robots were polled and in what sequence

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use neato_types::{MapSummary, Robot, RobotState};

use crate::error::{Error, Result};
use crate::traits::RobotApi;

/// A request observed by [`MockApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Robots,
    State(String),
    Maps(String),
}

/// An in-memory Neato cloud.
///
/// # Example
///
/// ```
/// use neato_core::{MockApi, RobotApi};
/// use neato_core::types::{Robot, RobotState};
///
/// #[tokio::main]
/// async fn main() {
///     let api = MockApi::new().with_robot(Robot::new("Kitchen", "SN1"), RobotState::default());
///     let robots = api.robots().await.unwrap();
///     assert_eq!(robots.len(), 1);
///
///     api.fail_state("SN1", true).await;
///     assert!(api.state(&robots[0]).await.is_err());
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockApi {
    robots: RwLock<Vec<Robot>>,
    states: RwLock<HashMap<String, RobotState>>,
    maps: RwLock<HashMap<String, Vec<MapSummary>>>,
    failing_states: RwLock<HashSet<String>>,
    failing_maps: RwLock<HashSet<String>>,
    roster_fails: AtomicBool,
    calls: RwLock<Vec<MockCall>>,
}

impl MockApi {
    /// Create an empty mock with no robots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a robot to the roster with its initial state.
    pub fn with_robot(mut self, robot: Robot, state: RobotState) -> Self {
        self.states.get_mut().insert(robot.serial.clone(), state);
        self.robots.get_mut().push(robot);
        self
    }

    /// Set the maps returned for a robot.
    pub fn with_maps(mut self, serial: &str, maps: Vec<MapSummary>) -> Self {
        self.maps.get_mut().insert(serial.to_string(), maps);
        self
    }

    /// Replace the state returned for a robot.
    pub async fn set_state(&self, serial: &str, state: RobotState) {
        self.states.write().await.insert(serial.to_string(), state);
    }

    /// Set battery charge directly.
    pub async fn set_charge(&self, serial: &str, charge: u8) {
        self.states
            .write()
            .await
            .entry(serial.to_string())
            .or_default()
            .details
            .charge = charge;
    }

    /// Replace the maps returned for a robot.
    pub async fn set_maps(&self, serial: &str, maps: Vec<MapSummary>) {
        self.maps.write().await.insert(serial.to_string(), maps);
    }

    /// Make state requests for a robot fail (or succeed again).
    pub async fn fail_state(&self, serial: &str, fail: bool) {
        let mut failing = self.failing_states.write().await;
        if fail {
            failing.insert(serial.to_string());
        } else {
            failing.remove(serial);
        }
    }

    /// Make map requests for a robot fail (or succeed again).
    pub async fn fail_maps(&self, serial: &str, fail: bool) {
        let mut failing = self.failing_maps.write().await;
        if fail {
            failing.insert(serial.to_string());
        } else {
            failing.remove(serial);
        }
    }

    /// Make roster requests fail.
    pub fn set_roster_fails(&self, fail: bool) {
        self.roster_fails.store(fail, Ordering::Relaxed);
    }

    /// All requests observed so far, in order.
    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.read().await.clone()
    }

    /// Serials of state requests observed so far, in order.
    pub async fn state_calls(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                MockCall::State(serial) => Some(serial.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget all recorded requests.
    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    async fn record(&self, call: MockCall) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl RobotApi for MockApi {
    async fn robots(&self) -> Result<Vec<Robot>> {
        self.record(MockCall::Robots).await;
        if self.roster_fails.load(Ordering::Relaxed) {
            return Err(Error::Mock("roster unavailable".to_string()));
        }
        Ok(self.robots.read().await.clone())
    }

    async fn state(&self, robot: &Robot) -> Result<RobotState> {
        self.record(MockCall::State(robot.serial.clone())).await;
        if self.failing_states.read().await.contains(&robot.serial) {
            return Err(Error::Mock(format!("state unavailable for {}", robot.serial)));
        }
        self.states
            .read()
            .await
            .get(&robot.serial)
            .cloned()
            .ok_or_else(|| Error::Mock(format!("unknown robot {}", robot.serial)))
    }

    async fn maps(&self, robot: &Robot) -> Result<Vec<MapSummary>> {
        self.record(MockCall::Maps(robot.serial.clone())).await;
        if self.failing_maps.read().await.contains(&robot.serial) {
            return Err(Error::Mock(format!("maps unavailable for {}", robot.serial)));
        }
        Ok(self
            .maps
            .read()
            .await
            .get(&robot.serial)
            .cloned()
            .unwrap_or_default())
    }
}
