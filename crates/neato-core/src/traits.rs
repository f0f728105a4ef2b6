//! Trait abstraction over the Neato cloud.
//!
//! This module provides the [`RobotApi`] trait that abstracts over the
//! real cloud client and the in-memory mock used in tests.

use async_trait::async_trait;

use neato_types::{MapSummary, Robot, RobotState};

use crate::error::Result;

/// Operations the exporter needs from the Neato cloud.
///
/// # Example
///
/// ```ignore
/// use neato_core::{RobotApi, Result};
///
/// async fn print_charges<A: RobotApi>(api: &A) -> Result<()> {
///     for robot in api.robots().await? {
///         let state = api.state(&robot).await?;
///         println!("{}: {}%", robot.name, state.details.charge);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RobotApi: Send + Sync {
    /// List the robots registered to the account, in the order the cloud returns them.
    async fn robots(&self) -> Result<Vec<Robot>>;

    /// Fetch the current state of a robot.
    async fn state(&self, robot: &Robot) -> Result<RobotState>;

    /// Fetch the robot's maps, most recent first.
    async fn maps(&self, robot: &Robot) -> Result<Vec<MapSummary>>;
}
