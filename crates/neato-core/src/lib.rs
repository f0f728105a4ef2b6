//! Core library for talking to Neato robot vacuums through the Neato cloud.
//!
//! # Features
//!
//! - [`CloudClient`]: authenticated HTTP client for the robot roster,
//!   robot state, and map endpoints
//! - [`RobotApi`]: trait over the cloud so callers can be tested with
//!   [`MockApi`]
//! - [`Selection`]: parsing and bounds-checking of user robot selections
//!
//! # Example
//!
//! ```no_run
//! use neato_core::{CloudClient, RobotApi, Selection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CloudClient::new("https://beehive.neatocloud.com", "my-token")?;
//!     let roster = client.robots().await?;
//!     let robots = Selection::parse("1")?.resolve(&roster)?;
//!
//!     for robot in &robots {
//!         let state = client.state(robot).await?;
//!         println!("{}: {}% ({})", robot.name, state.details.charge, state.state);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod mock;
pub mod selection;
pub mod traits;

pub use client::{CloudClient, DEFAULT_ENDPOINT};
pub use error::{Error, Result};
pub use mock::MockApi;
pub use selection::{Selection, SelectionError};
pub use traits::RobotApi;

// Re-export types for convenience
pub use neato_types as types;
pub use neato_types::{MapSummary, Robot, RobotState};
