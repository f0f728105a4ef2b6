//! Data types for Neato robot vacuums.
//!
//! This crate provides the shapes returned by the Neato cloud API,
//! shared by the HTTP client (neato-core) and the metrics exporter
//! (neato-exporter).
//!
//! # Example
//!
//! ```
//! use neato_types::{RobotState, State};
//!
//! let json = r#"{"state": 1, "action": 0, "details": {"charge": 87}}"#;
//! let state: RobotState = serde_json::from_str(json).unwrap();
//! assert_eq!(state.state, State::Idle);
//! assert_eq!(state.details.charge, 87);
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{
    Action, Cleaning, CleaningCategory, DEFAULT_NUCLEO_URL, Details, MapSummary, NavigationMode,
    Robot, RobotState, State, UNKNOWN_ATTRIBUTE, UNSET_ATTRIBUTE,
};
