//! Core types for Neato robots, their state, and their maps.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Label value used for identity attributes the cloud does not report.
pub const UNKNOWN_ATTRIBUTE: &str = "unknown";

/// Label value used for optional state attributes that are not set.
pub const UNSET_ATTRIBUTE: &str = "unset";

/// Default Nucleo endpoint used for robot messages when the roster omits one.
pub const DEFAULT_NUCLEO_URL: &str = "https://nucleo.neatocloud.com:4443";

/// A robot registered to the account.
///
/// Identity is fixed for the lifetime of the process once the roster
/// has been fetched.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    /// User-assigned robot name.
    pub name: String,
    /// Serial number, unique per robot.
    pub serial: String,
    /// Model name (e.g. "BotVacD7Connected").
    #[serde(default)]
    pub model: Option<String>,
    /// Firmware version.
    #[serde(default)]
    pub firmware: Option<String>,
    /// MAC address.
    #[serde(default)]
    pub mac_address: Option<String>,
    /// Secret used to sign robot messages.
    #[serde(default)]
    pub secret_key: String,
    /// Base URL of the Nucleo service handling this robot's messages.
    #[serde(default)]
    pub nucleo_url: Option<String>,
}

impl Robot {
    /// Create a robot with the given name and serial and no optional attributes.
    pub fn new(name: impl Into<String>, serial: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            serial: serial.into(),
            model: None,
            firmware: None,
            mac_address: None,
            secret_key: String::new(),
            nucleo_url: None,
        }
    }

    /// Model, or `"unknown"` when not reported.
    pub fn model_label(&self) -> &str {
        self.model.as_deref().unwrap_or(UNKNOWN_ATTRIBUTE)
    }

    /// Firmware version, or `"unknown"` when not reported.
    pub fn firmware_label(&self) -> &str {
        self.firmware.as_deref().unwrap_or(UNKNOWN_ATTRIBUTE)
    }

    /// MAC address, or `"unknown"` when not reported.
    pub fn mac_label(&self) -> &str {
        self.mac_address.as_deref().unwrap_or(UNKNOWN_ATTRIBUTE)
    }

    /// Nucleo base URL for this robot.
    pub fn nucleo_url(&self) -> &str {
        match self.nucleo_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => DEFAULT_NUCLEO_URL,
        }
    }
}

impl fmt::Debug for Robot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Robot")
            .field("name", &self.name)
            .field("serial", &self.serial)
            .field("model", &self.model)
            .field("firmware", &self.firmware)
            .field("mac_address", &self.mac_address)
            .field("secret_key", &"<redacted>")
            .field("nucleo_url", &self.nucleo_url)
            .finish()
    }
}

/// Snapshot of a robot's state, fetched on every poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    /// Command result reported by the robot (`"ok"` on success).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Active error code, if any.
    #[serde(default)]
    pub error: Option<String>,
    /// Active alert code, if any.
    #[serde(default)]
    pub alert: Option<String>,
    /// Operating state.
    #[serde(default)]
    pub state: State,
    /// Current action.
    #[serde(default)]
    pub action: Action,
    /// Cleaning parameters.
    #[serde(default)]
    pub cleaning: Cleaning,
    /// Battery and dock details.
    #[serde(default)]
    pub details: Details,
}

impl RobotState {
    /// Error code, or `"unset"`.
    pub fn error_label(&self) -> &str {
        self.error.as_deref().unwrap_or(UNSET_ATTRIBUTE)
    }

    /// Alert code, or `"unset"`.
    pub fn alert_label(&self) -> &str {
        self.alert.as_deref().unwrap_or(UNSET_ATTRIBUTE)
    }

    /// Check that the robot accepted the state request.
    ///
    /// A missing `result` field is treated as success.
    pub fn check_result(&self) -> ParseResult<()> {
        match self.result.as_deref() {
            None | Some("ok") => Ok(()),
            Some(other) => Err(ParseError::CommandFailed(other.to_string())),
        }
    }
}

/// Cleaning parameters of a robot state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cleaning {
    #[serde(default)]
    pub category: CleaningCategory,
    #[serde(default)]
    pub navigation_mode: NavigationMode,
}

/// Battery and dock details of a robot state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    #[serde(default)]
    pub is_charging: bool,
    #[serde(default)]
    pub is_docked: bool,
    #[serde(default)]
    pub is_schedule_enabled: bool,
    #[serde(default)]
    pub dock_has_been_seen: bool,
    /// Battery charge percentage (0-100).
    #[serde(default)]
    pub charge: u8,
}

/// Summary of one stored map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapSummary {
    #[serde(default)]
    pub id: Option<String>,
    /// Area cleaned during the run that produced this map, in square meters.
    #[serde(default)]
    pub cleaned_area: Option<f64>,
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub end_at: Option<String>,
}

/// Defines a wire-integer enum with snake_case label names and an
/// `Unknown` fallback that keeps the raw value.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:expr, {
            $($value:literal => $variant:ident : $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "u8", into = "u8")]
        #[non_exhaustive]
        pub enum $name {
            $($variant,)+
            /// A value this crate does not recognize.
            Unknown(u8),
        }

        impl $name {
            /// Metric label name for this value.
            pub fn label(&self) -> String {
                match self {
                    $(Self::$variant => $label.to_string(),)+
                    Self::Unknown(n) => format!("unknown_{}", n),
                }
            }
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                match value {
                    $($value => Self::$variant,)+
                    n => Self::Unknown(n),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                match value {
                    $($name::$variant => $value,)+
                    $name::Unknown(n) => n,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.label())
            }
        }
    };
}

wire_enum! {
    /// Operating state of a robot.
    State, default = State::Invalid, {
        0 => Invalid: "invalid",
        1 => Idle: "idle",
        2 => Busy: "busy",
        3 => Paused: "paused",
        4 => Error: "error",
    }
}

wire_enum! {
    /// What the robot is currently doing.
    Action, default = Action::Invalid, {
        0 => Invalid: "invalid",
        1 => HouseCleaning: "house_cleaning",
        2 => SpotCleaning: "spot_cleaning",
        3 => ManualCleaning: "manual_cleaning",
        4 => Docking: "docking",
        5 => UserMenuActive: "user_menu_active",
        6 => SuspendedCleaning: "suspended_cleaning",
        7 => Updating: "updating",
        8 => CopyingLogs: "copying_logs",
        9 => RecoveringLocation: "recovering_location",
        10 => IecTest: "iec_test",
        11 => MapCleaning: "map_cleaning",
        12 => ExploringMap: "exploring_map",
        13 => AcquiringMapIds: "acquiring_map_ids",
        14 => CreatingMap: "creating_map",
        15 => SuspendedExploration: "suspended_exploration",
    }
}

wire_enum! {
    /// Kind of cleaning run.
    CleaningCategory, default = CleaningCategory::Unknown(0), {
        1 => Manual: "manual",
        2 => House: "house",
        3 => Spot: "spot",
        4 => Map: "map",
    }
}

wire_enum! {
    /// Navigation mode used while cleaning.
    NavigationMode, default = NavigationMode::Unknown(0), {
        1 => Normal: "normal",
        2 => ExtraCare: "extra_care",
        3 => Deep: "deep",
    }
}
