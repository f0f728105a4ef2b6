//! Exporter configuration.
//!
//! Values come from built-in defaults, an optional TOML file, and then CLI
//! flags, each layer overriding the previous one.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collector::FailurePolicy;

/// Exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scrape server settings.
    pub server: ServerConfig,
    /// Neato cloud settings.
    pub cloud: CloudConfig,
    /// Polling settings.
    pub collector: CollectorConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no file exists.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - The authorization token is set
    /// - The listen address parses (`host:port` or `:port`)
    /// - The metrics path is an absolute route
    /// - The cloud endpoint is an http(s) URL
    /// - The poll interval parses and is not zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.cloud.validate());
        errors.extend(self.collector.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Scrape server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, e.g. `":9110"` or `"127.0.0.1:9110"`.
    pub listen: String,
    /// HTTP path where metrics are exposed.
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: ":9110".to_string(),
            path: "/metrics".to_string(),
        }
    }
}

impl ServerConfig {
    /// Parse the listen address. A bare `:port` listens on all interfaces.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        if self.listen.starts_with(':') {
            format!("0.0.0.0{}", self.listen).parse()
        } else {
            self.listen.parse()
        }
    }

    /// Validate server configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.listen.is_empty() {
            errors.push(ValidationError {
                field: "server.listen".to_string(),
                message: "listen address cannot be empty".to_string(),
            });
        } else if let Err(e) = self.socket_addr() {
            errors.push(ValidationError {
                field: "server.listen".to_string(),
                message: format!("invalid listen address '{}': {}", self.listen, e),
            });
        }

        if !self.path.starts_with('/') {
            errors.push(ValidationError {
                field: "server.path".to_string(),
                message: format!("metrics path '{}' must start with '/'", self.path),
            });
        } else if self.path.contains(['{', '}']) {
            errors.push(ValidationError {
                field: "server.path".to_string(),
                message: format!(
                    "metrics path '{}' cannot contain path parameters",
                    self.path
                ),
            });
        }

        errors
    }
}

/// Neato cloud configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Beehive endpoint.
    pub endpoint: String,
    /// Account authorization token.
    pub token: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            endpoint: neato_core::DEFAULT_ENDPOINT.to_string(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for CloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl CloudConfig {
    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate cloud configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.token.is_empty() {
            errors.push(ValidationError {
                field: "cloud.token".to_string(),
                message: "empty authorization token".to_string(),
            });
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            errors.push(ValidationError {
                field: "cloud.endpoint".to_string(),
                message: format!(
                    "endpoint '{}' must start with http:// or https://",
                    self.endpoint
                ),
            });
        }

        if self.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "cloud.timeout_secs".to_string(),
                message: "timeout cannot be 0".to_string(),
            });
        }

        errors
    }
}

/// Polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Comma-separated 1-based robot indices; empty or `"0"` polls every robot.
    pub bots: String,
    /// Interval between polls, e.g. `"1m"` or `"30s"`.
    pub interval: String,
    /// What a state-fetch failure does to the rest of the cycle.
    pub failure_policy: FailurePolicy,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            bots: String::new(),
            interval: "1m".to_string(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl CollectorConfig {
    /// Parse the poll interval.
    pub fn interval(&self) -> Result<Duration, humantime::DurationError> {
        humantime::parse_duration(&self.interval)
    }

    /// Validate collector configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        match self.interval() {
            Ok(d) if d.is_zero() => errors.push(ValidationError {
                field: "collector.interval".to_string(),
                message: "interval cannot be 0".to_string(),
            }),
            Ok(_) => {}
            Err(e) => errors.push(ValidationError {
                field: "collector.interval".to_string(),
                message: format!("invalid interval '{}': {}", self.interval, e),
            }),
        }

        errors
    }
}

/// Default config file location (`<config dir>/neato-exporter/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("neato-exporter").join("config.toml"))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `server.listen` or `cloud.token`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.cloud.token = "s3cret-token".to_string();
        config
    }

    fn fields(err: ConfigError) -> Vec<String> {
        match err {
            ConfigError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.listen, ":9110");
        assert_eq!(config.server.path, "/metrics");
        assert_eq!(config.cloud.endpoint, "https://beehive.neatocloud.com");
        assert_eq!(config.collector.interval().unwrap(), Duration::from_secs(60));
        assert_eq!(config.collector.failure_policy, FailurePolicy::AbortCycle);
        assert!(config.collector.bots.is_empty());
    }

    #[test]
    fn test_default_requires_token() {
        let err = Config::default().validate().unwrap_err();
        assert_eq!(fields(err), vec!["cloud.token"]);
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_bare_port_listens_on_all_interfaces() {
        let server = ServerConfig::default();
        assert_eq!(server.socket_addr().unwrap(), "0.0.0.0:9110".parse().unwrap());

        let server = ServerConfig {
            listen: "127.0.0.1:9999".to_string(),
            ..Default::default()
        };
        assert_eq!(server.socket_addr().unwrap().port(), 9999);
    }

    #[test]
    fn test_invalid_server_settings() {
        let mut config = valid_config();
        config.server.listen = "localhost".to_string();
        config.server.path = "metrics".to_string();
        assert_eq!(
            fields(config.validate().unwrap_err()),
            vec!["server.listen", "server.path"]
        );

        let mut config = valid_config();
        config.server.path = "/robots/{id}".to_string();
        assert_eq!(fields(config.validate().unwrap_err()), vec!["server.path"]);
    }

    #[test]
    fn test_invalid_interval() {
        let mut config = valid_config();
        config.collector.interval = "soon".to_string();
        assert_eq!(
            fields(config.validate().unwrap_err()),
            vec!["collector.interval"]
        );

        config.collector.interval = "0s".to_string();
        assert_eq!(
            fields(config.validate().unwrap_err()),
            vec!["collector.interval"]
        );
    }

    #[test]
    fn test_interval_formats() {
        let mut collector = CollectorConfig::default();
        for (text, secs) in [("30s", 30), ("5m", 300), ("1h 30m", 5400), ("2h", 7200)] {
            collector.interval = text.to_string();
            assert_eq!(collector.interval().unwrap(), Duration::from_secs(secs));
        }
    }

    #[test]
    fn test_invalid_endpoint() {
        let mut config = valid_config();
        config.cloud.endpoint = "beehive.neatocloud.com".to_string();
        config.cloud.timeout_secs = 0;
        assert_eq!(
            fields(config.validate().unwrap_err()),
            vec!["cloud.endpoint", "cloud.timeout_secs"]
        );
    }

    #[test]
    fn test_validation_error_display() {
        let err = Config::default().validate().unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Configuration validation failed:"));
        assert!(message.contains("  - cloud.token: empty authorization token"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = valid_config();
        let debug = format!("{:?}", config);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
listen = "127.0.0.1:9200"

[cloud]
token = "abc"

[collector]
bots = "1,3"
interval = "30s"
failure_policy = "skip-device"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:9200");
        assert_eq!(config.server.path, "/metrics");
        assert_eq!(config.cloud.token, "abc");
        assert_eq!(config.collector.bots, "1,3");
        assert_eq!(config.collector.interval().unwrap(), Duration::from_secs(30));
        assert_eq!(config.collector.failure_policy, FailurePolicy::SkipDevice);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/neato-exporter.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nlisten = 1").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
