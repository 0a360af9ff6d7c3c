//! Configuration loading and validation for the interface exporter

use common::LogFormat;
use interface_probe::{ProbeConfig, Protocol};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Configuration file used when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

/// Main configuration structure
///
/// The file is either a plain sequence of targets or a mapping with a
/// `targets` key and optional exporter sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub targets: Vec<TargetConfig>,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub probe: ProbeSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        self.server.validate()?;
        self.probe.validate()?;
        for target in &self.targets {
            target.validate()?;
        }
        Ok(())
    }
}

/// One target record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TargetConfig {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(length(min = 1))]
    pub url: String,

    pub protocol: Protocol,

    /// Missing or zero means one second
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub check_interval: Option<Duration>,
}

/// Metrics listener settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerSettings {
    #[validate(length(min = 1))]
    pub listen_addr: String,

    #[validate(custom = "validate_metrics_path")]
    pub metrics_path: String,
}

/// Probe settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProbeSettings {
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_probe_timeout")]
    pub timeout: Duration,

    pub follow_redirects: bool,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

/// OpenTelemetry span export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub enabled: bool,
    pub service_name: String,
    pub otlp_endpoint: String,
}

// Default implementations

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            metrics_path: "/metrics".to_string(),
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        let probe = ProbeConfig::default();
        Self {
            timeout: probe.timeout,
            follow_redirects: probe.follow_redirects,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: "interface-exporter".to_string(),
            otlp_endpoint: "http://localhost:4317".to_string(),
        }
    }
}

// Custom validators

fn validate_metrics_path(path: &str) -> Result<(), ValidationError> {
    if !path.starts_with('/') {
        return Err(ValidationError::new("metrics_path_not_absolute"));
    }
    // The root path serves the landing page
    if path == "/" {
        return Err(ValidationError::new("metrics_path_is_root"));
    }
    Ok(())
}

fn validate_probe_timeout(timeout: &Duration) -> Result<(), ValidationError> {
    let millis = timeout.as_millis();
    if millis < 1 || millis > 60_000 {
        return Err(ValidationError::new("probe_timeout_out_of_range"));
    }
    Ok(())
}

// Configuration loading implementation

impl Config {
    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_yaml::from_str(contents)?;
        let config = match value {
            Value::Null => Self::default(),
            Value::Sequence(targets) => Self {
                targets: serde_yaml::from_value(Value::Sequence(targets))?,
                ..Self::default()
            },
            other => serde_yaml::from_value(other)?,
        };

        config.validate()?;
        Ok(config)
    }
}

impl ProbeSettings {
    /// Convert to the probe crate's settings
    pub fn to_probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            timeout: self.timeout,
            follow_redirects: self.follow_redirects,
        }
    }
}
