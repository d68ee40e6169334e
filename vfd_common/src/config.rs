//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! across all VFD applications, plus the drive application configuration
//! itself.
//!
//! # Usage
//!
//! ```rust,no_run
//! use vfd_common::config::{ConfigError, DriveAppConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = DriveAppConfig::from_file(Path::new("drive.toml"))?;
//!     println!("Drive at {}:{}", config.connection.host, config.connection.port);
//!     Ok(())
//! }
//! ```

use crate::drive::consts::{DEFAULT_PORT, MAX_REFERENCE_HZ, MAX_UNIT_ID, MIN_UNIT_ID};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
///
/// This enum represents all possible errors that can occur when loading
/// configuration files.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Common configuration fields shared across all VFD applications.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "vfd-pump-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// Blanket-implemented for every `serde::de::DeserializeOwned` type.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

// ─── Drive Application Config ───────────────────────────────────────

fn default_display_name() -> String {
    "ACQ580 Drive".to_string()
}

fn default_true() -> bool {
    true
}

/// Complete configuration of one drive application instance.
///
/// # TOML Example
///
/// ```toml
/// display_name = "Pump 1"
/// control_enabled = true
///
/// [shared]
/// service_name = "vfd-pump-01"
///
/// [connection]
/// host = "10.0.0.20"
/// unit_id = 3
///
/// [operating]
/// max_frequency_hz = 50.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriveAppConfig {
    /// Name to display for this drive instance.
    #[serde(default = "default_display_name")]
    pub display_name: String,

    /// Allow remote start and speed commands.
    #[serde(default = "default_true")]
    pub control_enabled: bool,

    pub shared: SharedConfig,

    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub load: LoadConfig,

    #[serde(default)]
    pub operating: OperatingLimits,

    #[serde(default)]
    pub monitoring: MonitoringConfig,

    #[serde(default)]
    pub alarms: AlarmThresholds,
}

impl DriveAppConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.connection.validate()?;
        self.load.validate()?;
        self.operating.validate()?;
        self.monitoring.validate()?;
        self.alarms.validate()?;
        Ok(())
    }
}

/// Device connection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    /// IP address or hostname of the gateway/drive.
    pub host: String,
    /// Modbus TCP port.
    pub port: u16,
    /// Modbus unit id (1-247).
    pub unit_id: u8,
    /// Per-request timeout in seconds.
    pub timeout_s: f64,
}

impl ConnectionConfig {
    /// Request timeout as a `Duration`. Falls back to 3 s if unrepresentable.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_s).unwrap_or(Duration::from_secs(3))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "connection.host cannot be empty".to_string(),
            ));
        }
        if !(MIN_UNIT_ID..=MAX_UNIT_ID).contains(&self.unit_id) {
            return Err(ConfigError::ValidationError(format!(
                "connection.unit_id {} out of range {}-{}",
                self.unit_id, MIN_UNIT_ID, MAX_UNIT_ID
            )));
        }
        if !(self.timeout_s.is_finite() && self.timeout_s > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "connection.timeout_s must be positive, got {}",
                self.timeout_s
            )));
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.100".to_string(),
            port: DEFAULT_PORT,
            unit_id: 1,
            timeout_s: 3.0,
        }
    }
}

/// Connected load nameplate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Pump, Fan, Conveyor, Compressor, ...
    pub load_type: String,
    pub load_name: String,
    pub rated_power_kw: f64,
    pub rated_speed_rpm: f64,
    pub rated_voltage_v: f64,
    /// Basis for the high-current alarm percentage.
    pub rated_current_a: f64,
}

impl LoadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rated_current_a.is_finite() && self.rated_current_a > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "load.rated_current_a must be positive, got {}",
                self.rated_current_a
            )));
        }
        Ok(())
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            load_type: "Pump".to_string(),
            load_name: "Main Pump".to_string(),
            rated_power_kw: 11.0,
            rated_speed_rpm: 1450.0,
            rated_voltage_v: 400.0,
            rated_current_a: 22.0,
        }
    }
}

/// Operating limits. Only the frequency window is enforced; ramp times
/// are informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperatingLimits {
    pub max_frequency_hz: f64,
    pub min_frequency_hz: f64,
    pub accel_time_s: f64,
    pub decel_time_s: f64,
}

impl OperatingLimits {
    /// Clamp a setpoint into `[min_frequency_hz, max_frequency_hz]`.
    ///
    /// An inverted window (not rejected when the config skipped
    /// `validate()`) resolves to `max_frequency_hz`.
    pub fn clamp_frequency(&self, frequency_hz: f64) -> f64 {
        frequency_hz
            .max(self.min_frequency_hz)
            .min(self.max_frequency_hz)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_frequency_hz.is_finite() && self.min_frequency_hz >= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "operating.min_frequency_hz must be >= 0, got {}",
                self.min_frequency_hz
            )));
        }
        if !(self.max_frequency_hz.is_finite() && self.max_frequency_hz <= MAX_REFERENCE_HZ) {
            return Err(ConfigError::ValidationError(format!(
                "operating.max_frequency_hz must be <= {MAX_REFERENCE_HZ}, got {}",
                self.max_frequency_hz
            )));
        }
        if self.min_frequency_hz > self.max_frequency_hz {
            return Err(ConfigError::ValidationError(format!(
                "operating.min_frequency_hz ({}) exceeds max_frequency_hz ({})",
                self.min_frequency_hz, self.max_frequency_hz
            )));
        }
        Ok(())
    }
}

impl Default for OperatingLimits {
    fn default() -> Self {
        Self {
            max_frequency_hz: 50.0,
            min_frequency_hz: 0.0,
            accel_time_s: 10.0,
            decel_time_s: 10.0,
        }
    }
}

/// Polling and data logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitoringConfig {
    /// Poll cadence in seconds.
    pub poll_interval_s: f64,
    /// Publish a data record every cycle (throttled to 1 Hz).
    pub log_data: bool,
}

impl MonitoringConfig {
    /// Poll interval as a `Duration`. Falls back to 2 s if unrepresentable.
    pub fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.poll_interval_s).unwrap_or(Duration::from_secs(2))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.poll_interval_s.is_finite() && self.poll_interval_s > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "monitoring.poll_interval_s must be positive, got {}",
                self.poll_interval_s
            )));
        }
        Ok(())
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            poll_interval_s: 2.0,
            log_data: true,
        }
    }
}

/// Threshold alarm limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlarmThresholds {
    /// Percent of rated current.
    pub high_current_pct: f64,
    pub high_temperature_c: f64,
    pub low_dc_bus_v: f64,
    pub high_dc_bus_v: f64,
}

impl AlarmThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.low_dc_bus_v >= self.high_dc_bus_v {
            return Err(ConfigError::ValidationError(format!(
                "alarms.low_dc_bus_v ({}) must be below high_dc_bus_v ({})",
                self.low_dc_bus_v, self.high_dc_bus_v
            )));
        }
        Ok(())
    }
}

impl Default for AlarmThresholds {
    fn default() -> Self {
        Self {
            high_current_pct: 90.0,
            high_temperature_c: 70.0,
            low_dc_bus_v: 500.0,
            high_dc_bus_v: 750.0,
        }
    }
}
