//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files, and the
//! immutable [`BridgeConfig`] the bridge runs with.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{BridgeError, Result};
use crate::flight::Origin;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub simulator: SimulatorConfig,
    pub origin: OriginConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Simulator network configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub local_port: u16,
}

/// Reference point for local positions
///
/// Kept as text, the way the host application hands the values over.
#[derive(Debug, Deserialize, Clone)]
pub struct OriginConfig {
    pub latitude: String,
    pub longitude: String,
}

/// Timer configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    #[serde(default = "default_update_period_ms")]
    pub update_period_ms: u64,

    #[serde(default = "default_simulator_timeout_ms")]
    pub simulator_timeout_ms: u64,

    /// Zero disables the autopilot heartbeat timeout
    #[serde(default)]
    pub autopilot_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Empty disables file logging
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 1100 }

fn default_update_period_ms() -> u64 { 20 }
fn default_simulator_timeout_ms() -> u64 { 2000 }

fn default_log_level() -> String { "info".to_string() }

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            update_period_ms: default_update_period_ms(),
            simulator_timeout_ms: default_simulator_timeout_ms(),
            autopilot_timeout_ms: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

/// Accepted log levels
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hitl_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// let bridge_config = config.bridge_config()?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the runtime bridge configuration
    pub fn bridge_config(&self) -> Result<BridgeConfig> {
        let autopilot_timeout = match self.timing.autopilot_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        let config = BridgeConfig::new(
            &self.simulator.host,
            self.simulator.port,
            &self.origin.latitude,
            &self.origin.longitude,
        )?
        .with_local_port(self.simulator.local_port)
        .with_update_period(Duration::from_millis(self.timing.update_period_ms))
        .with_simulator_timeout(Duration::from_millis(self.timing.simulator_timeout_ms))
        .with_autopilot_timeout(autopilot_timeout);

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(BridgeError::InvalidConfig(format!(
                "log level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }

        self.bridge_config().map(|_| ())
    }
}

/// Immutable runtime configuration of a bridge
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Simulator host name or address
    pub host: String,
    /// Simulator UDP port
    pub port: u16,
    /// Local UDP port, 0 for an ephemeral port
    pub local_port: u16,
    /// Reference point for local positions
    pub origin: Origin,
    /// Period of the command packet transmission
    pub update_period: Duration,
    /// Silence after which the simulator counts as disconnected
    pub simulator_timeout: Duration,
    /// Heartbeat silence after which the autopilot counts as disconnected
    pub autopilot_timeout: Option<Duration>,
}

impl BridgeConfig {
    /// Create a configuration from the host application's parameters
    ///
    /// Timing starts at the defaults (20 ms updates, 2 s simulator timeout,
    /// no autopilot heartbeat timeout).
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the host is empty, the port is zero, or a
    /// coordinate does not parse or lies outside the globe.
    pub fn new(host: &str, port: u16, latitude: &str, longitude: &str) -> Result<Self> {
        let config = Self {
            host: host.trim().to_string(),
            port,
            local_port: 0,
            origin: Origin::new(
                parse_coordinate("latitude", latitude, 90.0)?,
                parse_coordinate("longitude", longitude, 180.0)?,
            ),
            update_period: Duration::from_millis(default_update_period_ms()),
            simulator_timeout: Duration::from_millis(default_simulator_timeout_ms()),
            autopilot_timeout: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_local_port(mut self, local_port: u16) -> Self {
        self.local_port = local_port;
        self
    }

    pub fn with_update_period(mut self, period: Duration) -> Self {
        self.update_period = period;
        self
    }

    pub fn with_simulator_timeout(mut self, timeout: Duration) -> Self {
        self.simulator_timeout = timeout;
        self
    }

    pub fn with_autopilot_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.autopilot_timeout = timeout;
        self
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if any value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(BridgeError::InvalidConfig(
                "simulator host cannot be empty".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(BridgeError::InvalidConfig(
                "simulator port must be between 1 and 65535".to_string(),
            ));
        }

        let update_ms = self.update_period.as_millis();
        if update_ms == 0 || update_ms > 10_000 {
            return Err(BridgeError::InvalidConfig(
                "update_period_ms must be between 1 and 10000".to_string(),
            ));
        }

        let timeout_ms = self.simulator_timeout.as_millis();
        if timeout_ms == 0 || timeout_ms > 60_000 {
            return Err(BridgeError::InvalidConfig(
                "simulator_timeout_ms must be between 1 and 60000".to_string(),
            ));
        }

        if self.simulator_timeout <= self.update_period {
            return Err(BridgeError::InvalidConfig(
                "simulator_timeout_ms must be greater than update_period_ms".to_string(),
            ));
        }

        if let Some(timeout) = self.autopilot_timeout {
            let ms = timeout.as_millis();
            if ms == 0 || ms > 60_000 {
                return Err(BridgeError::InvalidConfig(
                    "autopilot_timeout_ms must be between 1 and 60000".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Parse a coordinate in degrees and check it against `±limit`
fn parse_coordinate(name: &str, text: &str, limit: f64) -> Result<f64> {
    let value: f64 = text.trim().parse().map_err(|_| {
        BridgeError::InvalidConfig(format!("{} {:?} is not a number", name, text))
    })?;

    if !value.is_finite() || value.abs() > limit {
        return Err(BridgeError::InvalidConfig(format!(
            "{} must be between -{} and {}",
            name, limit, limit
        )));
    }

    Ok(value)
}
