//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `terrarium.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Control loop settings.
    pub controller: ControllerConfig,
    /// Terrarium temperature sensor.
    pub sensor: SensorConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Control loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// JSON file holding timers, temperature rules and the sprayer rule.
    pub settings_path: PathBuf,
    /// Decrement lifetime counters of switched-on devices every hour.
    pub count_lifetime: bool,
    /// Capacity of the in-process trace bus.
    pub trace_capacity: usize,
}

/// Temperature sensor configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// File holding the terrarium temperature.
    pub path: PathBuf,
    /// Whether the file holds millidegrees.
    pub millidegrees: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `terrarium.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed or the
    /// result is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("terrarium.toml")?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("TERRARIUM_SETTINGS") {
            self.controller.settings_path = PathBuf::from(val);
        }
        if let Some(val) = var("TERRARIUM_SENSOR") {
            self.sensor.path = PathBuf::from(val);
        }
        if let Some(val) = var("TERRARIUM_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.controller.trace_capacity == 0 {
            return Err(ConfigError::Validation(
                "trace capacity must be non-zero".to_string(),
            ));
        }
        if self.controller.settings_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "settings path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from("settings.json"),
            count_lifetime: true,
            trace_capacity: 256,
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/sys/bus/w1/devices/w1_bus_master1/temperature"),
            millidegrees: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "terrariumd=info,terrarium_app=info,terrarium_adapter_sensor_file=info,terrarium::trace=info"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
