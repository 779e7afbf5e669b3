//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts via `#[from]`.

/// Top-level error for the terrarium core.
#[derive(Debug, thiserror::Error)]
pub enum TerrariumError {
    #[error("device not found")]
    DeviceNotFound(#[from] DeviceNotFoundError),

    #[error("configuration invalid")]
    ConfigurationInvalid(#[from] ConfigError),
}

/// A device name that is not part of the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no device named {name:?}")]
pub struct DeviceNotFoundError {
    pub name: String,
}

impl DeviceNotFoundError {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Rejections raised while loading or replacing configuration.
///
/// These never surface mid-tick: settings are validated before the engines
/// ever see them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("device name must not be empty")]
    EmptyDeviceName,

    #[error("device {0:?} is registered twice")]
    DuplicateDevice(String),

    #[error("{context} references unknown device {device:?}")]
    UnknownDevice { context: String, device: String },

    #[error("at most {max} temperature rules are supported, got {count}")]
    TooManyRules { count: usize, max: usize },

    #[error("temperature rule {rule} has {count} actions, at most {max} are supported")]
    TooManyActions { rule: usize, count: usize, max: usize },

    #[error("the sprayer rule has {count} actions, at most {max} are supported")]
    TooManySprayerActions { count: usize, max: usize },

    #[error("temperature rules must be sorted by threshold, descending")]
    RulesNotSorted,

    #[error("temperature rule number {0} is out of range")]
    RuleNumberOutOfRange(usize),

    #[error("timer {index} of device {device:?} is out of range ({slots} slots)")]
    TimerIndexOutOfRange { device: String, index: u8, slots: u8 },

    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTimeOfDay(String),

    #[error("invalid on-period {0}, expected seconds > 0, -1 or -2")]
    InvalidOnPeriod(i64),
}
