//! Device — a named actuator (light, fan, mist, sprayer, pump, UV lamp, …).
//!
//! Devices are identity only. Everything that changes tick after tick lives
//! in [`DeviceState`], keyed by the device name.

mod horizon;
mod owner;
mod state;

pub use horizon::Horizon;
pub use owner::{MAX_RULES, Owner, RuleNr};
pub use state::DeviceState;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DeviceNotFoundError};

/// The water sprayer; switching it on enters sprayer-rule mode.
pub const SPRAYER: &str = "sprayer";
/// The mist generator; switching it off releases both fans.
pub const MIST: &str = "mist";
/// Intake fan.
pub const FAN_IN: &str = "fan_in";
/// Exhaust fan.
pub const FAN_OUT: &str = "fan_out";

/// A physical actuator known to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    /// Number of timer slots configurable for this device.
    pub timer_slots: u8,
    /// Whether burning hours are tracked (bulbs, pumps).
    pub lifetime_counted: bool,
}

impl Device {
    #[must_use]
    pub fn new(name: impl Into<String>, timer_slots: u8, lifetime_counted: bool) -> Self {
        Self {
            name: name.into(),
            timer_slots,
            lifetime_counted,
        }
    }
}

/// Static, ordered list of devices. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    /// Build a registry from an ordered list of devices.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyDeviceName`] or
    /// [`ConfigError::DuplicateDevice`] when names are not unique and non-empty.
    pub fn new(devices: Vec<Device>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for device in &devices {
            if device.name.is_empty() {
                return Err(ConfigError::EmptyDeviceName);
            }
            if !seen.insert(device.name.as_str()) {
                return Err(ConfigError::DuplicateDevice(device.name.clone()));
            }
        }
        Ok(Self { devices })
    }

    /// Look up a device by name.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceNotFoundError`] for names outside the registry.
    pub fn get(&self, name: &str) -> Result<&Device, DeviceNotFoundError> {
        self.devices
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| DeviceNotFoundError::new(name))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.devices.iter().any(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.devices.iter().map(|d| d.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Total number of timer slots over all devices.
    #[must_use]
    pub fn timer_slots(&self) -> usize {
        self.devices.iter().map(|d| usize::from(d.timer_slots)).sum()
    }
}

impl Default for DeviceRegistry {
    /// The standard terrarium wiring: six light channels, pump, sprayer,
    /// mist, two fans and a spare relay. Only the UV lamp counts its hours.
    fn default() -> Self {
        let devices = [
            ("light1", 1, false),
            ("light2", 1, false),
            ("light3", 1, false),
            ("light4", 1, false),
            ("uvlight", 1, true),
            ("light6", 1, false),
            ("pump", 5, false),
            (SPRAYER, 5, false),
            (MIST, 5, false),
            (FAN_IN, 5, false),
            (FAN_OUT, 5, false),
            ("spare", 5, false),
        ]
        .into_iter()
        .map(|(name, slots, counted)| Device::new(name, slots, counted))
        .collect();
        Self { devices }
    }
}
