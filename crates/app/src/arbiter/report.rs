//! Read-only views of the arbiter for a management surface.

use serde::Serialize;
use terrarium_domain::device::{DeviceState, MAX_RULES};

use super::Arbiter;
use crate::ports::TraceSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchState {
    On,
    Off,
}

/// Snapshot of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceStatus {
    pub device: String,
    pub state: SwitchState,
    pub controlled_by: String,
    /// Human readable end condition, only while the device is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub hours_on: i32,
    pub manual: bool,
}

impl DeviceStatus {
    fn new(device: &str, state: &DeviceState) -> Self {
        Self {
            device: device.to_string(),
            state: if state.is_on() {
                SwitchState::On
            } else {
                SwitchState::Off
            },
            controlled_by: state.owner().to_string(),
            end_time: state.is_on().then(|| state.horizon().to_string()),
            hours_on: state.runtime_hours(),
            manual: state.manual(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceProperties {
    pub device: String,
    pub nr_of_timers: u8,
    pub lc_counted: bool,
}

/// Static capabilities of the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Properties {
    pub nr_of_timers: usize,
    pub nr_of_programs: usize,
    pub devices: Vec<DeviceProperties>,
}

impl<T: TraceSink> Arbiter<T> {
    /// Status of every device, in registry order.
    #[must_use]
    pub fn status(&self) -> Vec<DeviceStatus> {
        self.registry
            .names()
            .filter_map(|name| {
                self.states
                    .get(name)
                    .map(|state| DeviceStatus::new(name, state))
            })
            .collect()
    }

    #[must_use]
    pub fn properties(&self) -> Properties {
        Properties {
            nr_of_timers: self.registry.timer_slots(),
            nr_of_programs: MAX_RULES,
            devices: self
                .registry
                .iter()
                .map(|device| DeviceProperties {
                    device: device.name.clone(),
                    nr_of_timers: device.timer_slots,
                    lc_counted: device.lifetime_counted,
                })
                .collect(),
        }
    }
}
