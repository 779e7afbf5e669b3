//! Timer — a fixed daily schedule for one device.

use serde::{Deserialize, Serialize};

use crate::time::TimeOfDay;

/// A daily timer slot of a device.
///
/// Two shapes exist, selected by `period_seconds`: with `0` the device is
/// switched on at `on` and off at `off`; otherwise it is switched on at `on`
/// for `period_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub device: String,
    /// One-based slot number within the device.
    pub index: u8,
    pub on: TimeOfDay,
    #[serde(default)]
    pub off: TimeOfDay,
    #[serde(default)]
    pub period_seconds: u32,
    /// Whether the timer is in use.
    #[serde(default)]
    pub repeat: bool,
}

/// Resolved shape of a [`Timer`], in minutes of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSchedule {
    OnOff { on: u32, off: u32 },
    OnFor { on: u32, period_seconds: u32 },
}

impl Timer {
    #[must_use]
    pub fn schedule(&self) -> TimerSchedule {
        if self.period_seconds == 0 {
            TimerSchedule::OnOff {
                on: self.on.minutes(),
                off: self.off.minutes(),
            }
        } else {
            TimerSchedule::OnFor {
                on: self.on.minutes(),
                period_seconds: self.period_seconds,
            }
        }
    }

    /// Whether an on/off timer's window `[on, off)` contains `minute`.
    /// On/duration timers never cover a minute.
    #[must_use]
    pub fn covers(&self, minute: u32) -> bool {
        match self.schedule() {
            TimerSchedule::OnOff { on, off } => minute >= on && minute < off,
            TimerSchedule::OnFor { .. } => false,
        }
    }
}
