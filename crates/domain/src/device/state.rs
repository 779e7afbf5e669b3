//! Per-device mutable state.

use serde::{Deserialize, Serialize};

use super::{Horizon, Owner};

/// Mutable state of one device, keyed by device name in the arbiter.
///
/// Only the arbiter's mutation primitive changes `horizon` and `owner`; the
/// manual flag is informational for the management surface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceState {
    horizon: Horizon,
    owner: Owner,
    manual: bool,
    runtime_hours: i32,
}

impl DeviceState {
    #[must_use]
    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    #[must_use]
    pub fn owner(&self) -> Owner {
        self.owner
    }

    #[must_use]
    pub fn manual(&self) -> bool {
        self.manual
    }

    #[must_use]
    pub fn runtime_hours(&self) -> i32 {
        self.runtime_hours
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.horizon.is_on()
    }

    /// Record a new horizon and owner in one step.
    pub fn assign(&mut self, horizon: Horizon, owner: Owner) {
        self.horizon = horizon;
        self.owner = owner;
    }

    pub fn set_manual(&mut self, manual: bool) {
        self.manual = manual;
    }

    pub fn set_runtime_hours(&mut self, hours: i32) {
        self.runtime_hours = hours;
    }

    pub fn decrease_runtime_hours(&mut self, hours: i32) {
        self.runtime_hours = self.runtime_hours.saturating_sub(hours);
    }
}
