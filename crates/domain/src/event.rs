//! Event — an immutable record of a device state change.
//!
//! Every call of the mutation primitive produces one, cascades included.
//! Events are fire-and-forget: the core never reads a response.

use serde::{Deserialize, Serialize};

use crate::device::{Horizon, Owner};
use crate::time::Timestamp;

/// A device has been switched on or off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub device: String,
    pub horizon: Horizon,
    pub owner: Owner,
    /// Epoch seconds of the tick that caused the change.
    pub at: Timestamp,
}

impl StateChange {
    #[must_use]
    pub fn new(device: impl Into<String>, horizon: Horizon, owner: Owner, at: Timestamp) -> Self {
        Self {
            device: device.into(),
            horizon,
            owner,
            at,
        }
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.horizon.is_on()
    }
}

impl std::fmt::Display for StateChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_on() {
            write!(f, "{} on {} ({})", self.device, self.horizon, self.owner)
        } else {
            write!(f, "{} off ({})", self.device, self.owner)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_switch_on() {
        let change = StateChange::new("fan_in", Horizon::Indefinite, Owner::Timer, 0);
        assert_eq!(change.to_string(), "fan_in on indefinitely (Timer)");
    }

    #[test]
    fn should_display_switch_off() {
        let change = StateChange::new("mist", Horizon::Off, Owner::NotControlled, 0);
        assert!(!change.is_on());
        assert_eq!(change.to_string(), "mist off (free)");
    }
}
