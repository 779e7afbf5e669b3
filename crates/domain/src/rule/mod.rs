//! Rules — automatic control sources that claim devices.
//!
//! Temperature rules react to the terrarium temperature inside a daily
//! window; the sprayer rule takes over the fans after each spray. Both
//! switch devices through [`RuleAction`]s, and whichever rule is currently
//! in charge is recorded in the singleton [`RuleState`].

mod sprayer;
mod temperature;

pub use sprayer::{MAX_SPRAYER_ACTIONS, SprayerRule};
pub use temperature::{MAX_ACTIONS_PER_RULE, TemperatureRule, TriggerDirection};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::device::{Horizon, RuleNr};
use crate::error::ConfigError;
use crate::time::Timestamp;

/// How long a rule action keeps its device on.
///
/// Serialized with the legacy integer encoding: positive seconds, `-1`
/// indefinite, `-2` until the ideal temperature is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum OnPeriod {
    Seconds(u32),
    Indefinite,
    UntilIdeal,
}

impl OnPeriod {
    /// Horizon for a device switched on at `now`.
    #[must_use]
    pub fn horizon_from(self, now: Timestamp) -> Horizon {
        match self {
            Self::Seconds(secs) => Horizon::Until(now + i64::from(secs)),
            Self::Indefinite => Horizon::Indefinite,
            Self::UntilIdeal => Horizon::UntilIdeal,
        }
    }
}

impl TryFrom<i64> for OnPeriod {
    type Error = ConfigError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            -1 => Ok(Self::Indefinite),
            -2 => Ok(Self::UntilIdeal),
            secs if secs > 0 => u32::try_from(secs)
                .map(Self::Seconds)
                .map_err(|_| ConfigError::InvalidOnPeriod(raw)),
            other => Err(ConfigError::InvalidOnPeriod(other)),
        }
    }
}

impl From<OnPeriod> for i64 {
    fn from(value: OnPeriod) -> Self {
        match value {
            OnPeriod::Seconds(secs) => i64::from(secs),
            OnPeriod::Indefinite => -1,
            OnPeriod::UntilIdeal => -2,
        }
    }
}

/// Switch `device` on for `on_period`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAction {
    pub device: String,
    pub on_period: OnPeriod,
}

impl RuleAction {
    #[must_use]
    pub fn new(device: impl Into<String>, on_period: OnPeriod) -> Self {
        Self {
            device: device.into(),
            on_period,
        }
    }
}

/// The rule currently in charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "rule", rename_all = "snake_case")]
pub enum ActiveRule {
    #[default]
    None,
    Temperature(RuleNr),
    Sprayer,
}

/// What is currently in charge, with its pending delay and the devices it
/// has claimed.
///
/// `tracked` is only non-empty while `active` is not [`ActiveRule::None`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleState {
    active: ActiveRule,
    delayed_until: Option<Timestamp>,
    tracked: BTreeSet<String>,
}

impl RuleState {
    #[must_use]
    pub fn active(&self) -> ActiveRule {
        self.active
    }

    #[must_use]
    pub fn delayed_until(&self) -> Option<Timestamp> {
        self.delayed_until
    }

    #[must_use]
    pub fn is_sprayer_active(&self) -> bool {
        self.active == ActiveRule::Sprayer
    }

    pub fn tracked(&self) -> impl Iterator<Item = &str> {
        self.tracked.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_tracking(&self, device: &str) -> bool {
        self.tracked.contains(device)
    }

    pub fn activate(&mut self, rule: ActiveRule) {
        self.active = rule;
    }

    pub fn set_delayed_until(&mut self, until: Option<Timestamp>) {
        self.delayed_until = until;
    }

    /// Attribute a device to the active rule. Ignored while no rule is
    /// active.
    pub fn track(&mut self, device: impl Into<String>) {
        if self.active != ActiveRule::None {
            self.tracked.insert(device.into());
        }
    }

    /// Hand all tracking over to the sprayer rule.
    pub fn enter_sprayer_mode(&mut self, delayed_until: Timestamp) {
        self.active = ActiveRule::Sprayer;
        self.delayed_until = Some(delayed_until);
        self.tracked.clear();
    }

    /// Conclude the active rule.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
