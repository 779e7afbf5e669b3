//! Temperature rule — switches devices while the terrarium is too cold or
//! too hot inside a daily window.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::RuleAction;
use crate::time::{TimeOfDay, minute_of_day};

/// Maximum number of actions per temperature rule.
pub const MAX_ACTIONS_PER_RULE: usize = 5;

/// Which side of the threshold triggers a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDirection {
    /// Negative threshold: triggers below `-threshold`.
    TooCold,
    /// Positive threshold: triggers above `threshold`.
    TooHot,
}

/// A threshold rule evaluated once per minute.
///
/// The sign of `threshold` selects the direction; its magnitude is the
/// trigger temperature. Rules are evaluated in descending threshold order,
/// which is also their priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureRule {
    pub active: bool,
    /// Start of the window (inclusive).
    #[serde(default)]
    pub from: TimeOfDay,
    /// End of the window (exclusive).
    #[serde(default)]
    pub to: TimeOfDay,
    pub ideal: i32,
    pub threshold: i32,
    #[serde(default)]
    pub delay_seconds: u32,
    #[serde(default)]
    pub actions: Vec<RuleAction>,
}

impl TemperatureRule {
    #[must_use]
    pub fn direction(&self) -> Option<TriggerDirection> {
        match self.threshold {
            t if t < 0 => Some(TriggerDirection::TooCold),
            t if t > 0 => Some(TriggerDirection::TooHot),
            _ => None,
        }
    }

    /// Whether `now` falls in `[from, to)`, regardless of the active flag.
    #[must_use]
    pub fn in_window(&self, now: NaiveDateTime) -> bool {
        let minute = minute_of_day(now);
        minute >= self.from.minutes() && minute < self.to.minutes()
    }

    #[must_use]
    pub fn is_triggered_by(&self, temperature: i32) -> bool {
        match self.direction() {
            Some(TriggerDirection::TooCold) => temperature < -self.threshold,
            Some(TriggerDirection::TooHot) => temperature > self.threshold,
            None => false,
        }
    }

    #[must_use]
    pub fn is_ideal(&self, temperature: i32) -> bool {
        temperature == self.ideal
    }
}
