//! Sprayer rule — takes the fans over after each spray.

use serde::{Deserialize, Serialize};

use super::RuleAction;

/// Maximum number of actions of the sprayer rule.
pub const MAX_SPRAYER_ACTIONS: usize = 4;

/// After the sprayer has been switched on, the fans stay off for
/// `delay_minutes` and then run the configured actions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SprayerRule {
    #[serde(default)]
    pub delay_minutes: u32,
    #[serde(default)]
    pub actions: Vec<RuleAction>,
}

impl SprayerRule {
    #[must_use]
    pub fn delay_seconds(&self) -> i64 {
        i64::from(self.delay_minutes) * 60
    }
}
