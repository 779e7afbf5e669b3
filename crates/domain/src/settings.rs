//! Settings — timers, temperature rules and the sprayer rule as one bundle.
//!
//! Settings are loaded once at start and may be replaced between ticks.
//! [`Settings::normalize`] puts the rules in priority order;
//! [`Settings::validate`] rejects anything the engines cannot run.

use serde::{Deserialize, Serialize};

use crate::device::{DeviceRegistry, MAX_RULES, RuleNr};
use crate::error::ConfigError;
use crate::rule::{
    MAX_ACTIONS_PER_RULE, MAX_SPRAYER_ACTIONS, RuleAction, SprayerRule, TemperatureRule,
};
use crate::timer::Timer;

/// Complete control configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub timers: Vec<Timer>,
    #[serde(default)]
    pub rules: Vec<TemperatureRule>,
    #[serde(default)]
    pub sprayer_rule: SprayerRule,
}

impl Settings {
    /// Sort the rules by threshold, descending. Equal thresholds keep their
    /// configured order.
    pub fn normalize(&mut self) {
        self.rules.sort_by(|a, b| b.threshold.cmp(&a.threshold));
    }

    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.rules
            .windows(2)
            .all(|pair| pair[0].threshold >= pair[1].threshold)
    }

    /// Check the settings against the device registry.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found: unknown devices, timer slots
    /// out of range, too many rules or actions, or unsorted rules.
    pub fn validate(&self, registry: &DeviceRegistry) -> Result<(), ConfigError> {
        for timer in &self.timers {
            let device = registry
                .get(&timer.device)
                .map_err(|_| ConfigError::UnknownDevice {
                    context: format!("timer {}", timer.index),
                    device: timer.device.clone(),
                })?;
            if timer.index == 0 || timer.index > device.timer_slots {
                return Err(ConfigError::TimerIndexOutOfRange {
                    device: timer.device.clone(),
                    index: timer.index,
                    slots: device.timer_slots,
                });
            }
        }

        if self.rules.len() > MAX_RULES {
            return Err(ConfigError::TooManyRules {
                count: self.rules.len(),
                max: MAX_RULES,
            });
        }
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.actions.len() > MAX_ACTIONS_PER_RULE {
                return Err(ConfigError::TooManyActions {
                    rule: index + 1,
                    count: rule.actions.len(),
                    max: MAX_ACTIONS_PER_RULE,
                });
            }
            check_actions(registry, &format!("temperature rule {}", index + 1), &rule.actions)?;
        }
        if !self.is_normalized() {
            return Err(ConfigError::RulesNotSorted);
        }

        if self.sprayer_rule.actions.len() > MAX_SPRAYER_ACTIONS {
            return Err(ConfigError::TooManySprayerActions {
                count: self.sprayer_rule.actions.len(),
                max: MAX_SPRAYER_ACTIONS,
            });
        }
        check_actions(registry, "sprayer rule", &self.sprayer_rule.actions)
    }

    pub fn timers_for_device<'a>(&'a self, device: &'a str) -> impl Iterator<Item = &'a Timer> {
        self.timers.iter().filter(move |t| t.device == device)
    }

    /// Replace timers matching on device and slot index; timers for slots
    /// not configured yet are appended.
    pub fn replace_timers(&mut self, timers: Vec<Timer>) {
        for timer in timers {
            match self
                .timers
                .iter_mut()
                .find(|t| t.device == timer.device && t.index == timer.index)
            {
                Some(slot) => *slot = timer,
                None => self.timers.push(timer),
            }
        }
    }

    /// Replace the rule at priority position `nr`, or append it when `nr` is
    /// the next free position. The result is not re-sorted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RuleNumberOutOfRange`] when `nr` is past the
    /// next free position.
    pub fn replace_rule(&mut self, nr: RuleNr, rule: TemperatureRule) -> Result<(), ConfigError> {
        let index = nr.index();
        match index.cmp(&self.rules.len()) {
            std::cmp::Ordering::Less => self.rules[index] = rule,
            std::cmp::Ordering::Equal => self.rules.push(rule),
            std::cmp::Ordering::Greater => {
                return Err(ConfigError::RuleNumberOutOfRange(usize::from(nr.get())));
            }
        }
        Ok(())
    }
}

fn check_actions(
    registry: &DeviceRegistry,
    context: &str,
    actions: &[RuleAction],
) -> Result<(), ConfigError> {
    for action in actions {
        if !registry.contains(&action.device) {
            return Err(ConfigError::UnknownDevice {
                context: context.to_string(),
                device: action.device.clone(),
            });
        }
    }
    Ok(())
}
