use chrono::NaiveDateTime;
use terrarium_domain::device::{Owner, RuleNr};
use terrarium_domain::rule::{ActiveRule, TemperatureRule};
use terrarium_domain::settings::Settings;
use terrarium_domain::time::{Timestamp, epoch_seconds};

use super::{Arbiter, skip_on_error};
use crate::ports::TraceSink;

impl<T: TraceSink> Arbiter<T> {
    /// Evaluates the temperature rules in priority order. The first rule
    /// triggered by `temperature` wins the tick; reaching a rule's ideal
    /// temperature releases its devices without ending the evaluation.
    ///
    /// An enabled rule outside its window releases its devices and clears
    /// the rule state on every tick, whichever rule the state belongs to.
    /// Disabled rules are skipped.
    pub(super) fn check_temperature_rules(
        &mut self,
        settings: &Settings,
        now: NaiveDateTime,
        temperature: Option<i32>,
    ) {
        if self.rule_state.is_sprayer_active() {
            return;
        }
        let ts = epoch_seconds(now);
        for (index, rule) in settings.rules.iter().enumerate() {
            let Some(nr) = RuleNr::from_index(index) else {
                break;
            };
            if !rule.active {
                continue;
            }
            if !rule.in_window(now) {
                tracing::debug!(rule = %nr, "temperature rule outside its window");
                self.release_rule(nr, rule, ts);
                self.rule_state.reset();
                continue;
            }
            let Some(temperature) = temperature else {
                continue;
            };
            if rule.is_triggered_by(temperature) {
                self.trigger_rule(nr, rule, ts);
                break;
            }
            if rule.direction().is_some() && rule.is_ideal(temperature) {
                tracing::debug!(rule = %nr, temperature, "ideal temperature reached");
                self.release_rule(nr, rule, ts);
                self.rule_state.reset();
            }
        }
    }

    fn trigger_rule(&mut self, nr: RuleNr, rule: &TemperatureRule, now: Timestamp) {
        if self.rule_state.active() != ActiveRule::Temperature(nr) {
            tracing::info!(rule = %nr, "temperature rule triggered");
        }
        self.rule_state.activate(ActiveRule::Temperature(nr));
        match self.rule_state.delayed_until() {
            None => {
                for action in &rule.actions {
                    let result = self.owner_of(&action.device).and_then(|owner| {
                        if owner != Owner::NotControlled {
                            return Ok(());
                        }
                        let horizon = action.on_period.horizon_from(now);
                        self.turn_on(&action.device, horizon, Owner::TemperatureRule(nr), now)?;
                        self.rule_state.track(action.device.as_str());
                        Ok(())
                    });
                    skip_on_error(result, "temperature");
                }
                if rule.delay_seconds > 0 {
                    self.rule_state
                        .set_delayed_until(Some(now + i64::from(rule.delay_seconds)));
                }
            }
            Some(until) if now >= until => self.rule_state.set_delayed_until(None),
            Some(_) => {}
        }
    }

    /// Switches off every action device still on under rule `nr`.
    fn release_rule(&mut self, nr: RuleNr, rule: &TemperatureRule, now: Timestamp) {
        let owner = Owner::TemperatureRule(nr);
        for action in &rule.actions {
            let result = self.owner_of(&action.device).and_then(|current| {
                if current == owner && self.is_on(&action.device) {
                    self.turn_off(&action.device, Owner::NotControlled, now)
                } else {
                    Ok(())
                }
            });
            skip_on_error(result, "temperature");
        }
    }
}
