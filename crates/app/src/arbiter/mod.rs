//! Arbiter — decides, tick after tick, which control source owns each
//! device and whether it is on.
//!
//! The arbiter owns the per-device state table and the singleton rule
//! state. All engines run through the mutation primitive in [`mutation`],
//! which applies the sprayer and mist cascades and emits a
//! [`StateChange`](terrarium_domain::event::StateChange) per mutation.
//!
//! Per second the expiry sweep runs; per minute the timer, sprayer and
//! temperature engines run in that order. Nothing here locks: the caller
//! serializes ticks (see [`ClimateController`](crate::controller::ClimateController)).

mod expiry;
mod mutation;
mod report;
mod sprayer;
mod temperature;
mod timers;

pub use report::{DeviceProperties, DeviceStatus, Properties, SwitchState};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use terrarium_domain::device::{DeviceRegistry, DeviceState, Owner, RuleNr};
use terrarium_domain::error::{ConfigError, DeviceNotFoundError, TerrariumError};
use terrarium_domain::rule::{RuleState, SprayerRule, TemperatureRule};
use terrarium_domain::settings::Settings;
use terrarium_domain::time::epoch_seconds;
use terrarium_domain::timer::Timer;

use crate::ports::TraceSink;

/// Device-ownership arbitration engine.
pub struct Arbiter<T> {
    registry: Arc<DeviceRegistry>,
    settings: Arc<Settings>,
    states: HashMap<String, DeviceState>,
    rule_state: RuleState,
    sink: T,
}

impl<T: TraceSink> Arbiter<T> {
    /// Create an arbiter with every registered device off and free.
    ///
    /// # Errors
    ///
    /// Returns [`TerrariumError::ConfigurationInvalid`] when `settings` do
    /// not validate against `registry`. Settings must already be normalized.
    pub fn new(
        registry: DeviceRegistry,
        settings: Settings,
        sink: T,
    ) -> Result<Self, TerrariumError> {
        settings.validate(&registry)?;
        let states = registry
            .names()
            .map(|name| (name.to_string(), DeviceState::default()))
            .collect();
        Ok(Self {
            registry: Arc::new(registry),
            settings: Arc::new(settings),
            states,
            rule_state: RuleState::default(),
            sink,
        })
    }

    /// Second pass: switch off every device whose end time has passed.
    pub fn tick_second(&mut self, now: NaiveDateTime) {
        self.check_expiry(epoch_seconds(now));
    }

    /// Minute pass: timers, then the sprayer rule, then temperature rules.
    ///
    /// `temperature` is the terrarium temperature in whole degrees, `None`
    /// when no reading is available.
    pub fn tick_minute(&mut self, now: NaiveDateTime, temperature: Option<i32>) {
        let settings = Arc::clone(&self.settings);
        self.check_timers(&settings, now);
        self.check_sprayer_rule(&settings, now);
        self.check_temperature_rules(&settings, now, temperature);
    }

    /// Pin a device as manually switched on. Ownership is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceNotFoundError`] for unknown devices.
    pub fn turn_on_manual(&mut self, device: &str) -> Result<(), DeviceNotFoundError> {
        self.state_mut(device)?.set_manual(true);
        Ok(())
    }

    /// Clear the manual pin of a device. Ownership is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceNotFoundError`] for unknown devices.
    pub fn turn_off_manual(&mut self, device: &str) -> Result<(), DeviceNotFoundError> {
        self.state_mut(device)?.set_manual(false);
        Ok(())
    }

    /// Current state of a device.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceNotFoundError`] for unknown devices.
    pub fn query_state(&self, device: &str) -> Result<&DeviceState, DeviceNotFoundError> {
        self.states
            .get(device)
            .ok_or_else(|| DeviceNotFoundError::new(device))
    }

    /// Subtract `hours` from the counter of every switched-on device that
    /// tracks its lifetime.
    pub fn decrease_lifetime(&mut self, hours: i32) {
        for device in self.registry.iter().filter(|d| d.lifetime_counted) {
            if let Some(state) = self.states.get_mut(&device.name) {
                if state.is_on() {
                    state.decrease_runtime_hours(hours);
                }
            }
        }
    }

    /// Restore a lifetime counter, e.g. after a bulb replacement or at start.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceNotFoundError`] for unknown devices.
    pub fn set_runtime_hours(&mut self, device: &str, hours: i32) -> Result<(), DeviceNotFoundError> {
        self.state_mut(device)?.set_runtime_hours(hours);
        Ok(())
    }

    #[must_use]
    pub fn rule_state(&self) -> &RuleState {
        &self.rule_state
    }

    #[must_use]
    pub fn is_sprayer_rule_active(&self) -> bool {
        self.rule_state.is_sprayer_active()
    }

    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn sink(&self) -> &T {
        &self.sink
    }

    pub fn timers_for_device<'a>(&'a self, device: &'a str) -> impl Iterator<Item = &'a Timer> {
        self.settings.timers_for_device(device)
    }

    /// Swap in a whole settings bundle. Takes effect from the next tick.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the settings do not validate; the
    /// previous settings stay in place.
    pub fn load_settings(&mut self, settings: Settings) -> Result<(), ConfigError> {
        settings.validate(&self.registry)?;
        self.settings = Arc::new(settings);
        Ok(())
    }

    /// Replace the temperature rule at priority position `nr` and re-sort.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the resulting settings are invalid.
    pub fn replace_rule(&mut self, nr: RuleNr, rule: TemperatureRule) -> Result<(), ConfigError> {
        self.update_settings(|settings| settings.replace_rule(nr, rule))
    }

    /// Replace timers by device and slot index.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the resulting settings are invalid.
    pub fn replace_timers(&mut self, timers: Vec<Timer>) -> Result<(), ConfigError> {
        self.update_settings(|settings| {
            settings.replace_timers(timers);
            Ok(())
        })
    }

    /// Replace the sprayer rule.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the rule references unknown devices or
    /// has too many actions.
    pub fn set_sprayer_rule(&mut self, rule: SprayerRule) -> Result<(), ConfigError> {
        self.update_settings(|settings| {
            settings.sprayer_rule = rule;
            Ok(())
        })
    }

    fn update_settings(
        &mut self,
        change: impl FnOnce(&mut Settings) -> Result<(), ConfigError>,
    ) -> Result<(), ConfigError> {
        let mut settings = Settings::clone(&self.settings);
        change(&mut settings)?;
        settings.normalize();
        self.load_settings(settings)
    }

    fn state_mut(&mut self, device: &str) -> Result<&mut DeviceState, DeviceNotFoundError> {
        self.states
            .get_mut(device)
            .ok_or_else(|| DeviceNotFoundError::new(device))
    }

    fn owner_of(&self, device: &str) -> Result<Owner, DeviceNotFoundError> {
        self.query_state(device).map(DeviceState::owner)
    }

    fn is_on(&self, device: &str) -> bool {
        self.states.get(device).is_some_and(DeviceState::is_on)
    }
}

/// Log a failed engine action; the tick carries on with the next one.
fn skip_on_error(result: Result<(), DeviceNotFoundError>, engine: &'static str) {
    if let Err(err) = result {
        tracing::warn!(%err, engine, "device action skipped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSink, arbiter_with, at};
    use terrarium_domain::device::{Horizon, SPRAYER};
    use terrarium_domain::rule::{OnPeriod, RuleAction};

    #[test]
    fn should_start_with_every_device_off_and_free() {
        let arbiter = arbiter_with(Settings::default());
        for name in arbiter.registry().names() {
            let state = arbiter.query_state(name).unwrap();
            assert_eq!(state.horizon(), Horizon::Off);
            assert_eq!(state.owner(), Owner::NotControlled);
        }
        assert_eq!(arbiter.rule_state(), &RuleState::default());
    }

    #[test]
    fn should_reject_unsorted_settings_at_construction() {
        let rule = |threshold| TemperatureRule {
            active: true,
            from: "10:00".parse().unwrap(),
            to: "22:00".parse().unwrap(),
            ideal: 26,
            threshold,
            delay_seconds: 0,
            actions: vec![],
        };
        let settings = Settings {
            rules: vec![rule(-24), rule(30)],
            ..Settings::default()
        };
        let result = Arbiter::new(DeviceRegistry::default(), settings, RecordingSink::default());
        assert!(matches!(
            result,
            Err(TerrariumError::ConfigurationInvalid(ConfigError::RulesNotSorted))
        ));
    }

    #[test]
    fn should_set_manual_flag_without_touching_ownership() {
        let mut arbiter = arbiter_with(Settings::default());
        arbiter.turn_on_manual("light1").unwrap();
        let state = arbiter.query_state("light1").unwrap();
        assert!(state.manual());
        assert_eq!(state.horizon(), Horizon::Off);
        assert_eq!(state.owner(), Owner::NotControlled);
        assert!(arbiter.sink().changes().is_empty());

        arbiter.turn_off_manual("light1").unwrap();
        assert!(!arbiter.query_state("light1").unwrap().manual());
    }

    #[test]
    fn should_return_not_found_for_unknown_device() {
        let mut arbiter = arbiter_with(Settings::default());
        assert_eq!(arbiter.turn_on_manual("heater").unwrap_err().name, "heater");
        assert!(arbiter.query_state("heater").is_err());
        assert!(arbiter.set_runtime_hours("heater", 10).is_err());
    }

    #[test]
    fn should_decrease_lifetime_only_for_counted_devices_that_are_on() {
        let mut arbiter = arbiter_with(Settings::default());
        arbiter.set_runtime_hours("uvlight", 1000).unwrap();
        arbiter.set_runtime_hours("light1", 1000).unwrap();

        arbiter.decrease_lifetime(1);
        assert_eq!(arbiter.query_state("uvlight").unwrap().runtime_hours(), 1000);

        let now = epoch_seconds(at(10, 0, 0));
        arbiter
            .turn_on("uvlight", Horizon::Indefinite, Owner::Timer, now)
            .unwrap();
        arbiter
            .turn_on("light1", Horizon::Indefinite, Owner::Timer, now)
            .unwrap();
        arbiter.decrease_lifetime(2);
        assert_eq!(arbiter.query_state("uvlight").unwrap().runtime_hours(), 998);
        assert_eq!(arbiter.query_state("light1").unwrap().runtime_hours(), 1000);
    }

    #[test]
    fn should_resort_rules_when_replacing_a_rule() {
        let mut arbiter = arbiter_with(Settings::default());
        let rule = |threshold| TemperatureRule {
            active: true,
            from: "10:00".parse().unwrap(),
            to: "22:00".parse().unwrap(),
            ideal: 26,
            threshold,
            delay_seconds: 0,
            actions: vec![RuleAction::new("fan_in", OnPeriod::UntilIdeal)],
        };
        arbiter.replace_rule(RuleNr::new(1).unwrap(), rule(-22)).unwrap();
        arbiter.replace_rule(RuleNr::new(2).unwrap(), rule(28)).unwrap();
        let thresholds: Vec<_> = arbiter.settings().rules.iter().map(|r| r.threshold).collect();
        assert_eq!(thresholds, vec![28, -22]);
    }

    #[test]
    fn should_keep_previous_settings_when_replacement_is_invalid() {
        let mut arbiter = arbiter_with(Settings::default());
        let result = arbiter.set_sprayer_rule(SprayerRule {
            delay_minutes: 5,
            actions: vec![RuleAction::new("heater", OnPeriod::Seconds(60))],
        });
        assert!(matches!(result, Err(ConfigError::UnknownDevice { .. })));
        assert_eq!(arbiter.settings().sprayer_rule, SprayerRule::default());
    }

    #[test]
    fn should_list_timers_of_a_device() {
        let mut arbiter = arbiter_with(Settings::default());
        arbiter
            .replace_timers(vec![Timer {
                device: SPRAYER.to_string(),
                index: 1,
                on: "11:00".parse().unwrap(),
                off: "00:00".parse().unwrap(),
                period_seconds: 30,
                repeat: true,
            }])
            .unwrap();
        assert_eq!(arbiter.timers_for_device(SPRAYER).count(), 1);
        assert_eq!(arbiter.timers_for_device("pump").count(), 0);
    }
}
