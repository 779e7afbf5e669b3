//! The two legal mutators of device state, with their cascades.

use terrarium_domain::device::{FAN_IN, FAN_OUT, Horizon, MIST, Owner, SPRAYER};
use terrarium_domain::error::DeviceNotFoundError;
use terrarium_domain::event::StateChange;
use terrarium_domain::time::Timestamp;

use super::Arbiter;
use crate::ports::TraceSink;

const FANS: [&str; 2] = [FAN_IN, FAN_OUT];

impl<T: TraceSink> Arbiter<T> {
    /// Switch a device on for `horizon` under `owner`.
    ///
    /// Switching the sprayer on for a fixed period under [`Owner::Timer`] or
    /// [`Owner::NotControlled`] enters sprayer mode: both fans are forced off
    /// under [`Owner::SprayerRule`] and tracked until the sprayer rule
    /// concludes. An open-ended sprayer leaves the fans alone.
    pub(crate) fn turn_on(
        &mut self,
        device: &str,
        horizon: Horizon,
        owner: Owner,
        now: Timestamp,
    ) -> Result<(), DeviceNotFoundError> {
        self.assign(device, horizon, owner, now)?;
        if device == SPRAYER
            && matches!(horizon, Horizon::Until(_))
            && matches!(owner, Owner::Timer | Owner::NotControlled)
        {
            self.enter_sprayer_mode(now)?;
        }
        Ok(())
    }

    /// Switch a device off and hand it to `owner`.
    ///
    /// Switching the mist off releases both fans.
    pub(crate) fn turn_off(
        &mut self,
        device: &str,
        owner: Owner,
        now: Timestamp,
    ) -> Result<(), DeviceNotFoundError> {
        self.assign(device, Horizon::Off, owner, now)?;
        if device == MIST {
            for fan in FANS {
                self.assign(fan, Horizon::Off, Owner::NotControlled, now)?;
            }
        }
        Ok(())
    }

    fn enter_sprayer_mode(&mut self, now: Timestamp) -> Result<(), DeviceNotFoundError> {
        let delayed_until = now + self.settings.sprayer_rule.delay_seconds();
        self.rule_state.enter_sprayer_mode(delayed_until);
        tracing::info!(delayed_until, "sprayer rule activated");
        for fan in FANS {
            self.turn_off(fan, Owner::SprayerRule, now)?;
            self.rule_state.track(fan);
        }
        Ok(())
    }

    fn assign(
        &mut self,
        device: &str,
        horizon: Horizon,
        owner: Owner,
        now: Timestamp,
    ) -> Result<(), DeviceNotFoundError> {
        self.state_mut(device)?.assign(horizon, owner);
        tracing::debug!(device, %horizon, %owner, "device state changed");
        self.sink.record(StateChange::new(device, horizon, owner, now));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use terrarium_domain::device::{FAN_IN, FAN_OUT, Horizon, MIST, Owner, SPRAYER};
    use terrarium_domain::rule::{ActiveRule, OnPeriod, RuleAction, SprayerRule};
    use terrarium_domain::settings::Settings;
    use terrarium_domain::time::epoch_seconds;

    use crate::testing::{arbiter_with, at};

    fn sprayer_settings(delay_minutes: u32) -> Settings {
        Settings {
            sprayer_rule: SprayerRule {
                delay_minutes,
                actions: vec![
                    RuleAction::new(FAN_IN, OnPeriod::Seconds(900)),
                    RuleAction::new(FAN_OUT, OnPeriod::Seconds(900)),
                ],
            },
            ..Settings::default()
        }
    }

    #[test]
    fn should_assign_horizon_and_owner_and_emit_change() {
        let mut arbiter = arbiter_with(Settings::default());
        let now = epoch_seconds(at(10, 0, 0));
        arbiter
            .turn_on("light1", Horizon::Until(now + 60), Owner::Timer, now)
            .unwrap();

        let state = arbiter.query_state("light1").unwrap();
        assert_eq!(state.horizon(), Horizon::Until(now + 60));
        assert_eq!(state.owner(), Owner::Timer);

        let changes = arbiter.sink().changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].device, "light1");
        assert_eq!(changes[0].at, now);
    }

    #[test]
    fn should_enter_sprayer_mode_when_sprayer_starts_under_timer() {
        let mut arbiter = arbiter_with(sprayer_settings(15));
        let now = epoch_seconds(at(11, 0, 0));
        arbiter
            .turn_on(FAN_IN, Horizon::Indefinite, Owner::Timer, now)
            .unwrap();
        arbiter
            .turn_on(SPRAYER, Horizon::Until(now + 30), Owner::Timer, now)
            .unwrap();

        for fan in [FAN_IN, FAN_OUT] {
            let state = arbiter.query_state(fan).unwrap();
            assert_eq!(state.horizon(), Horizon::Off);
            assert_eq!(state.owner(), Owner::SprayerRule);
            assert!(arbiter.rule_state().is_tracking(fan));
        }
        assert_eq!(arbiter.rule_state().active(), ActiveRule::Sprayer);
        assert_eq!(arbiter.rule_state().delayed_until(), Some(now + 15 * 60));
    }

    #[test]
    fn should_not_enter_sprayer_mode_for_other_owners() {
        let mut arbiter = arbiter_with(sprayer_settings(15));
        let now = epoch_seconds(at(11, 0, 0));
        arbiter
            .turn_on(SPRAYER, Horizon::Until(now + 30), Owner::SprayerRule, now)
            .unwrap();
        assert_eq!(arbiter.rule_state().active(), ActiveRule::None);
        assert_eq!(arbiter.query_state(FAN_IN).unwrap().owner(), Owner::NotControlled);
    }

    #[test]
    fn should_leave_fans_alone_for_open_ended_sprayer() {
        let mut arbiter = arbiter_with(sprayer_settings(15));
        let now = epoch_seconds(at(11, 0, 17));
        arbiter
            .turn_on(FAN_IN, Horizon::Indefinite, Owner::Timer, now)
            .unwrap();
        arbiter
            .turn_on(SPRAYER, Horizon::Indefinite, Owner::Timer, now)
            .unwrap();

        assert_eq!(arbiter.rule_state().active(), ActiveRule::None);
        assert_eq!(arbiter.rule_state().delayed_until(), None);
        assert_eq!(arbiter.query_state(FAN_IN).unwrap().owner(), Owner::Timer);
        assert!(arbiter.query_state(FAN_IN).unwrap().is_on());
    }

    #[test]
    fn should_release_fans_when_mist_goes_off() {
        let mut arbiter = arbiter_with(Settings::default());
        let now = epoch_seconds(at(11, 0, 0));
        arbiter
            .turn_on(MIST, Horizon::Indefinite, Owner::Timer, now)
            .unwrap();
        arbiter.turn_off(FAN_IN, Owner::MistRule, now).unwrap();
        arbiter.turn_off(FAN_OUT, Owner::MistRule, now).unwrap();

        arbiter.turn_off(MIST, Owner::NotControlled, now + 60).unwrap();
        for fan in [FAN_IN, FAN_OUT] {
            let state = arbiter.query_state(fan).unwrap();
            assert_eq!(state.horizon(), Horizon::Off);
            assert_eq!(state.owner(), Owner::NotControlled);
        }
    }

    #[test]
    fn should_leave_free_fans_unchanged_when_mist_goes_off_twice() {
        let mut arbiter = arbiter_with(Settings::default());
        let now = epoch_seconds(at(11, 0, 0));
        arbiter.turn_off(MIST, Owner::NotControlled, now).unwrap();
        let after_first = arbiter.query_state(FAN_IN).unwrap().clone();
        arbiter.turn_off(MIST, Owner::NotControlled, now).unwrap();

        assert_eq!(arbiter.query_state(FAN_IN).unwrap(), &after_first);
        assert_eq!(after_first.horizon(), Horizon::Off);
        assert_eq!(after_first.owner(), Owner::NotControlled);
    }

    #[test]
    fn should_fail_for_unknown_device_without_emitting() {
        let mut arbiter = arbiter_with(Settings::default());
        let err = arbiter
            .turn_on("heater", Horizon::Indefinite, Owner::Timer, 0)
            .unwrap_err();
        assert_eq!(err.name, "heater");
        assert!(arbiter.sink().changes().is_empty());
    }
}
