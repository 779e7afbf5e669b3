use chrono::NaiveDateTime;
use terrarium_domain::device::Owner;
use terrarium_domain::settings::Settings;
use terrarium_domain::time::epoch_seconds;

use super::{Arbiter, skip_on_error};
use crate::ports::TraceSink;

impl<T: TraceSink> Arbiter<T> {
    /// Runs the sprayer rule actions once its delay lapses, then concludes the
    /// rule when every tracked device has gone off.
    pub(super) fn check_sprayer_rule(&mut self, settings: &Settings, now: NaiveDateTime) {
        if !self.rule_state.is_sprayer_active() {
            return;
        }
        let ts = epoch_seconds(now);
        if self.rule_state.delayed_until() == Some(ts) {
            tracing::info!("sprayer rule delay elapsed, running actions");
            for action in &settings.sprayer_rule.actions {
                let horizon = action.on_period.horizon_from(ts);
                let result = self.turn_on(&action.device, horizon, Owner::SprayerRule, ts);
                if result.is_ok() {
                    self.rule_state.track(action.device.as_str());
                }
                skip_on_error(result, "sprayer");
            }
            self.rule_state.set_delayed_until(None);
        }

        let pending = self.rule_state.delayed_until().is_some();
        let finished = !pending && self.rule_state.tracked().all(|device| !self.is_on(device));
        if finished {
            tracing::info!("sprayer rule finished");
            self.rule_state.reset();
        }
    }
}
