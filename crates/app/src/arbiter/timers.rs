use std::sync::Arc;

use chrono::NaiveDateTime;
use terrarium_domain::device::{FAN_IN, FAN_OUT, Horizon, MIST, Owner};
use terrarium_domain::error::DeviceNotFoundError;
use terrarium_domain::settings::Settings;
use terrarium_domain::time::{Timestamp, epoch_seconds, minute_of_day};
use terrarium_domain::timer::{Timer, TimerSchedule};

use super::{Arbiter, skip_on_error};
use crate::ports::TraceSink;

impl<T: TraceSink> Arbiter<T> {
    /// Switch on every device whose repeating on/off timer window contains
    /// `now`, so a restart in the middle of a window does not leave it dark.
    /// Only free devices are taken over.
    pub fn restore_timers(&mut self, now: NaiveDateTime) {
        let settings = Arc::clone(&self.settings);
        let minute = minute_of_day(now);
        let ts = epoch_seconds(now);
        for timer in settings.timers.iter().filter(|t| t.repeat && t.covers(minute)) {
            let result = self.owner_of(&timer.device).and_then(|owner| {
                if owner == Owner::NotControlled {
                    tracing::info!(device = %timer.device, index = timer.index, "restoring timer");
                    self.switch_on_by_timer(&timer.device, ts)
                } else {
                    Ok(())
                }
            });
            skip_on_error(result, "timer");
        }
    }

    pub(super) fn check_timers(&mut self, settings: &Settings, now: NaiveDateTime) {
        let minute = minute_of_day(now);
        let ts = epoch_seconds(now);
        for timer in settings.timers.iter().filter(|t| t.repeat) {
            let result = self.apply_timer(timer, minute, ts);
            skip_on_error(result, "timer");
        }
    }

    fn apply_timer(
        &mut self,
        timer: &Timer,
        minute: u32,
        now: Timestamp,
    ) -> Result<(), DeviceNotFoundError> {
        let owner = self.owner_of(&timer.device)?;
        let is_on = self.is_on(&timer.device);
        match timer.schedule() {
            TimerSchedule::OnOff { on, .. } if minute == on => {
                if owner == Owner::NotControlled || owner.is_temperature_rule() {
                    self.switch_on_by_timer(&timer.device, now)?;
                }
            }
            TimerSchedule::OnOff { off, .. } if off != 0 && minute == off => {
                if is_on && owner == Owner::Timer {
                    self.turn_off(&timer.device, Owner::NotControlled, now)?;
                }
            }
            TimerSchedule::OnFor { on, period_seconds } if minute == on => {
                if !is_on && owner == Owner::NotControlled {
                    let horizon = Horizon::Until(now + i64::from(period_seconds));
                    self.turn_on(&timer.device, horizon, Owner::Timer, now)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn switch_on_by_timer(&mut self, device: &str, now: Timestamp) -> Result<(), DeviceNotFoundError> {
        self.turn_on(device, Horizon::Indefinite, Owner::Timer, now)?;
        if device == MIST {
            self.turn_off(FAN_IN, Owner::MistRule, now)?;
            self.turn_off(FAN_OUT, Owner::MistRule, now)?;
        }
        Ok(())
    }
}
