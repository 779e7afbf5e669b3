//! Climate controller — serializes ticks and management calls around the
//! arbiter.
//!
//! The whole arbitration pass runs inside one mutual-exclusion region:
//! cascades cross devices, so no finer locking is possible. The sensor is
//! read before the region is entered.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDateTime, Timelike};
use terrarium_domain::device::DeviceState;
use terrarium_domain::error::{ConfigError, DeviceNotFoundError};
use terrarium_domain::settings::Settings;
use terrarium_domain::time::start_of_minute;

use crate::arbiter::{Arbiter, DeviceStatus, Properties};
use crate::ports::{Clock, TemperatureProvider, TraceSink};

/// What a call to [`ClimateController::tick`] ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Only the expiry sweep.
    Second,
    /// The expiry sweep followed by the minute engines.
    Minute,
}

struct Inner<T> {
    arbiter: Arbiter<T>,
    last_minute: Option<NaiveDateTime>,
}

/// Drives an [`Arbiter`] from a clock and a temperature sensor.
pub struct ClimateController<C, S, T> {
    clock: C,
    sensor: S,
    count_lifetime: bool,
    inner: Mutex<Inner<T>>,
}

impl<C, S, T> ClimateController<C, S, T>
where
    C: Clock,
    S: TemperatureProvider,
    T: TraceSink,
{
    pub fn new(clock: C, sensor: S, arbiter: Arbiter<T>) -> Self {
        Self {
            clock,
            sensor,
            count_lifetime: true,
            inner: Mutex::new(Inner {
                arbiter,
                last_minute: None,
            }),
        }
    }

    /// Toggle the hourly decrement of lifetime counters.
    #[must_use]
    pub fn with_lifetime_counting(mut self, enabled: bool) -> Self {
        self.count_lifetime = enabled;
        self
    }

    /// Catch up with timers whose window is already open, as of the start
    /// of the current minute.
    #[tracing::instrument(skip(self))]
    pub fn start(&self) {
        let now = start_of_minute(self.clock.now());
        self.lock().arbiter.restore_timers(now);
        tracing::info!(%now, "controller started");
    }

    /// Run one scheduling step. Meant to be called once per second.
    ///
    /// The clock is read once. The expiry sweep always runs; the first call
    /// within a new minute also reads the sensor and runs the timer, sprayer
    /// and temperature engines at the start of that minute. At the top of
    /// each hour lifetime counters lose one hour when counting is enabled.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn tick(&self) -> Tick {
        let now = self.clock.now();
        let minute = start_of_minute(now);
        let new_minute = self.lock().last_minute != Some(minute);
        let temperature = if new_minute {
            self.sensor.terrarium_temperature()
        } else {
            None
        };

        let mut inner = self.lock();
        inner.arbiter.tick_second(now);
        if inner.last_minute == Some(minute) {
            return Tick::Second;
        }
        let previous = inner.last_minute.replace(minute);
        tracing::debug!(%minute, ?temperature, "running minute engines");
        inner.arbiter.tick_minute(minute, temperature);
        if self.count_lifetime && previous.is_some() && minute.minute() == 0 {
            inner.arbiter.decrease_lifetime(1);
        }
        Tick::Minute
    }

    /// Run `f` with exclusive access to the arbiter, between ticks.
    pub fn with_arbiter<R>(&self, f: impl FnOnce(&mut Arbiter<T>) -> R) -> R {
        f(&mut self.lock().arbiter)
    }

    /// # Errors
    ///
    /// Returns [`DeviceNotFoundError`] for unknown devices.
    #[tracing::instrument(skip(self))]
    pub fn query_state(&self, device: &str) -> Result<DeviceState, DeviceNotFoundError> {
        self.lock().arbiter.query_state(device).cloned()
    }

    /// # Errors
    ///
    /// Returns [`DeviceNotFoundError`] for unknown devices.
    #[tracing::instrument(skip(self))]
    pub fn turn_on_manual(&self, device: &str) -> Result<(), DeviceNotFoundError> {
        self.lock().arbiter.turn_on_manual(device)
    }

    /// # Errors
    ///
    /// Returns [`DeviceNotFoundError`] for unknown devices.
    #[tracing::instrument(skip(self))]
    pub fn turn_off_manual(&self, device: &str) -> Result<(), DeviceNotFoundError> {
        self.lock().arbiter.turn_off_manual(device)
    }

    /// # Errors
    ///
    /// Returns [`DeviceNotFoundError`] for unknown devices.
    #[tracing::instrument(skip(self))]
    pub fn set_runtime_hours(&self, device: &str, hours: i32) -> Result<(), DeviceNotFoundError> {
        self.lock().arbiter.set_runtime_hours(device, hours)
    }

    /// Normalize and install new settings.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the settings do not validate.
    #[tracing::instrument(skip_all)]
    pub fn load_settings(&self, mut settings: Settings) -> Result<(), ConfigError> {
        settings.normalize();
        self.lock().arbiter.load_settings(settings)?;
        tracing::info!("settings replaced");
        Ok(())
    }

    pub fn status(&self) -> Vec<DeviceStatus> {
        self.lock().arbiter.status()
    }

    pub fn properties(&self) -> Properties {
        self.lock().arbiter.properties()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
