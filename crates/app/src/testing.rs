//! Test doubles for the ports.

use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use terrarium_domain::device::DeviceRegistry;
use terrarium_domain::event::StateChange;
use terrarium_domain::settings::Settings;

use crate::arbiter::Arbiter;
use crate::ports::{Clock, TemperatureProvider, TraceSink};

/// 2021-01-08 at the given wall-clock time.
pub fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 1, 8)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

pub fn arbiter_with(settings: Settings) -> Arbiter<RecordingSink> {
    Arbiter::new(DeviceRegistry::default(), settings, RecordingSink::default()).unwrap()
}

#[derive(Default)]
pub struct RecordingSink {
    changes: Mutex<Vec<StateChange>>,
}

impl RecordingSink {
    pub fn changes(&self) -> Vec<StateChange> {
        self.changes.lock().unwrap().clone()
    }
}

impl TraceSink for RecordingSink {
    fn record(&self, change: StateChange) {
        self.changes.lock().unwrap().push(change);
    }
}

pub struct ManualClock(Mutex<NaiveDateTime>);

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
pub struct FixedSensor {
    reading: Mutex<Option<i32>>,
    reads: Mutex<usize>,
}

impl FixedSensor {
    pub fn set(&self, reading: Option<i32>) {
        *self.reading.lock().unwrap() = reading;
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }
}

impl TemperatureProvider for FixedSensor {
    fn terrarium_temperature(&self) -> Option<i32> {
        *self.reads.lock().unwrap() += 1;
        *self.reading.lock().unwrap()
    }
}
