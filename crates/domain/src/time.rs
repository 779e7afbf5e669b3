//! Time helpers.
//!
//! The controller never reads the clock itself: callers inject a
//! [`NaiveDateTime`] (local wall-clock time) per tick. Absolute end times are
//! expressed as epoch seconds derived from that value.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Epoch seconds, used for absolute device end times and rule delays.
pub type Timestamp = i64;

/// Minutes in a day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Convert a wall-clock value to epoch seconds.
#[must_use]
pub fn epoch_seconds(now: NaiveDateTime) -> Timestamp {
    now.and_utc().timestamp()
}

/// Minute of the day (`0..1440`) for a wall-clock value.
#[must_use]
pub fn minute_of_day(now: NaiveDateTime) -> u32 {
    now.hour() * 60 + now.minute()
}

/// Drop seconds and sub-seconds.
#[must_use]
pub fn start_of_minute(now: NaiveDateTime) -> NaiveDateTime {
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// Format an epoch timestamp as `HH:MM:SS`.
#[must_use]
pub fn format_clock(ts: Timestamp) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map_or_else(|| ts.to_string(), |dt| dt.format("%H:%M:%S").to_string())
}

/// A time of day with minute resolution, written `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Midnight, `00:00`.
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// Build a time of day, `None` if out of range.
    #[must_use]
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    #[must_use]
    pub fn hour(self) -> u8 {
        self.hour
    }

    #[must_use]
    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Minutes since midnight.
    #[must_use]
    pub fn minutes(self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidTimeOfDay(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour = hour.parse().map_err(|_| invalid())?;
        let minute = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 1, 8)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn should_compute_minute_of_day() {
        assert_eq!(minute_of_day(at(0, 0, 0)), 0);
        assert_eq!(minute_of_day(at(10, 30, 59)), 630);
        assert_eq!(minute_of_day(at(23, 59, 0)), MINUTES_PER_DAY - 1);
    }

    #[test]
    fn should_advance_epoch_seconds_with_wall_clock() {
        assert_eq!(epoch_seconds(at(11, 0, 30)) - epoch_seconds(at(11, 0, 0)), 30);
    }

    #[test]
    fn should_truncate_to_start_of_minute() {
        assert_eq!(start_of_minute(at(11, 15, 42)), at(11, 15, 0));
    }

    #[test]
    fn should_format_epoch_as_clock_time() {
        assert_eq!(format_clock(epoch_seconds(at(11, 30, 5))), "11:30:05");
    }

    #[test]
    fn should_parse_time_of_day() {
        let t: TimeOfDay = "07:05".parse().unwrap();
        assert_eq!(t.hour(), 7);
        assert_eq!(t.minute(), 5);
        assert_eq!(t.minutes(), 425);
        assert_eq!(t.to_string(), "07:05");
    }

    #[test]
    fn should_reject_out_of_range_time_of_day() {
        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("10:60".parse::<TimeOfDay>().is_err());
        assert!("1030".parse::<TimeOfDay>().is_err());
        assert!("".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn should_serialize_time_of_day_as_string() {
        let t = TimeOfDay::new(22, 15).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"22:15\"");
        let parsed: TimeOfDay = serde_json::from_str("\"22:15\"").unwrap();
        assert_eq!(parsed, t);
    }
}
