//! Horizon — the condition under which a switched-on device goes off again.

use serde::{Deserialize, Serialize};

use crate::time::{Timestamp, format_clock};

/// On-state end condition of a device.
///
/// A device is on exactly when its horizon is not [`Off`](Self::Off).
/// Serialized with the legacy integer encoding: `0` off, `-1` indefinite,
/// `-2` until ideal, positive values are epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Horizon {
    #[default]
    Off,
    /// On until some control source switches it off.
    Indefinite,
    /// On until the terrarium reaches the owning rule's ideal temperature.
    UntilIdeal,
    /// On until the given epoch second.
    Until(Timestamp),
}

impl Horizon {
    const RAW_INDEFINITE: i64 = -1;
    const RAW_UNTIL_IDEAL: i64 = -2;

    #[must_use]
    pub fn is_on(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Whether a timed horizon has passed. Off, indefinite and until-ideal
    /// horizons never expire on their own.
    #[must_use]
    pub fn is_expired(self, now: Timestamp) -> bool {
        matches!(self, Self::Until(end) if now >= end)
    }

    /// Legacy integer encoding.
    #[must_use]
    pub fn as_raw(self) -> i64 {
        match self {
            Self::Off => 0,
            Self::Indefinite => Self::RAW_INDEFINITE,
            Self::UntilIdeal => Self::RAW_UNTIL_IDEAL,
            Self::Until(ts) => ts,
        }
    }
}

impl TryFrom<i64> for Horizon {
    type Error = String;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Off),
            Self::RAW_INDEFINITE => Ok(Self::Indefinite),
            Self::RAW_UNTIL_IDEAL => Ok(Self::UntilIdeal),
            ts if ts > 0 => Ok(Self::Until(ts)),
            other => Err(format!("unknown horizon encoding {other}")),
        }
    }
}

impl From<Horizon> for i64 {
    fn from(value: Horizon) -> Self {
        value.as_raw()
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            Self::Indefinite => f.write_str("indefinitely"),
            Self::UntilIdeal => f.write_str("until ideal temperature is reached"),
            Self::Until(ts) => f.write_str(&format_clock(*ts)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_be_on_for_every_horizon_but_off() {
        assert!(!Horizon::Off.is_on());
        assert!(Horizon::Indefinite.is_on());
        assert!(Horizon::UntilIdeal.is_on());
        assert!(Horizon::Until(1).is_on());
    }

    #[test]
    fn should_default_to_off() {
        assert_eq!(Horizon::default(), Horizon::Off);
    }

    #[test]
    fn should_expire_timed_horizon_at_end_time() {
        let h = Horizon::Until(100);
        assert!(!h.is_expired(99));
        assert!(h.is_expired(100));
        assert!(h.is_expired(101));
    }

    #[test]
    fn should_never_expire_untimed_horizons() {
        for h in [Horizon::Off, Horizon::Indefinite, Horizon::UntilIdeal] {
            assert!(!h.is_expired(i64::MAX));
        }
    }

    #[test]
    fn should_use_legacy_integer_encoding() {
        assert_eq!(serde_json::to_string(&Horizon::UntilIdeal).unwrap(), "-2");
        let parsed: Horizon = serde_json::from_str("1610100030").unwrap();
        assert_eq!(parsed, Horizon::Until(1_610_100_030));
        assert!(serde_json::from_str::<Horizon>("-3").is_err());
    }

    #[test]
    fn should_display_human_readable_text() {
        assert_eq!(Horizon::Off.to_string(), "off");
        assert_eq!(Horizon::Indefinite.to_string(), "indefinitely");
        assert_eq!(
            Horizon::UntilIdeal.to_string(),
            "until ideal temperature is reached"
        );
    }
}
