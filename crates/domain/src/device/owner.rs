//! Owner — the control source that currently holds a device.

use serde::{Deserialize, Serialize};

/// Maximum number of temperature rules.
pub const MAX_RULES: usize = 5;

/// One-based temperature rule number, `1..=5`, i.e. the rule's priority
/// position after sorting by threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RuleNr(u8);

impl RuleNr {
    /// `None` outside `1..=5`.
    #[must_use]
    pub fn new(nr: u8) -> Option<Self> {
        (1..=MAX_RULES).contains(&usize::from(nr)).then_some(Self(nr))
    }

    /// Rule number for a zero-based position in the sorted rule list.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index + 1).ok().and_then(Self::new)
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position in the sorted rule list.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0) - 1
    }
}

impl TryFrom<u8> for RuleNr {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("rule number {value} out of range"))
    }
}

impl From<RuleNr> for u8 {
    fn from(value: RuleNr) -> Self {
        value.0
    }
}

impl std::fmt::Display for RuleNr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Which control source has the exclusive right to change a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "rule", rename_all = "snake_case")]
pub enum Owner {
    /// Free for any engine to claim.
    #[default]
    NotControlled,
    TemperatureRule(RuleNr),
    SprayerRule,
    MistRule,
    Timer,
    Manual,
}

impl Owner {
    #[must_use]
    pub fn is_temperature_rule(self) -> bool {
        matches!(self, Self::TemperatureRule(_))
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotControlled => f.write_str("free"),
            Self::TemperatureRule(nr) => write!(f, "Temp Rule {nr}"),
            Self::SprayerRule => f.write_str("Sprayer Rule"),
            Self::MistRule => f.write_str("Mist Rule"),
            Self::Timer => f.write_str("Timer"),
            Self::Manual => f.write_str("Manual"),
        }
    }
}
