use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PercentError {
    #[error("percentage must be between 0 and 100, got {0}")]
    OutOfRange(u32),
}

/// Whole-number percentage in `[0, 100]`, used for scores and mastery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u8")]
pub struct Percent(u8);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const FULL: Percent = Percent(100);

    /// # Errors
    ///
    /// Returns `PercentError::OutOfRange` for values above 100.
    pub fn new(value: u32) -> Result<Self, PercentError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(PercentError::OutOfRange(value))
    }

    /// Clamps any value above 100 down to 100.
    #[must_use]
    pub fn saturating(value: u32) -> Self {
        Self(u8::try_from(value.min(100)).unwrap_or(100))
    }

    /// `round(numerator / denominator * 100)`, rounding halves up.
    ///
    /// A zero denominator yields 0.
    #[must_use]
    pub fn from_ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            return Self::ZERO;
        }
        let rounded = div_round_half_up(numerator.saturating_mul(100), denominator);
        Self::saturating(u32::try_from(rounded).unwrap_or(u32::MAX))
    }

    /// Cumulative rolling average after one more sample:
    /// `round((self * count + sample) / (count + 1))`.
    #[must_use]
    pub fn rolling_average(self, count: u32, sample: Percent) -> Self {
        let count = u64::from(count);
        let total = u64::from(self.0) * count + u64::from(sample.0);
        let rounded = div_round_half_up(total, count + 1);
        Self::saturating(u32::try_from(rounded).unwrap_or(u32::MAX))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

fn div_round_half_up(numerator: u64, denominator: u64) -> u64 {
    (numerator.saturating_mul(2) + denominator) / (denominator * 2)
}

impl TryFrom<u32> for Percent {
    type Error = PercentError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percent> for u8 {
    fn from(value: Percent) -> Self {
        value.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
