//! Time spans read from the configuration file
//!
//! Accepted spellings, tried in order:
//! - empty text or absent key: zero
//! - a human readable span understood by `humantime` ("20s", "10m", "1h30m")
//! - an integer: that many seconds
//! - a float, exponent notation included: that many (fractional) seconds
//!
//! Spans are always written back in the human readable form, so a value read
//! as `"150"` is saved as `"2m30s"`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("invalid duration {0:?}: expected a span like \"20s\" or a number of seconds")]
    Format(String),
    #[error("invalid duration {0:?}: must be a finite, non-negative number of seconds")]
    OutOfRange(String),
}

/// A non-negative span of time with lenient parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HumanDuration(Duration);

impl HumanDuration {
    pub const ZERO: Self = Self(Duration::ZERO);

    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn get(self) -> Duration {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    fn from_secs_f64(text: &str, secs: f64) -> Result<Self, DurationError> {
        Duration::try_from_secs_f64(secs)
            .map(Self)
            .map_err(|_| DurationError::OutOfRange(text.to_string()))
    }
}

impl From<Duration> for HumanDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl From<HumanDuration> for Duration {
    fn from(duration: HumanDuration) -> Self {
        duration.0
    }
}

impl FromStr for HumanDuration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Ok(Self::ZERO);
        }
        if let Ok(duration) = humantime::parse_duration(text) {
            return Ok(Self(duration));
        }
        if let Ok(secs) = text.parse::<i64>() {
            return u64::try_from(secs)
                .map(Self::from_secs)
                .map_err(|_| DurationError::OutOfRange(text.to_string()));
        }
        // i64 parsing rejects exponent notation ("1.5e2"), floats pick it up
        match text.parse::<f64>() {
            Ok(secs) => Self::from_secs_f64(text, secs),
            Err(_) => Err(DurationError::Format(text.to_string())),
        }
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = humantime::format_duration(self.0).to_string();
        f.write_str(&formatted.replace(' ', ""))
    }
}

impl Serialize for HumanDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(HumanDurationVisitor)
    }
}

struct HumanDurationVisitor;

impl<'de> Visitor<'de> for HumanDurationVisitor {
    type Value = HumanDuration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration such as \"20s\" or a number of seconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(HumanDuration::from_secs(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(HumanDuration::from_secs)
            .map_err(|_| E::custom(DurationError::OutOfRange(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        HumanDuration::from_secs_f64(&v.to_string(), v).map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(HumanDuration::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(HumanDuration::ZERO)
    }
}
