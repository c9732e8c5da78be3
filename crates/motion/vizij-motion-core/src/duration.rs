//! Motion durations: absolute seconds or a share of an enclosing total.

use std::fmt;
use std::ops::{Div, DivAssign, Mul, MulAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// A timed quantity.
///
/// `Relative` fractions only mean something inside a parent whose total is
/// being resolved; an `Absolute` stands on its own. Negative payloads are a
/// caller error and are treated as zero wherever durations are combined.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Duration {
    /// Seconds.
    Absolute(f64),
    /// Fraction of the parent's total.
    Relative(f64),
}

impl Duration {
    pub const ZERO: Duration = Duration::Absolute(0.0);

    #[inline]
    pub fn secs(seconds: f64) -> Self {
        Self::Absolute(seconds)
    }

    #[inline]
    pub fn relative(fraction: f64) -> Self {
        Self::Relative(fraction)
    }

    /// Seconds, if this is an absolute duration.
    #[inline]
    pub fn absolute_seconds(&self) -> Option<f64> {
        match self {
            Self::Absolute(s) => Some(*s),
            Self::Relative(_) => None,
        }
    }

    /// Fraction, if this is a relative duration.
    #[inline]
    pub fn relative_fraction(&self) -> Option<f64> {
        match self {
            Self::Relative(f) => Some(*f),
            Self::Absolute(_) => None,
        }
    }

    /// Multiply the payload, keeping the tag.
    #[inline]
    pub fn scale(self, by: f64) -> Self {
        match self {
            Self::Absolute(s) => Self::Absolute(s * by),
            Self::Relative(f) => Self::Relative(f * by),
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Absolute(v) | Self::Relative(v) => *v <= 0.0,
        }
    }
}

impl Mul<f64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: f64) -> Duration {
        self.scale(rhs)
    }
}

impl Div<f64> for Duration {
    type Output = Duration;

    fn div(self, rhs: f64) -> Duration {
        self.scale(rhs.recip())
    }
}

impl MulAssign<f64> for Duration {
    fn mul_assign(&mut self, rhs: f64) {
        *self = self.scale(rhs);
    }
}

impl DivAssign<f64> for Duration {
    fn div_assign(&mut self, rhs: f64) {
        *self = self.scale(rhs.recip());
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Self::Absolute(d.as_secs_f64())
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(s) => write!(f, "{s}s"),
            Self::Relative(r) => write!(f, "{}%", r * 100.0),
        }
    }
}

impl FromStr for Duration {
    type Err = MotionError;

    /// Accepts `1.5s`, `250ms` and `25%`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (number, build): (&str, fn(f64) -> Duration) =
            if let Some(n) = trimmed.strip_suffix("ms") {
                (n, |v| Duration::Absolute(v / 1000.0))
            } else if let Some(n) = trimmed.strip_suffix('s') {
                (n, Duration::Absolute)
            } else if let Some(n) = trimmed.strip_suffix('%') {
                (n, |v| Duration::Relative(v / 100.0))
            } else {
                return Err(MotionError::duration(s, "expected a unit: s, ms or %"));
            };
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| MotionError::duration(s, "not a number"))?;
        if !value.is_finite() || value < 0.0 {
            return Err(MotionError::duration(s, "must be finite and non-negative"));
        }
        Ok(build(value))
    }
}
