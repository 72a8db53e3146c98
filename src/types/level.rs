// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output level type for dimmer control.
//!
//! RadioRA outputs report and accept levels as a percentage with an optional
//! fractional part (`~OUTPUT,5,1,42.50`). [`Level`] keeps the decimal value
//! and guarantees it stays within 0-100.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Output level as a percentage (0-100), fractional values allowed.
///
/// # Examples
///
/// ```
/// use radiora_lib::types::Level;
///
/// let level = Level::new(75.0).unwrap();
/// assert_eq!(level.value(), 75.0);
/// assert_eq!(level.to_string(), "75");
///
/// let level: Level = "42.50".parse().unwrap();
/// assert_eq!(level.to_string(), "42.5");
///
/// assert!(Level::new(100.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Level(f64);

impl Level {
    /// Output off (0%).
    pub const OFF: Self = Self(0.0);

    /// Output at full brightness (100%).
    pub const FULL: Self = Self(100.0);

    /// Creates a new level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is outside 0-100 or not finite.
    pub fn new(value: f64) -> Result<Self, ValueError> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(ValueError::OutOfRange {
                min: 0.0,
                max: 100.0,
                actual: value,
            });
        }
        Ok(Self(value))
    }

    /// Creates a level, clamping to the valid range.
    ///
    /// `NaN` maps to [`Level::OFF`].
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::OFF;
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Returns true if the output is on at any level.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.0 > 0.0
    }

    /// Returns the level rounded to a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rounded(&self) -> u8 {
        // Safe: the value is always within 0-100
        self.0.round() as u8
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Level {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| ValueError::InvalidLevel(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<f64> for Level {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<u8> for Level {
    fn from(value: u8) -> Self {
        Self::clamped(f64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_valid_values() {
        assert_eq!(Level::new(0.0).unwrap(), Level::OFF);
        assert_eq!(Level::new(100.0).unwrap(), Level::FULL);
        assert!((Level::new(42.5).unwrap().value() - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn level_invalid_values() {
        assert!(Level::new(-0.1).is_err());
        assert!(Level::new(100.01).is_err());
        assert!(Level::new(f64::NAN).is_err());
        assert!(Level::new(f64::INFINITY).is_err());
    }

    #[test]
    fn level_clamped() {
        assert_eq!(Level::clamped(150.0), Level::FULL);
        assert_eq!(Level::clamped(-3.0), Level::OFF);
        assert_eq!(Level::clamped(f64::NAN), Level::OFF);
    }

    #[test]
    fn level_display_drops_trailing_zero() {
        assert_eq!(Level::new(80.0).unwrap().to_string(), "80");
        assert_eq!(Level::new(42.5).unwrap().to_string(), "42.5");
        assert_eq!(Level::OFF.to_string(), "0");
    }

    #[test]
    fn level_parse() {
        assert_eq!("42.00".parse::<Level>().unwrap().to_string(), "42");
        assert_eq!("7".parse::<Level>().unwrap().rounded(), 7);
        assert!(matches!(
            "abc".parse::<Level>(),
            Err(ValueError::InvalidLevel(_))
        ));
        assert!(matches!(
            "101".parse::<Level>(),
            Err(ValueError::OutOfRange { .. })
        ));
    }

    #[test]
    fn level_on_and_rounding() {
        assert!(!Level::OFF.is_on());
        assert!(Level::new(0.5).unwrap().is_on());
        assert_eq!(Level::new(49.6).unwrap().rounded(), 50);
    }

    #[test]
    fn level_from_u8() {
        assert_eq!(Level::from(80), Level::new(80.0).unwrap());
        assert_eq!(Level::from(200), Level::FULL);
    }
}
