//! Axis position scaling
//!
//! Raw axis magnitudes cover half the unsigned 16-bit range per
//! direction. [`scale_position`] maps them onto the caller-configured
//! output range, rounding up so the smallest deflection never scales
//! to zero.

use std::str::FromStr;

/// Half of the unsigned 16-bit axis range; the divisor of the scaling
/// formula.
const RAW_AXIS_RANGE: u32 = 32768;

/// Errors raised when validating a new maximum axis position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("maximum axis position '{0}' is not a valid integer, expected a value between 1 and 65535")]
    NotAnInteger(String),

    #[error("cannot change maximum axis position to {0}, the value must be at least 1")]
    TooLow(i64),

    #[error("cannot change maximum axis position to {0}, the device limits positions to 65535")]
    TooHigh(i64),
}

/// Upper bound of the scaled axis range, validated to `1..=65535`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxAxisPosition(u16);

impl MaxAxisPosition {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 65535;

    /// Validates a caller-supplied maximum.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TooLow`] below 1, [`ConfigError::TooHigh`] above
    /// 65535. A rejected value leaves whatever maximum was previously
    /// configured untouched.
    pub fn new(value: i64) -> Result<Self, ConfigError> {
        if value < Self::MIN {
            Err(ConfigError::TooLow(value))
        } else if value > Self::MAX {
            Err(ConfigError::TooHigh(value))
        } else {
            Ok(Self(value as u16))
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl Default for MaxAxisPosition {
    fn default() -> Self {
        Self(32768)
    }
}

impl FromStr for MaxAxisPosition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| ConfigError::NotAnInteger(s.to_string()))?;
        Self::new(value)
    }
}

/// Scales a raw deflection magnitude into `1..=max`.
///
/// `scale(raw) = ceil(max * raw / 32768)` for `raw` in `[1, 32768]`
/// (32768 is the full negative deflection after mirroring).
pub fn scale_position(magnitude: u16, max: MaxAxisPosition) -> u16 {
    let scaled = (u32::from(max.get()) * u32::from(magnitude)).div_ceil(RAW_AXIS_RANGE);
    // bounded by max * 32768 / 32768 = max, which fits u16
    scaled as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_maximum_matches_raw_range() {
        assert_eq!(MaxAxisPosition::default().get(), 32768);
    }

    #[test]
    fn accepts_values_inside_the_bounds() {
        assert_eq!(MaxAxisPosition::new(10000).unwrap().get(), 10000);
        assert_eq!(MaxAxisPosition::new(1).unwrap().get(), 1);
        assert_eq!(MaxAxisPosition::new(65535).unwrap().get(), 65535);
    }

    #[test]
    fn rejects_values_outside_the_bounds() {
        assert_eq!(MaxAxisPosition::new(-100), Err(ConfigError::TooLow(-100)));
        assert_eq!(MaxAxisPosition::new(0), Err(ConfigError::TooLow(0)));
        assert_eq!(
            MaxAxisPosition::new(100000),
            Err(ConfigError::TooHigh(100000))
        );
    }

    #[test]
    fn rejects_non_numeric_strings() {
        assert_eq!(
            "non-numeric-value".parse::<MaxAxisPosition>(),
            Err(ConfigError::NotAnInteger("non-numeric-value".to_string()))
        );
        assert_eq!(
            "10000".parse::<MaxAxisPosition>(),
            MaxAxisPosition::new(10000)
        );
    }

    #[test]
    fn scaling_is_identity_at_the_default_maximum() {
        let max = MaxAxisPosition::default();
        assert_eq!(scale_position(1, max), 1);
        assert_eq!(scale_position(21846, max), 21846);
        assert_eq!(scale_position(32767, max), 32767);
        assert_eq!(scale_position(32768, max), 32768);
    }

    #[test]
    fn scaling_rounds_up() {
        let max = MaxAxisPosition::new(100).unwrap();
        // 100 * 21846 / 32768 = 66.67.. -> 67
        assert_eq!(scale_position(21846, max), 67);
        // the smallest deflection never scales to zero
        assert_eq!(scale_position(1, max), 1);
    }

    proptest! {
        #[test]
        fn scaling_matches_the_ceiling_formula(raw in 1u16..=32767, max in 1u16..=65535) {
            let max_position = MaxAxisPosition::new(i64::from(max)).unwrap();
            let scaled = scale_position(raw, max_position);

            // f64 is exact for products below 2^53
            let expected = (f64::from(max) * f64::from(raw) / 32768.0).ceil();
            prop_assert_eq!(f64::from(scaled), expected);
            prop_assert!(scaled >= 1);
            prop_assert!(scaled <= max);
        }

        #[test]
        fn mirrored_magnitudes_scale_independently(magnitude in 32768u32..=65535, max in 1u16..=65535) {
            let max_position = MaxAxisPosition::new(i64::from(max)).unwrap();

            // negative deflections scale their mirrored distance from
            // the wrap point, 1..=32768
            let reduced = (65536 - magnitude) as u16;
            let scaled = scale_position(reduced, max_position);

            let expected = (f64::from(max) * f64::from(reduced) / 32768.0).ceil();
            prop_assert_eq!(f64::from(scaled), expected);
            prop_assert!(scaled >= 1);
            prop_assert!(scaled <= max);
        }
    }
}
