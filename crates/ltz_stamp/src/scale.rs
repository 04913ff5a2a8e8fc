// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};

use crate::DecodeError;

pub(crate) const NANOS_PER_MILLI: u32 = 1_000_000;

const POW10: [u32; 10] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
];

/// The number of fractional-second digits a column retains, between 0 and 9.
///
/// The scale is fixed per column for the lifetime of a result set. Digits beyond the scale are
/// dropped when a value is stored; the kept digits are never rounded.
///
/// # Examples
///
/// ```
/// use ltz_stamp::ColumnScale;
///
/// let scale = ColumnScale::new(3)?;
/// assert_eq!(scale.truncate_nanos(999_999_999), 999_000_000);
/// assert_eq!(ColumnScale::SECONDS.truncate_nanos(999_999_999), 0);
///
/// # Ok::<(), ltz_stamp::DecodeError>(())
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnScale(u8);

impl ColumnScale {
    /// Whole seconds, no fractional digits.
    pub const SECONDS: Self = Self(0);

    /// Millisecond precision.
    pub const MILLIS: Self = Self(3);

    /// Microsecond precision.
    pub const MICROS: Self = Self(6);

    /// Nanosecond precision, the largest supported scale.
    pub const NANOS: Self = Self(9);

    /// Creates a scale with the given number of fractional digits.
    ///
    /// # Errors
    ///
    /// Returns an error if `digits` is greater than 9.
    pub fn new(digits: u8) -> Result<Self, DecodeError> {
        if digits > Self::NANOS.0 {
            return Err(DecodeError::new(digits.to_string(), "scale must be between 0 and 9"));
        }

        Ok(Self(digits))
    }

    /// Returns all supported scales, from whole seconds to nanoseconds.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::SECONDS.0..=Self::NANOS.0).map(Self)
    }

    /// Returns the number of fractional digits.
    #[must_use]
    pub const fn digits(self) -> u8 {
        self.0
    }

    /// Returns `10^scale`, the number of fraction units in one second.
    #[must_use]
    pub const fn units_per_second(self) -> u32 {
        POW10[self.0 as usize]
    }

    /// Returns `10^(9 - scale)`, the number of nanoseconds in one fraction unit.
    #[must_use]
    pub const fn nanos_per_unit(self) -> u32 {
        POW10[(Self::NANOS.0 - self.0) as usize]
    }

    /// Drops the nanosecond digits this scale does not retain.
    ///
    /// `nanos` is expected to be below one second.
    #[must_use]
    pub const fn truncate_nanos(self, nanos: u32) -> u32 {
        nanos - nanos % self.nanos_per_unit()
    }

    /// Expresses `nanos` in fraction units of this scale, dropping the digits the scale does not
    /// retain.
    #[must_use]
    pub const fn units_from_nanos(self, nanos: u32) -> u32 {
        nanos / self.nanos_per_unit()
    }
}

impl Default for ColumnScale {
    /// Columns declared without an explicit scale keep nanoseconds.
    fn default() -> Self {
        Self::NANOS
    }
}

impl Display for ColumnScale {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for ColumnScale {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Converts a fraction expressed in units of `scale` into nanoseconds within the second.
///
/// The fraction must satisfy `0 <= fraction_units < 10^scale`; anything else is rejected rather
/// than clamped.
///
/// # Errors
///
/// Returns an error if `fraction_units` does not fit the scale.
///
/// # Examples
///
/// ```
/// use ltz_stamp::{ColumnScale, normalize};
///
/// assert_eq!(normalize(123, ColumnScale::MILLIS)?, 123_000_000);
/// assert_eq!(normalize(0, ColumnScale::SECONDS)?, 0);
/// normalize(1_000, ColumnScale::MILLIS).unwrap_err();
///
/// # Ok::<(), ltz_stamp::DecodeError>(())
/// ```
pub fn normalize(fraction_units: u32, scale: ColumnScale) -> Result<u32, DecodeError> {
    if fraction_units >= scale.units_per_second() {
        return Err(DecodeError::new(
            format!("{fraction_units} at scale {scale}"),
            "fraction does not fit the scale",
        ));
    }

    Ok(fraction_units * scale.nanos_per_unit())
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_out_of_range() {
        ColumnScale::new(10).unwrap_err();
        assert_eq!(ColumnScale::new(9).unwrap(), ColumnScale::NANOS);
        assert_eq!(ColumnScale::try_from(0).unwrap(), ColumnScale::SECONDS);
    }

    #[test]
    fn all_scales() {
        let digits: Vec<u8> = ColumnScale::all().map(ColumnScale::digits).collect();
        assert_eq!(digits, (0..=9).collect::<Vec<_>>());
    }

    #[test]
    fn units_and_nanos_are_complementary() {
        for scale in ColumnScale::all() {
            assert_eq!(
                u64::from(scale.units_per_second()) * u64::from(scale.nanos_per_unit()),
                1_000_000_000
            );
        }
    }

    #[test]
    fn truncation_is_not_rounding() {
        assert_eq!(ColumnScale::SECONDS.truncate_nanos(999_999_999), 0);
        assert_eq!(ColumnScale::MILLIS.truncate_nanos(999_999_999), 999_000_000);
        assert_eq!(ColumnScale::new(1).unwrap().truncate_nanos(150_000_000), 100_000_000);
        assert_eq!(ColumnScale::NANOS.truncate_nanos(999_999_999), 999_999_999);
    }

    #[test]
    fn units_from_nanos_truncates() {
        assert_eq!(ColumnScale::MILLIS.units_from_nanos(123_999_999), 123);
        assert_eq!(ColumnScale::SECONDS.units_from_nanos(999_999_999), 0);
        assert_eq!(ColumnScale::NANOS.units_from_nanos(1), 1);
    }

    #[test]
    fn normalize_scales_units() {
        assert_eq!(normalize(1, ColumnScale::new(1).unwrap()).unwrap(), 100_000_000);
        assert_eq!(normalize(999, ColumnScale::MILLIS).unwrap(), 999_000_000);
        assert_eq!(normalize(999_999_999, ColumnScale::NANOS).unwrap(), 999_999_999);
        assert_eq!(normalize(0, ColumnScale::SECONDS).unwrap(), 0);
    }

    #[test]
    fn normalize_rejects_oversized_fraction() {
        let error = normalize(1, ColumnScale::SECONDS).unwrap_err();
        assert_eq!(error.raw(), "1 at scale 0");

        normalize(1_000_000, ColumnScale::MICROS).unwrap_err();
    }

    #[test]
    fn default_is_nanos() {
        assert_eq!(ColumnScale::default(), ColumnScale::NANOS);
        assert_eq!(ColumnScale::MICROS.to_string(), "6");
    }
}
