// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::scale::NANOS_PER_MILLI;
use crate::{CanonicalInstant, DecodeError, RawWireTimestamp, normalize};

/// Decodes a raw wire timestamp into a [`CanonicalInstant`].
///
/// The fraction is normalized to nanoseconds and combined with the whole seconds; the fraction
/// is never negative, so instants before the epoch floor their milliseconds toward negative
/// infinity. No calendar is involved and leap seconds do not exist, so every second count that
/// fits the millisecond range decodes, including dates in year 0 and before.
///
/// The function is pure and can be called concurrently from any number of threads.
///
/// # Errors
///
/// Returns an error if the fraction does not fit the scale or the seconds overflow the
/// millisecond range.
///
/// # Examples
///
/// ```
/// use ltz_stamp::{ColumnScale, RawWireTimestamp, decode};
///
/// let instant = decode(RawWireTimestamp::new(1_483_272_000, 123_456_789, ColumnScale::NANOS))?;
/// assert_eq!(instant.epoch_millis(), 1_483_272_000_123);
/// assert_eq!(instant.nanos(), 123_456_789);
///
/// # Ok::<(), ltz_stamp::DecodeError>(())
/// ```
pub fn decode(raw: RawWireTimestamp) -> Result<CanonicalInstant, DecodeError> {
    let nanos = normalize(raw.fraction_units(), raw.scale())
        .map_err(|err| DecodeError::caused_by(raw.to_string(), "fraction does not fit the scale", err))?;

    let epoch_millis = raw
        .integer_seconds()
        .checked_mul(1000)
        .and_then(|millis| millis.checked_add(i64::from(nanos / NANOS_PER_MILLI)))
        .ok_or_else(|| DecodeError::new(raw.to_string(), "seconds overflow the millisecond range"))?;

    Ok(CanonicalInstant::from_parts(epoch_millis, nanos))
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnScale;

    fn raw(seconds: i64, units: u32, scale: u8) -> RawWireTimestamp {
        RawWireTimestamp::new(seconds, units, ColumnScale::new(scale).unwrap())
    }

    #[test]
    fn epoch() {
        let instant = decode(raw(0, 0, 0)).unwrap();
        assert_eq!(instant, CanonicalInstant::UNIX_EPOCH);
    }

    #[test]
    fn before_epoch_with_fraction() {
        let instant = decode(raw(-1, 1, 9)).unwrap();
        assert_eq!(instant.epoch_millis(), -1000);
        assert_eq!(instant.nanos(), 1);

        let instant = decode(raw(-43_201, 1, 3)).unwrap();
        assert_eq!(instant.epoch_millis(), -43_200_999);
        assert_eq!(instant.nanos(), 1_000_000);
    }

    #[test]
    fn year_zero() {
        let instant = decode(raw(-62_167_391_999, 0, 0)).unwrap();
        assert_eq!(instant.epoch_millis(), -62_167_391_999_000);
        assert_eq!(instant.nanos(), 0);
    }

    #[test]
    fn far_past_and_future() {
        // -9999-01-01 and 9999-12-31 in the proleptic Gregorian calendar
        let instant = decode(raw(-377_705_116_800, 5, 1)).unwrap();
        assert_eq!(instant.epoch_millis(), -377_705_116_799_500);

        let instant = decode(raw(253_402_300_799, 999_999, 6)).unwrap();
        assert_eq!(instant.epoch_millis(), 253_402_300_799_999);
        assert_eq!(instant.nanos(), 999_999_000);
    }

    #[test]
    fn rejects_fraction_out_of_range() {
        let error = decode(raw(10, 1_000, 3)).unwrap_err();
        assert_eq!(error.raw(), "{seconds: 10, fraction: 1000, scale: 3}");
        assert_eq!(error.reason(), "fraction does not fit the scale");

        decode(raw(10, 1, 0)).unwrap_err();
    }

    #[test]
    fn rejects_overflow() {
        let error = decode(raw(i64::MIN, 0, 0)).unwrap_err();
        assert_eq!(error.reason(), "seconds overflow the millisecond range");
    }
}
