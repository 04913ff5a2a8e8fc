// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Conversion of every wire encoding into the shared [`RawWireTimestamp`] form.
//!
//! Text and columnar values are first turned into a combined integer of fraction units
//! (`seconds * 10^scale + fraction`), which is then split with floor semantics. There is exactly
//! one split and one decode routine, so the two result encodings cannot drift apart.

use crate::{CanonicalInstant, ColumnScale, DecodeError, RawWireTimestamp, WireValue, decode};

/// The longest integer part a textual value may carry.
const MAX_INTEGER_DIGITS: usize = 19;

/// Converts a wire value into the normalized raw form at the given column scale.
///
/// # Errors
///
/// Returns an error if the value is not a valid representation at `scale`: non-numeric text,
/// a negative or oversized split fraction, or seconds outside the 64-bit range.
///
/// # Examples
///
/// ```
/// use ltz_stamp::{ColumnScale, WireValue, to_raw};
///
/// let scale = ColumnScale::MILLIS;
/// let text = to_raw(WireValue::Text("-1.5"), scale)?;
/// let packed = to_raw(WireValue::Packed(-1_500), scale)?;
///
/// assert_eq!(text, packed);
/// assert_eq!(text.integer_seconds(), -2);
/// assert_eq!(text.fraction_units(), 500);
///
/// # Ok::<(), ltz_stamp::DecodeError>(())
/// ```
pub fn to_raw(value: WireValue<'_>, scale: ColumnScale) -> Result<RawWireTimestamp, DecodeError> {
    match value {
        WireValue::Text(text) => {
            let units = parse_decimal(text, scale)?;
            split_units(units, scale).ok_or_else(|| DecodeError::new(text, "seconds overflow the 64-bit range"))
        }
        WireValue::Packed(units) => split_units(i128::from(units), scale)
            .ok_or_else(|| DecodeError::new(value.to_string(), "seconds overflow the 64-bit range")),
        WireValue::Split {
            epoch_seconds,
            fraction_units,
        } => match u32::try_from(fraction_units) {
            Ok(units) if units < scale.units_per_second() => Ok(RawWireTimestamp::new(epoch_seconds, units, scale)),
            _ => Err(DecodeError::new(value.to_string(), "fraction does not fit the scale")),
        },
    }
}

/// Decodes a wire value of either encoding into a [`CanonicalInstant`].
///
/// This is [`to_raw`] followed by [`decode`], the only decode path of the crate.
///
/// # Errors
///
/// Returns an error if the value is malformed, see [`to_raw`] and [`decode`].
///
/// # Examples
///
/// ```
/// use ltz_stamp::{ColumnScale, WireValue, decode_value};
///
/// let scale = ColumnScale::NANOS;
/// let text = decode_value(WireValue::Text("1483272000.123456789"), scale)?;
/// let split = decode_value(
///     WireValue::Split {
///         epoch_seconds: 1_483_272_000,
///         fraction_units: 123_456_789,
///     },
///     scale,
/// )?;
///
/// assert_eq!(text, split);
/// assert_eq!(text.epoch_millis(), 1_483_272_000_123);
///
/// # Ok::<(), ltz_stamp::DecodeError>(())
/// ```
pub fn decode_value(value: WireValue<'_>, scale: ColumnScale) -> Result<CanonicalInstant, DecodeError> {
    decode(to_raw(value, scale)?)
}

/// Splits a combined count of fraction units into whole seconds and a non-negative remainder.
fn split_units(units: i128, scale: ColumnScale) -> Option<RawWireTimestamp> {
    let per_second = i128::from(scale.units_per_second());
    let seconds = i64::try_from(units.div_euclid(per_second)).ok()?;
    let fraction = u32::try_from(units.rem_euclid(per_second)).ok()?;

    Some(RawWireTimestamp::new(seconds, fraction, scale))
}

/// Parses a signed decimal number of seconds into a count of fraction units at `scale`.
///
/// Fractional digits beyond the scale are dropped toward the past: the result is the floor of
/// the exact value, so `-0.0001` at scale 3 becomes `-1` unit.
fn parse_decimal(text: &str, scale: ColumnScale) -> Result<i128, DecodeError> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    if integer.is_empty() || !integer.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::new(text, "seconds are not numeric"));
    }
    if integer.trim_start_matches('0').len() > MAX_INTEGER_DIGITS {
        return Err(DecodeError::new(text, "seconds overflow the 64-bit range"));
    }
    if let Some(fraction) = fraction
        && (fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(DecodeError::new(text, "fraction is not numeric"));
    }
    let fraction = fraction.unwrap_or_default();

    let integer: i128 = integer
        .parse()
        .map_err(|err| DecodeError::caused_by(text, "seconds are not numeric", err))?;

    let digits = usize::from(scale.digits());
    let (kept, dropped) = fraction.split_at(fraction.len().min(digits));

    // right-pad the kept digits up to the scale
    let mut units = kept.bytes().fold(0_i128, |acc, b| acc * 10 + i128::from(b - b'0'));
    for _ in kept.len()..digits {
        units *= 10;
    }

    let magnitude = integer * i128::from(scale.units_per_second()) + units;
    let has_dropped = dropped.bytes().any(|b| b != b'0');

    Ok(match (negative, has_dropped) {
        (false, _) => magnitude,
        (true, false) => -magnitude,
        (true, true) => -magnitude - 1,
    })
}
