// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};

use jiff::Timestamp;

use crate::scale::NANOS_PER_MILLI;
use crate::{ColumnScale, RawWireTimestamp, decode};

/// A decoded, time zone invariant point in time.
///
/// The instant is expressed as milliseconds since the Unix epoch plus the full nanosecond
/// remainder within the second. Both values are computed solely from the wire value: they are
/// identical no matter which display time zone the session or the client process uses.
///
/// Two instants are equal if and only if both fields match exactly.
///
/// # Examples
///
/// ```
/// use ltz_stamp::{ColumnScale, WireValue, decode_value};
///
/// let instant = decode_value(WireValue::Text("-0.999999999"), ColumnScale::NANOS)?;
/// assert_eq!(instant.epoch_millis(), -1000);
/// assert_eq!(instant.nanos(), 1);
/// assert_eq!(instant.epoch_seconds(), -1);
///
/// # Ok::<(), ltz_stamp::DecodeError>(())
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CanonicalInstant {
    epoch_millis: i64,
    nanos: u32,
}

impl CanonicalInstant {
    /// The Unix epoch, `1970-01-01 00:00:00 UTC`.
    pub const UNIX_EPOCH: Self = Self { epoch_millis: 0, nanos: 0 };

    /// Builds an instant from whole seconds since the epoch and nanoseconds within the second.
    ///
    /// Returns `None` if `nanos` is not below one second or the milliseconds overflow.
    #[must_use]
    pub fn from_epoch_seconds(seconds: i64, nanos: u32) -> Option<Self> {
        decode(RawWireTimestamp::new(seconds, nanos, ColumnScale::NANOS)).ok()
    }

    pub(crate) const fn from_parts(epoch_millis: i64, nanos: u32) -> Self {
        Self { epoch_millis, nanos }
    }

    /// Builds an instant from its two fields, checking that they describe the same point in time.
    ///
    /// Returns `None` if `nanos` is not below one second or the sub-second part of
    /// `epoch_millis` differs from the milliseconds in `nanos`.
    #[must_use]
    pub fn from_parts_checked(epoch_millis: i64, nanos: u32) -> Option<Self> {
        if nanos >= 1_000_000_000 || epoch_millis.rem_euclid(1000) != i64::from(nanos / NANOS_PER_MILLI) {
            return None;
        }
        Some(Self { epoch_millis, nanos })
    }

    /// Returns the number of milliseconds since the Unix epoch.
    ///
    /// The sub-millisecond part of the fraction is floored, so instants before the epoch
    /// round toward negative infinity.
    #[must_use]
    pub const fn epoch_millis(self) -> i64 {
        self.epoch_millis
    }

    /// Returns the nanoseconds within the second, between 0 and 999 999 999.
    #[must_use]
    pub const fn nanos(self) -> u32 {
        self.nanos
    }

    /// Returns the number of whole seconds since the Unix epoch.
    #[must_use]
    pub const fn epoch_seconds(self) -> i64 {
        self.epoch_millis.div_euclid(1000)
    }

    /// Converts the instant into a [`jiff::Timestamp`].
    ///
    /// Returns `None` if the instant lies outside the range `jiff` supports
    /// (years -9999 through 9999).
    #[must_use]
    pub fn to_timestamp(self) -> Option<Timestamp> {
        let nanos = i32::try_from(self.nanos).ok()?;
        Timestamp::new(self.epoch_seconds(), nanos).ok()
    }
}

impl From<Timestamp> for CanonicalInstant {
    fn from(value: Timestamp) -> Self {
        let mut seconds = value.as_second();
        let mut nanos = value.subsec_nanosecond();

        // jiff keeps the sign of the fraction aligned with the seconds
        if nanos < 0 {
            seconds -= 1;
            nanos += 1_000_000_000;
        }

        let nanos = nanos.unsigned_abs();
        Self {
            epoch_millis: seconds * 1000 + i64::from(nanos / NANOS_PER_MILLI),
            nanos,
        }
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(rename = "CanonicalInstant")]
struct SerializedInstant {
    epoch_millis: i64,
    nanos: u32,
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CanonicalInstant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let SerializedInstant { epoch_millis, nanos } = <SerializedInstant as serde::Deserialize>::deserialize(deserializer)?;
        Self::from_parts_checked(epoch_millis, nanos).ok_or_else(|| {
            serde::de::Error::custom(format_args!(
                "epoch_millis {epoch_millis} and nanos {nanos} do not describe the same instant"
            ))
        })
    }
}

impl Display for CanonicalInstant {
    /// Formats the instant as seconds since the epoch with a nine digit fraction,
    /// for example `-1.000000001`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.epoch_seconds(), self.nanos)
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::hash::Hash;

    use super::*;

    static_assertions::assert_impl_all!(CanonicalInstant: Send, Sync, Copy, Eq, Ord, Hash, From<Timestamp>);

    #[test]
    fn from_epoch_seconds_floors_before_epoch() {
        let instant = CanonicalInstant::from_epoch_seconds(-1, 1).unwrap();
        assert_eq!(instant.epoch_millis(), -1000);
        assert_eq!(instant.nanos(), 1);
        assert_eq!(instant.epoch_seconds(), -1);

        let instant = CanonicalInstant::from_epoch_seconds(-43_201, 1_000_000).unwrap();
        assert_eq!(instant.epoch_millis(), -43_200_999);
        assert_eq!(instant.epoch_seconds(), -43_201);
    }

    #[test]
    fn from_epoch_seconds_rejects_invalid() {
        assert!(CanonicalInstant::from_epoch_seconds(0, 1_000_000_000).is_none());
        assert!(CanonicalInstant::from_epoch_seconds(i64::MAX, 0).is_none());
    }

    #[test]
    fn equality_needs_both_fields() {
        let a = CanonicalInstant::from_epoch_seconds(5, 1).unwrap();
        let b = CanonicalInstant::from_epoch_seconds(5, 2).unwrap();
        assert_eq!(a.epoch_millis(), b.epoch_millis());
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn jiff_roundtrip() {
        let instant = CanonicalInstant::from_epoch_seconds(-62_167_391_999, 110_000_000).unwrap();
        let timestamp = instant.to_timestamp().unwrap();
        assert_eq!(CanonicalInstant::from(timestamp), instant);
    }

    #[test]
    fn from_negative_jiff_timestamp() {
        let timestamp = Timestamp::new(0, -1).unwrap();
        let instant = CanonicalInstant::from(timestamp);

        assert_eq!(instant.epoch_millis(), -1);
        assert_eq!(instant.nanos(), 999_999_999);
        assert_eq!(instant.epoch_seconds(), -1);
    }

    #[test]
    fn to_timestamp_out_of_range() {
        let instant = CanonicalInstant::from_epoch_seconds(400_000_000_000, 0).unwrap();
        assert!(instant.to_timestamp().is_none());
    }

    #[test]
    fn display_uses_seconds_and_fraction() {
        assert_eq!(CanonicalInstant::UNIX_EPOCH.to_string(), "0.000000000");
        assert_eq!(
            CanonicalInstant::from_epoch_seconds(-1, 1).unwrap().to_string(),
            "-1.000000001"
        );
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serialize_deserialize() {
        let instant = CanonicalInstant::from_epoch_seconds(1_483_272_000, 123_456_789).unwrap();
        let json = serde_json::to_string(&instant).unwrap();
        assert_eq!(json, r#"{"epoch_millis":1483272000123,"nanos":123456789}"#);

        let parsed: CanonicalInstant = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, instant);
    }

    #[cfg(feature = "serde")]
    #[rstest::rstest]
    #[case::nanos_beyond_second(r#"{"epoch_millis":5,"nanos":4000000000}"#)]
    #[case::millis_disagree(r#"{"epoch_millis":5,"nanos":6000000}"#)]
    #[case::negative_millis_disagree(r#"{"epoch_millis":-1000,"nanos":999000000}"#)]
    fn deserialize_rejects_inconsistent_fields(#[case] json: &str) {
        let error = serde_json::from_str::<CanonicalInstant>(json).unwrap_err();
        assert!(error.to_string().contains("do not describe the same instant"), "{error}");
    }

    #[test]
    #[cfg(feature = "serde")]
    fn deserialize_accepts_negative_instants() {
        let instant = CanonicalInstant::from_epoch_seconds(-1, 1).unwrap();
        let parsed: CanonicalInstant = serde_json::from_str(r#"{"epoch_millis":-1000,"nanos":1}"#).unwrap();
        assert_eq!(parsed, instant);
    }

    #[test]
    fn from_parts_checked_validates() {
        assert_eq!(
            CanonicalInstant::from_parts_checked(-43_200_999, 1_000_000),
            CanonicalInstant::from_epoch_seconds(-43_201, 1_000_000)
        );
        assert_eq!(CanonicalInstant::from_parts_checked(0, 1_000_000_000), None);
        assert_eq!(CanonicalInstant::from_parts_checked(1, 0), None);
    }
}
