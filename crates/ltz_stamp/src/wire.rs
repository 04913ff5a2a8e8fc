// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};

use crate::ColumnScale;

/// The two result encodings a server may deliver timestamp values in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WireEncoding {
    /// Row-oriented text, each value a signed decimal number of seconds.
    Text,
    /// Columnar binary batches carrying pre-scaled integers.
    Columnar,
}

impl WireEncoding {
    /// Returns a short lowercase name for the encoding.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Columnar => "columnar",
        }
    }
}

/// One timestamp value exactly as it appears on the wire, before any interpretation.
///
/// All variants are interpreted relative to the column scale:
///
/// - [`Text`][WireValue::Text] is a signed decimal number of seconds since the epoch such as
///   `1483272000.123` or `-0.999999999`. The fractional digit string is right-padded with zeros
///   when it is shorter than the scale.
/// - [`Packed`][WireValue::Packed] is `seconds * 10^scale + fraction_units`, used by columnar
///   batches for small scales.
/// - [`Split`][WireValue::Split] carries whole seconds and the fraction in units of the scale
///   separately, used by columnar batches when a packed value would overflow.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WireValue<'a> {
    /// A signed decimal number of seconds.
    Text(&'a str),
    /// Seconds and fraction combined into one integer.
    Packed(i64),
    /// Seconds and fraction carried as two integers.
    Split {
        /// Whole seconds since the Unix epoch.
        epoch_seconds: i64,
        /// Fraction in units of `10^-scale` seconds.
        fraction_units: i32,
    },
}

impl WireValue<'_> {
    /// Returns the encoding that produces this kind of value.
    #[must_use]
    pub const fn encoding(&self) -> WireEncoding {
        match self {
            Self::Text(_) => WireEncoding::Text,
            Self::Packed(_) | Self::Split { .. } => WireEncoding::Columnar,
        }
    }
}

impl Display for WireValue<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Packed(value) => write!(f, "{value}"),
            Self::Split {
                epoch_seconds,
                fraction_units,
            } => write!(f, "{{epoch: {epoch_seconds}, fraction: {fraction_units}}}"),
        }
    }
}

/// The normalized intermediate form every wire value is converted into before decoding.
///
/// `fraction_units` is expressed in units of `10^(9 - scale)` nanoseconds and must satisfy
/// `0 <= fraction_units < 10^scale`. The invariant is checked by [`decode`][crate::decode],
/// not by the constructor, so that malformed values can be reported verbatim.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawWireTimestamp {
    integer_seconds: i64,
    fraction_units: u32,
    scale: ColumnScale,
}

impl RawWireTimestamp {
    /// Creates a raw timestamp from its parts.
    #[must_use]
    pub const fn new(integer_seconds: i64, fraction_units: u32, scale: ColumnScale) -> Self {
        Self {
            integer_seconds,
            fraction_units,
            scale,
        }
    }

    /// Returns the whole seconds since the Unix epoch.
    #[must_use]
    pub const fn integer_seconds(&self) -> i64 {
        self.integer_seconds
    }

    /// Returns the fraction in units of the scale.
    #[must_use]
    pub const fn fraction_units(&self) -> u32 {
        self.fraction_units
    }

    /// Returns the scale the fraction is expressed in.
    #[must_use]
    pub const fn scale(&self) -> ColumnScale {
        self.scale
    }
}

impl Display for RawWireTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{seconds: {}, fraction: {}, scale: {}}}",
            self.integer_seconds, self.fraction_units, self.scale
        )
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_of_values() {
        assert_eq!(WireValue::Text("0").encoding(), WireEncoding::Text);
        assert_eq!(WireValue::Packed(0).encoding(), WireEncoding::Columnar);
        assert_eq!(
            WireValue::Split {
                epoch_seconds: 0,
                fraction_units: 0
            }
            .encoding(),
            WireEncoding::Columnar
        );
        assert_eq!(WireEncoding::Columnar.as_str(), "columnar");
    }

    #[test]
    fn display_keeps_raw_form() {
        assert_eq!(WireValue::Text("-0.5").to_string(), "-0.5");
        assert_eq!(WireValue::Packed(-15).to_string(), "-15");
        assert_eq!(
            WireValue::Split {
                epoch_seconds: -1,
                fraction_units: 7
            }
            .to_string(),
            "{epoch: -1, fraction: 7}"
        );
        assert_eq!(
            RawWireTimestamp::new(1, 2, ColumnScale::MILLIS).to_string(),
            "{seconds: 1, fraction: 2, scale: 3}"
        );
    }
}
