// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::calendar::SECONDS_PER_DAY;
use crate::{CalendarSystem, ColumnScale, DecodeError, RawWireTimestamp, WireValue};

/// The largest scale whose packed columnar form is used; larger scales are sent split.
const MAX_PACKED_SCALE: u8 = 7;

/// An absolute instant named by a timestamp literal such as `2014-01-02 12:34:56.1 Z`.
///
/// This is the storage side of a timestamp column: parse what a client inserted, store it at the
/// column scale with [`store`][TimestampLiteral::store], and produce the value in either wire
/// encoding.
///
/// The accepted syntax is `[-]YYYY-MM-DD HH:MM:SS[.fffffffff][ ][Z|±HH:MM|±HHMM]`. A `T` may
/// separate date and time, and a missing offset means UTC. Leap seconds are rejected.
///
/// # Examples
///
/// ```
/// use ltz_stamp::{ColumnScale, TimestampLiteral};
///
/// let literal: TimestampLiteral = "0000-01-01 00:00:01 Z".parse()?;
/// assert_eq!(literal.epoch_seconds(), -62_167_391_999);
///
/// let stored = "1969-12-31 23:59:59.000000001 Z".parse::<TimestampLiteral>()?.store(ColumnScale::NANOS);
/// assert_eq!(stored.to_text(), "-0.999999999");
///
/// # Ok::<(), ltz_stamp::DecodeError>(())
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimestampLiteral {
    epoch_seconds: i64,
    nanos: u32,
}

impl TimestampLiteral {
    /// Parses a literal, interpreting its civil date with the given calendar.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not follow the literal syntax or names a date or time
    /// that does not exist.
    pub fn parse_with(text: &str, calendar: CalendarSystem) -> Result<Self, DecodeError> {
        Parser::new(text).literal(calendar)
    }

    /// Returns the whole seconds since the Unix epoch.
    #[must_use]
    pub const fn epoch_seconds(&self) -> i64 {
        self.epoch_seconds
    }

    /// Returns the nanoseconds within the second, before any column truncation.
    #[must_use]
    pub const fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Stores the literal in a column of the given scale.
    ///
    /// Fraction digits beyond the scale are dropped, never rounded, so `…59.999` stored at scale
    /// 0 stays in second `…59`.
    #[must_use]
    pub const fn store(self, scale: ColumnScale) -> StoredTimestamp {
        StoredTimestamp {
            epoch_seconds: self.epoch_seconds,
            fraction_units: scale.units_from_nanos(self.nanos),
            scale,
        }
    }
}

impl FromStr for TimestampLiteral {
    type Err = DecodeError;

    /// Parses a literal using the [`Hybrid`][CalendarSystem::Hybrid] calendar.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with(s, CalendarSystem::default())
    }
}

/// A timestamp as held by a column of a specific scale.
///
/// The stored fraction already has the digits beyond the column scale removed; every wire form
/// produced from it carries exactly that precision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StoredTimestamp {
    epoch_seconds: i64,
    fraction_units: u32,
    scale: ColumnScale,
}

impl StoredTimestamp {
    /// Returns the scale of the column that holds the value.
    #[must_use]
    pub const fn scale(&self) -> ColumnScale {
        self.scale
    }

    /// Returns the normalized raw form of the stored value.
    #[must_use]
    pub const fn to_raw(&self) -> RawWireTimestamp {
        RawWireTimestamp::new(self.epoch_seconds, self.fraction_units, self.scale)
    }

    /// Returns the textual wire form: a signed decimal number of seconds with exactly `scale`
    /// fractional digits and no decimal point at scale 0.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Returns the packed columnar form `seconds * 10^scale + fraction`.
    ///
    /// Returns `None` if the combined value does not fit 64 bits.
    #[must_use]
    pub fn to_packed(&self) -> Option<i64> {
        self.epoch_seconds
            .checked_mul(i64::from(self.scale.units_per_second()))?
            .checked_add(i64::from(self.fraction_units))
    }

    /// Returns the split columnar form `(seconds, fraction)`.
    #[must_use]
    pub fn to_split(&self) -> (i64, i32) {
        // the fraction is below 10^9 and always fits
        let fraction = i32::try_from(self.fraction_units).unwrap_or(i32::MAX);
        (self.epoch_seconds, fraction)
    }

    /// Returns the columnar wire value a server sends for this column scale.
    ///
    /// Scales up to 7 use the packed form when it fits; everything else is split.
    #[must_use]
    pub fn to_columnar(&self) -> WireValue<'static> {
        match self.to_packed() {
            Some(packed) if self.scale.digits() <= MAX_PACKED_SCALE => WireValue::Packed(packed),
            _ => {
                let (epoch_seconds, fraction_units) = self.to_split();
                WireValue::Split {
                    epoch_seconds,
                    fraction_units,
                }
            }
        }
    }
}

impl Display for StoredTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let per_second = i128::from(self.scale.units_per_second());
        let combined = i128::from(self.epoch_seconds) * per_second + i128::from(self.fraction_units);
        let sign = if combined < 0 { "-" } else { "" };
        let magnitude = combined.unsigned_abs();
        let per_second = per_second.unsigned_abs();

        write!(f, "{sign}{}", magnitude / per_second)?;
        if self.scale.digits() > 0 {
            write!(
                f,
                ".{:0width$}",
                magnitude % per_second,
                width = usize::from(self.scale.digits())
            )?;
        }
        Ok(())
    }
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    const fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn literal(mut self, calendar: CalendarSystem) -> Result<TimestampLiteral, DecodeError> {
        let negative_year = self.eat(b'-');
        let year = self.number(4, 4)?;
        let year = if negative_year { -year } else { year };
        self.expect(b'-')?;
        let month = self.number(2, 2)?;
        self.expect(b'-')?;
        let day = self.number(2, 2)?;
        if !self.eat(b' ') && !self.eat(b'T') {
            return Err(self.error("expected a date and time separator"));
        }
        let hour = self.number(2, 2)?;
        self.expect(b':')?;
        let minute = self.number(2, 2)?;
        self.expect(b':')?;
        let second = self.number(2, 2)?;
        let nanos = if self.eat(b'.') { self.fraction()? } else { 0 };
        self.eat(b' ');
        let offset = self.offset()?;
        if self.pos != self.bytes.len() {
            return Err(self.error("unexpected trailing characters"));
        }

        let (Ok(month), Ok(day)) = (u8::try_from(month), u8::try_from(day)) else {
            return Err(self.error("date out of range"));
        };
        if !calendar.is_valid_date(year, month, day) {
            return Err(self.error("date does not exist"));
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(self.error("time does not exist"));
        }

        let days = calendar.days_from_civil(year, month, day);
        let epoch_seconds = days * SECONDS_PER_DAY + hour * 3600 + minute * 60 + second - offset;
        Ok(TimestampLiteral { epoch_seconds, nanos })
    }

    fn fraction(&mut self) -> Result<u32, DecodeError> {
        let start = self.pos;
        let mut nanos = 0_u32;
        while let Some(digit) = self.digit() {
            if self.pos - start > 9 {
                return Err(self.error("fraction has more than nine digits"));
            }
            nanos = nanos * 10 + digit;
        }

        let digits = self.pos - start;
        if digits == 0 {
            return Err(self.error("expected fraction digits"));
        }
        Ok(nanos * 10_u32.pow(u32::try_from(9 - digits).unwrap_or_default()))
    }

    /// Returns the UTC offset in seconds.
    fn offset(&mut self) -> Result<i64, DecodeError> {
        if self.pos == self.bytes.len() || self.eat(b'Z') {
            return Ok(0);
        }

        let sign = if self.eat(b'+') {
            1
        } else if self.eat(b'-') {
            -1
        } else {
            return Err(self.error("expected a UTC offset"));
        };
        let hours = self.number(2, 2)?;
        self.eat(b':');
        let minutes = self.number(2, 2)?;
        if hours > 18 || minutes > 59 {
            return Err(self.error("UTC offset out of range"));
        }
        Ok(sign * (hours * 3600 + minutes * 60))
    }

    fn number(&mut self, min: usize, max: usize) -> Result<i64, DecodeError> {
        let start = self.pos;
        let mut value = 0_i64;
        while self.pos - start < max
            && let Some(digit) = self.digit()
        {
            value = value * 10 + i64::from(digit);
        }

        if self.pos - start < min {
            return Err(self.error("expected digits"));
        }
        Ok(value)
    }

    fn digit(&mut self) -> Option<u32> {
        let digit = char::from(*self.bytes.get(self.pos)?).to_digit(10)?;
        self.pos += 1;
        Some(digit)
    }

    fn eat(&mut self, expected: u8) -> bool {
        let matched = self.bytes.get(self.pos) == Some(&expected);
        if matched {
            self.pos += 1;
        }
        matched
    }

    fn expect(&mut self, expected: u8) -> Result<(), DecodeError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error("unexpected character"))
        }
    }

    fn error(&self, reason: &'static str) -> DecodeError {
        DecodeError::new(self.text, reason)
    }
}
