// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Civil calendar arithmetic based on day counts relative to the Unix epoch.
//!
//! The conversions follow Howard Hinnant's `days_from_civil` / `civil_from_days` algorithms and
//! work for astronomical years, including year 0 and negative years.

pub(crate) const SECONDS_PER_DAY: i64 = 86_400;

/// First day of the Gregorian calendar, `1582-10-15`, as days since the Unix epoch.
const GREGORIAN_CUTOVER_DAY: i64 = -141_427;
const GREGORIAN_CUTOVER: (i64, u8, u8) = (1582, 10, 15);

/// The calendar used to map civil dates onto instants and back.
///
/// The calendar only matters when a civil date is involved: parsing timestamp literals and
/// rendering instants as text. Decoding wire values never consults a calendar.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CalendarSystem {
    /// Julian calendar for dates before `1582-10-15`, Gregorian calendar from then on.
    ///
    /// This is the calendar legacy database drivers use, so `0000-01-01 00:00:01 Z` maps to
    /// `-62167391999` seconds since the epoch.
    #[default]
    Hybrid,

    /// Gregorian rules extended backwards indefinitely.
    ///
    /// With this calendar `0000-01-01 00:00:01 Z` maps to `-62167219199` seconds since the epoch.
    ProlepticGregorian,
}

/// A calendar date and wall-clock time without any time zone attached.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct CivilDateTime {
    pub year: i64,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Day of the week, `0` is Sunday.
    pub weekday: u8,
}

impl CalendarSystem {
    /// Returns the number of days between the Unix epoch and the given date.
    pub(crate) fn days_from_civil(self, year: i64, month: u8, day: u8) -> i64 {
        match self {
            Self::ProlepticGregorian => gregorian_days(year, month, day),
            Self::Hybrid if (year, month, day) >= GREGORIAN_CUTOVER => gregorian_days(year, month, day),
            Self::Hybrid => julian_days(year, month, day),
        }
    }

    /// Returns the date that lies `days` after the Unix epoch.
    pub(crate) fn civil_from_days(self, days: i64) -> (i64, u8, u8) {
        match self {
            Self::ProlepticGregorian => gregorian_civil(days),
            Self::Hybrid if days >= GREGORIAN_CUTOVER_DAY => gregorian_civil(days),
            Self::Hybrid => julian_civil(days),
        }
    }

    /// Splits local seconds since the epoch into calendar fields.
    pub(crate) fn civil_from_seconds(self, local_seconds: i64) -> CivilDateTime {
        let days = local_seconds.div_euclid(SECONDS_PER_DAY);
        let second_of_day = local_seconds.rem_euclid(SECONDS_PER_DAY);
        let (year, month, day) = self.civil_from_days(days);

        CivilDateTime {
            year,
            month,
            day,
            hour: narrow(second_of_day / 3600),
            minute: narrow(second_of_day % 3600 / 60),
            second: narrow(second_of_day % 60),
            weekday: narrow((days + 4).rem_euclid(7)),
        }
    }

    /// Returns whether the date exists in the calendar.
    ///
    /// The hybrid calendar skips `1582-10-05` through `1582-10-14`.
    pub(crate) fn is_valid_date(self, year: i64, month: u8, day: u8) -> bool {
        if !(1..=12).contains(&month) || day == 0 || day > self.days_in_month(year, month) {
            return false;
        }
        let skipped = (year, month) == (GREGORIAN_CUTOVER.0, GREGORIAN_CUTOVER.1) && (5..GREGORIAN_CUTOVER.2).contains(&day);
        !(matches!(self, Self::Hybrid) && skipped)
    }

    pub(crate) fn days_in_month(self, year: i64, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if self.is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    fn is_leap_year(self, year: i64) -> bool {
        let julian = matches!(self, Self::Hybrid) && year < GREGORIAN_CUTOVER.0;
        if julian {
            year.rem_euclid(4) == 0
        } else {
            year.rem_euclid(4) == 0 && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0)
        }
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "callers pass values below 256")]
const fn narrow(value: i64) -> u8 {
    value as u8
}

// March-based day of year for the given month and day.
fn day_of_year(month: u8, day: u8) -> i64 {
    let m = i64::from(month);
    (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + i64::from(day) - 1
}

fn month_day(day_of_year: i64) -> (u8, u8) {
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    (narrow(month), narrow(day))
}

fn gregorian_days(year: i64, month: u8, day: u8) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + day_of_year(month, day);
    era * 146_097 + doe - 719_468
}

fn gregorian_civil(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let (month, day) = month_day(doe - (365 * yoe + yoe / 4 - yoe / 100));
    (yoe + era * 400 + i64::from(month <= 2), month, day)
}

fn julian_days(year: i64, month: u8, day: u8) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(4);
    let yoe = y - era * 4;
    let doe = yoe * 365 + day_of_year(month, day);
    era * 1461 + doe - 719_470
}

fn julian_civil(days: i64) -> (i64, u8, u8) {
    let z = days + 719_470;
    let era = z.div_euclid(1461);
    let doe = z - era * 1461;
    let yoe = (doe - doe / 1460) / 365;
    let (month, day) = month_day(doe - 365 * yoe);
    (yoe + era * 4 + i64::from(month <= 2), month, day)
}
