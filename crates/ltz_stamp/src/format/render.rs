// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use jiff::Timestamp;
use jiff::tz::TimeZone;

use super::template::Element;
use crate::calendar::CivilDateTime;
use crate::{CalendarSystem, CanonicalInstant, ColumnScale, FormatTemplate};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Renders an instant as text in the given display zone.
///
/// The zone only contributes the UTC offset in effect at the instant; civil fields are then
/// computed with `calendar`, so dates outside the range of the zone database still render. The
/// instant itself is never modified.
///
/// # Examples
///
/// ```
/// use jiff::tz::TimeZone;
/// use ltz_stamp::{CalendarSystem, CanonicalInstant, ColumnScale, FormatTemplate, render};
///
/// let instant = CanonicalInstant::from_epoch_seconds(1_483_272_000, 0).expect("valid instant");
/// let template = FormatTemplate::parse("DY, DD MON YYYY HH24:MI:SS TZHTZM");
/// let zone = TimeZone::get("America/Los_Angeles")?;
///
/// assert_eq!(
///     render(instant, ColumnScale::NANOS, &zone, &template, CalendarSystem::Hybrid),
///     "Sun, 01 Jan 2017 04:00:00 -0800"
/// );
///
/// # Ok::<(), jiff::Error>(())
/// ```
#[must_use]
pub fn render(
    instant: CanonicalInstant,
    scale: ColumnScale,
    zone: &TimeZone,
    template: &FormatTemplate,
    calendar: CalendarSystem,
) -> String {
    let seconds = instant.epoch_seconds();
    let offset = offset_seconds(zone, seconds);
    let civil = calendar.civil_from_seconds(seconds.saturating_add(offset));
    let nanos = scale.truncate_nanos(instant.nanos());

    let mut out = String::with_capacity(template.as_str().len() + 16);
    for element in template.elements() {
        write_element(&mut out, element, &civil, nanos, scale, offset);
    }
    out
}

/// Returns the UTC offset of `zone` at the given second, clamped into the zone database range.
fn offset_seconds(zone: &TimeZone, seconds: i64) -> i64 {
    let clamped = seconds.clamp(Timestamp::MIN.as_second(), Timestamp::MAX.as_second());
    Timestamp::from_second(clamped).map_or(0, |timestamp| i64::from(zone.to_offset(timestamp).seconds()))
}

fn write_element(
    out: &mut String,
    element: &Element,
    civil: &CivilDateTime,
    nanos: u32,
    scale: ColumnScale,
    offset: i64,
) {
    match element {
        Element::Literal(text) => out.push_str(text),
        Element::Year | Element::SignedYear => write_year(out, civil.year),
        Element::ShortYear => out.push_str(&format!("{:02}", civil.year.rem_euclid(100))),
        Element::MonthName => out.push_str(month_name(civil.month)),
        Element::MonthAbbrev => out.push_str(month_name(civil.month).get(..3).unwrap_or_default()),
        Element::Month => out.push_str(&format!("{:02}", civil.month)),
        Element::Day => out.push_str(&format!("{:02}", civil.day)),
        Element::WeekdayAbbrev => out.push_str(WEEKDAY_NAMES.get(usize::from(civil.weekday)).copied().unwrap_or_default()),
        Element::Hour24 => out.push_str(&format!("{:02}", civil.hour)),
        Element::Hour12 => out.push_str(&format!("{:02}", (civil.hour + 11) % 12 + 1)),
        Element::Meridiem => out.push_str(if civil.hour < 12 { "AM" } else { "PM" }),
        Element::Minute => out.push_str(&format!("{:02}", civil.minute)),
        Element::Second => out.push_str(&format!("{:02}", civil.second)),
        Element::Fraction(digits) => write_fraction(out, nanos, digits.unwrap_or_else(|| scale.digits())),
        Element::OffsetHours => {
            let sign = if offset < 0 { '-' } else { '+' };
            out.push_str(&format!("{sign}{:02}", offset.abs() / 3600));
        }
        Element::OffsetMinutes => out.push_str(&format!("{:02}", offset.abs() % 3600 / 60)),
    }
}

fn write_year(out: &mut String, year: i64) {
    if year < 0 {
        out.push('-');
    }
    out.push_str(&format!("{:04}", year.unsigned_abs()));
}

fn write_fraction(out: &mut String, nanos: u32, digits: u8) {
    let digits = usize::from(digits.min(9));
    let padded = format!("{nanos:09}");
    out.push_str(padded.get(..digits).unwrap_or_default());
}

fn month_name(month: u8) -> &'static str {
    MONTH_NAMES
        .get(usize::from(month).wrapping_sub(1))
        .copied()
        .unwrap_or_default()
}
