// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};

/// One element of a compiled format template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Element {
    Literal(String),
    Year,
    SignedYear,
    ShortYear,
    MonthName,
    MonthAbbrev,
    Month,
    Day,
    WeekdayAbbrev,
    Hour24,
    Hour12,
    Meridiem,
    Minute,
    Second,
    /// Fractional seconds, `None` meaning the column scale.
    Fraction(Option<u8>),
    OffsetHours,
    OffsetMinutes,
}

/// Keywords in matching order: longer keywords come before their prefixes.
const KEYWORDS: &[(&str, Element)] = &[
    ("YYYY", Element::Year),
    ("UUUU", Element::SignedYear),
    ("HH24", Element::Hour24),
    ("HH12", Element::Hour12),
    ("MMMM", Element::MonthName),
    ("MON", Element::MonthAbbrev),
    ("TZH", Element::OffsetHours),
    ("TZM", Element::OffsetMinutes),
    ("AM", Element::Meridiem),
    ("PM", Element::Meridiem),
    ("YY", Element::ShortYear),
    ("MM", Element::Month),
    ("DD", Element::Day),
    ("DY", Element::WeekdayAbbrev),
    ("HH", Element::Hour12),
    ("MI", Element::Minute),
    ("SS", Element::Second),
];

/// A compiled timestamp output format such as `DY, DD MON YYYY HH24:MI:SS TZHTZM`.
///
/// Templates are compiled once, when a format is installed, and rendered many times. Keywords
/// are matched case-insensitively; text in double quotes and any character that does not start
/// a keyword is copied verbatim. Compilation never fails: an unterminated quote extends to the
/// end of the template.
///
/// | Keyword | Output |
/// |---|---|
/// | `YYYY`, `UUUU` | four-digit year, `-` prefixed before year 0 |
/// | `YY` | last two digits of the year |
/// | `MMMM`, `MON`, `MM` | `January`, `Jan`, `01` |
/// | `DD`, `DY` | `01`, `Sun` |
/// | `HH24`, `HH12`/`HH`, `AM`/`PM` | `13`, `01`, `PM` |
/// | `MI`, `SS` | minutes and seconds |
/// | `FF`, `FF0`..`FF9` | fraction at the column scale or with the given digits |
/// | `TZH`, `TZM` | `+08`, `00` |
///
/// # Examples
///
/// ```
/// use ltz_stamp::FormatTemplate;
///
/// let template = FormatTemplate::parse("YYYY-MM-DD\"T\"HH24:MI:SS");
/// assert_eq!(template.as_str(), "YYYY-MM-DD\"T\"HH24:MI:SS");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTemplate {
    source: String,
    elements: Vec<Element>,
}

impl FormatTemplate {
    /// Compiles a format template.
    #[must_use]
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let elements = compile(&source);
        Self { source, elements }
    }

    /// Returns the template text as it was installed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn elements(&self) -> &[Element] {
        &self.elements
    }
}

impl Display for FormatTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn compile(source: &str) -> Vec<Element> {
    let mut elements = Vec::new();
    let mut literal = String::new();
    let mut rest = source;

    while let Some(c) = rest.chars().next() {
        if c == '"' {
            let quoted = &rest[1..];
            let (text, remaining) = quoted.split_once('"').unwrap_or((quoted, ""));
            literal.push_str(text);
            rest = remaining;
            continue;
        }

        if let Some((element, len)) = keyword(rest) {
            if !literal.is_empty() {
                elements.push(Element::Literal(std::mem::take(&mut literal)));
            }
            elements.push(element);
            rest = &rest[len..];
            continue;
        }

        literal.push(c);
        rest = &rest[c.len_utf8()..];
    }

    if !literal.is_empty() {
        elements.push(Element::Literal(literal));
    }
    elements
}

/// Matches a keyword at the start of `text`, returning it with its byte length.
fn keyword(text: &str) -> Option<(Element, usize)> {
    if starts_with_ignore_case(text, "FF") {
        return Some(match text.as_bytes().get(2) {
            Some(digit @ b'0'..=b'9') => (Element::Fraction(Some(digit - b'0')), 3),
            _ => (Element::Fraction(None), 2),
        });
    }

    KEYWORDS
        .iter()
        .find(|(keyword, _)| starts_with_ignore_case(text, keyword))
        .map(|(keyword, element)| (element.clone(), keyword.len()))
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}
