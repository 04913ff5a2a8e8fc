// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use jiff::tz::TimeZone;
use parking_lot::RwLock;

use crate::{
    CalendarSystem, CanonicalInstant, ColumnMetadata, ColumnScale, ConfigurationError, ResultSet, SessionFormatConfig, WireSource,
    render,
};

/// Session parameter holding the output format of local time zone timestamps.
pub const TIMESTAMP_LTZ_OUTPUT_FORMAT: &str = "TIMESTAMP_LTZ_OUTPUT_FORMAT";

/// Session parameter holding the generic timestamp output format used as fallback.
pub const TIMESTAMP_OUTPUT_FORMAT: &str = "TIMESTAMP_OUTPUT_FORMAT";

/// Session parameter holding the display time zone identifier.
pub const TIMEZONE: &str = "TIMEZONE";

/// The output format a session starts with for both format parameters.
pub const DEFAULT_OUTPUT_FORMAT: &str = "DY, DD MON YYYY HH24:MI:SS TZHTZM";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Parameter {
    LtzOutputFormat,
    TimestampOutputFormat,
    TimeZone,
}

impl Parameter {
    fn parse(name: &str) -> Result<Self, ConfigurationError> {
        [
            (TIMESTAMP_LTZ_OUTPUT_FORMAT, Self::LtzOutputFormat),
            (TIMESTAMP_OUTPUT_FORMAT, Self::TimestampOutputFormat),
            (TIMEZONE, Self::TimeZone),
        ]
        .into_iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, parameter)| parameter)
        .ok_or_else(|| ConfigurationError::new(name, "unknown session parameter"))
    }

    const fn name(self) -> &'static str {
        match self {
            Self::LtzOutputFormat => TIMESTAMP_LTZ_OUTPUT_FORMAT,
            Self::TimestampOutputFormat => TIMESTAMP_OUTPUT_FORMAT,
            Self::TimeZone => TIMEZONE,
        }
    }
}

/// Parameters a [`Session`] starts with.
///
/// # Examples
///
/// ```
/// use ltz_stamp::{CalendarSystem, Session, SessionOptions};
///
/// let session = Session::new(
///     SessionOptions::new()
///         .time_zone("America/Los_Angeles")
///         .ltz_output_format("YYYY-MM-DD HH24:MI:SS TZH:TZM")
///         .calendar(CalendarSystem::ProlepticGregorian),
/// )?;
///
/// assert_eq!(session.time_zone().as_deref(), Some("America/Los_Angeles"));
///
/// # Ok::<(), ltz_stamp::ConfigurationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SessionOptions {
    time_zone: Option<String>,
    ltz_output_format: String,
    timestamp_output_format: String,
    calendar: CalendarSystem,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionOptions {
    /// Creates options with the driver defaults: no display time zone, both output formats set to
    /// [`DEFAULT_OUTPUT_FORMAT`] and the hybrid calendar.
    #[must_use]
    pub fn new() -> Self {
        Self {
            time_zone: None,
            ltz_output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            timestamp_output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            calendar: CalendarSystem::default(),
        }
    }

    /// Sets the display time zone, an IANA identifier such as `Europe/Prague`.
    #[must_use]
    pub fn time_zone(mut self, name: impl Into<String>) -> Self {
        self.time_zone = Some(name.into());
        self
    }

    /// Sets the driver-supplied local time zone output format.
    ///
    /// This is the format the session returns to when the parameter is reset.
    #[must_use]
    pub fn ltz_output_format(mut self, format: impl Into<String>) -> Self {
        self.ltz_output_format = format.into();
        self
    }

    /// Sets the generic timestamp output format used once the local time zone format is unset.
    #[must_use]
    pub fn timestamp_output_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_output_format = format.into();
        self
    }

    /// Sets the calendar used to render civil dates.
    #[must_use]
    pub const fn calendar(mut self, calendar: CalendarSystem) -> Self {
        self.calendar = calendar;
        self
    }
}

#[derive(Debug)]
struct DisplayZone {
    name: String,
    zone: TimeZone,
}

impl DisplayZone {
    fn resolve(name: &str) -> Result<Self, ConfigurationError> {
        let zone = TimeZone::get(name).map_err(|err| ConfigurationError::caused_by(TIMEZONE, "unknown time zone", err))?;
        Ok(Self {
            name: name.to_string(),
            zone,
        })
    }
}

#[derive(Debug)]
struct SessionInner {
    formats: Arc<SessionFormatConfig>,
    zone: RwLock<Option<DisplayZone>>,
    calendar: CalendarSystem,
    timestamp_output_format: String,
}

/// A client session: the owner of the output format configuration and the display time zone.
///
/// Cloning a session is cheap and yields another handle to the same state, which is how every
/// [`ResultSet`] derived from the session observes later parameter changes. Decoding never
/// consults the session; only rendering does.
///
/// # Examples
///
/// ```
/// use ltz_stamp::{CanonicalInstant, ColumnScale, Session, SessionOptions};
///
/// let session = Session::new(SessionOptions::new().time_zone("UTC"))?;
/// let instant = CanonicalInstant::from_epoch_seconds(1_483_272_000, 0).expect("valid instant");
///
/// assert_eq!(session.render(instant, ColumnScale::SECONDS)?, "Sun, 01 Jan 2017 12:00:00 +0000");
///
/// session.set_ltz_output_format("YYYY-MM-DD HH24:MI:SS TZH:TZM");
/// assert_eq!(session.render(instant, ColumnScale::SECONDS)?, "2017-01-01 12:00:00 +00:00");
///
/// # Ok::<(), ltz_stamp::ConfigurationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Starts a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the display time zone is not a known identifier.
    pub fn new(options: SessionOptions) -> Result<Self, ConfigurationError> {
        let zone = options.time_zone.as_deref().map(DisplayZone::resolve).transpose()?;

        Ok(Self {
            inner: Arc::new(SessionInner {
                formats: Arc::new(SessionFormatConfig::with_formats(
                    &options.ltz_output_format,
                    &options.timestamp_output_format,
                )),
                zone: RwLock::new(zone),
                calendar: options.calendar,
                timestamp_output_format: options.timestamp_output_format,
            }),
        })
    }

    /// Returns the output format configuration shared by all result sets of the session.
    #[must_use]
    pub fn format_config(&self) -> Arc<SessionFormatConfig> {
        Arc::clone(&self.inner.formats)
    }

    /// Returns the calendar the session renders civil dates with.
    #[must_use]
    pub fn calendar(&self) -> CalendarSystem {
        self.inner.calendar
    }

    /// Returns the display time zone identifier, if one is set.
    #[must_use]
    pub fn time_zone(&self) -> Option<String> {
        self.inner.zone.read().as_ref().map(|zone| zone.name.clone())
    }

    /// Sets a session parameter by name, matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is unknown or the value is not valid for it.
    pub fn set_parameter(&self, name: &str, value: &str) -> Result<(), ConfigurationError> {
        match Parameter::parse(name)? {
            Parameter::LtzOutputFormat => self.set_ltz_output_format(value),
            Parameter::TimestampOutputFormat => self.set_timestamp_output_format(value),
            Parameter::TimeZone => self.set_time_zone(value)?,
        }
        Ok(())
    }

    /// Unsets a session parameter by name, matched case-insensitively.
    ///
    /// Unsetting the local time zone format switches rendering to the generic timestamp format;
    /// unsetting the generic format restores its session-start value; unsetting the time zone
    /// leaves the session without a display zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is unknown.
    pub fn unset_parameter(&self, name: &str) -> Result<(), ConfigurationError> {
        let parameter = Parameter::parse(name)?;
        match parameter {
            Parameter::LtzOutputFormat => self.unset_ltz_output_format(),
            Parameter::TimestampOutputFormat => self.set_timestamp_output_format(&self.inner.timestamp_output_format),
            Parameter::TimeZone => {
                *self.inner.zone.write() = None;
                log_parameter(parameter, "");
            }
        }
        Ok(())
    }

    /// Returns the current value of a session parameter, `None` if it is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is unknown.
    pub fn parameter(&self, name: &str) -> Result<Option<String>, ConfigurationError> {
        Ok(match Parameter::parse(name)? {
            Parameter::LtzOutputFormat => self.inner.formats.ltz_format().map(|format| format.as_str().to_string()),
            Parameter::TimestampOutputFormat => Some(self.inner.formats.ts_fallback().as_str().to_string()),
            Parameter::TimeZone => self.time_zone(),
        })
    }

    /// Installs a custom local time zone output format.
    pub fn set_ltz_output_format(&self, format: &str) {
        self.inner.formats.set_ltz_format(format);
        log_parameter(Parameter::LtzOutputFormat, format);
    }

    /// Clears the local time zone output format so that the generic timestamp format is used.
    pub fn unset_ltz_output_format(&self) {
        self.inner.formats.unset_ltz_format();
        log_parameter(Parameter::LtzOutputFormat, "");
    }

    /// Sets the generic timestamp output format.
    pub fn set_timestamp_output_format(&self, format: &str) {
        self.inner.formats.set_ts_fallback(format);
        log_parameter(Parameter::TimestampOutputFormat, format);
    }

    /// Sets the display time zone.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a known time zone identifier; the previous zone stays
    /// in effect.
    pub fn set_time_zone(&self, name: &str) -> Result<(), ConfigurationError> {
        let zone = DisplayZone::resolve(name)?;
        *self.inner.zone.write() = Some(zone);
        log_parameter(Parameter::TimeZone, name);
        Ok(())
    }

    /// Renders an instant with the active output format in the display time zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has no display time zone.
    pub fn render(&self, instant: CanonicalInstant, scale: ColumnScale) -> Result<String, ConfigurationError> {
        let template = self.inner.formats.active();
        let zone = self.inner.zone.read();
        let zone = zone
            .as_ref()
            .ok_or_else(|| ConfigurationError::new(TIMEZONE, "display time zone is not set"))?;

        Ok(render(instant, scale, &zone.zone, &template, self.inner.calendar))
    }

    /// Opens a result set over `source` whose columns are described by `columns`.
    ///
    /// # Errors
    ///
    /// Returns an error if a column is not declared as a local time zone timestamp.
    pub fn query<S: WireSource>(&self, source: S, columns: Vec<ColumnMetadata>) -> Result<ResultSet<S>, ConfigurationError> {
        ResultSet::new(self.clone(), source, columns)
    }
}

fn log_parameter(parameter: Parameter, value: &str) {
    tracing::event!(
        name: "ltz.session.parameter",
        tracing::Level::DEBUG,
        ltz.parameter = parameter.name(),
        ltz.value = value,
    );
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use tracing_subscriber::util::SubscriberInitExt;

    use super::*;
    use crate::OutputFormatState;
    use crate::testing::LogCapture;

    static_assertions::assert_impl_all!(Session: Send, Sync, Clone);
    static_assertions::assert_impl_all!(SessionOptions: Send, Sync, Clone, Default);

    fn utc_session() -> Session {
        Session::new(SessionOptions::new().time_zone("UTC")).unwrap()
    }

    fn new_year_2017() -> CanonicalInstant {
        CanonicalInstant::from_epoch_seconds(1_483_272_000, 0).unwrap()
    }

    #[test]
    fn driver_defaults() {
        let session = Session::new(SessionOptions::default()).unwrap();

        assert_eq!(
            session.parameter(TIMESTAMP_LTZ_OUTPUT_FORMAT).unwrap().as_deref(),
            Some(DEFAULT_OUTPUT_FORMAT)
        );
        assert_eq!(
            session.parameter(TIMESTAMP_OUTPUT_FORMAT).unwrap().as_deref(),
            Some(DEFAULT_OUTPUT_FORMAT)
        );
        assert_eq!(session.parameter(TIMEZONE).unwrap(), None);
        assert_eq!(session.calendar(), CalendarSystem::Hybrid);
        assert_eq!(session.format_config().state(), OutputFormatState::Default);
    }

    #[test]
    fn render_without_zone_fails() {
        let session = Session::new(SessionOptions::new()).unwrap();

        let error = session.render(new_year_2017(), ColumnScale::SECONDS).unwrap_err();
        assert_eq!(error.parameter(), TIMEZONE);
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let error = Session::new(SessionOptions::new().time_zone("Mars/Olympus_Mons")).unwrap_err();
        assert_eq!(error.parameter(), TIMEZONE);

        let session = utc_session();
        session.set_time_zone("Nowhere/Special").unwrap_err();
        assert_eq!(session.time_zone().as_deref(), Some("UTC"));
    }

    #[test]
    fn parameters_are_case_insensitive() {
        let session = utc_session();

        session.set_parameter("timestamp_ltz_output_format", "YYYY").unwrap();
        assert_eq!(session.parameter("Timestamp_LTZ_Output_Format").unwrap().as_deref(), Some("YYYY"));

        session.set_parameter("timezone", "Asia/Singapore").unwrap();
        assert_eq!(session.time_zone().as_deref(), Some("Asia/Singapore"));
    }

    #[test]
    fn unknown_parameter() {
        let session = utc_session();

        let error = session.set_parameter("DATE_OUTPUT_FORMAT", "YYYY").unwrap_err();
        assert_eq!(error.parameter(), "DATE_OUTPUT_FORMAT");
        session.unset_parameter("NOPE").unwrap_err();
        session.parameter("NOPE").unwrap_err();
    }

    #[test]
    fn unset_switches_to_timestamp_format() {
        let session = utc_session();
        session.set_timestamp_output_format("YYYY-MM-DD");
        session.set_ltz_output_format("HH24:MI");
        assert_eq!(session.render(new_year_2017(), ColumnScale::SECONDS).unwrap(), "12:00");

        session.unset_parameter(TIMESTAMP_LTZ_OUTPUT_FORMAT).unwrap();
        assert_eq!(session.parameter(TIMESTAMP_LTZ_OUTPUT_FORMAT).unwrap(), None);
        assert_eq!(session.render(new_year_2017(), ColumnScale::SECONDS).unwrap(), "2017-01-01");
    }

    #[test]
    fn unset_timestamp_format_restores_start_value() {
        let session = Session::new(SessionOptions::new().time_zone("UTC").timestamp_output_format("YYYY")).unwrap();
        session.set_timestamp_output_format("MM");

        session.unset_parameter(TIMESTAMP_OUTPUT_FORMAT).unwrap();
        assert_eq!(session.parameter(TIMESTAMP_OUTPUT_FORMAT).unwrap().as_deref(), Some("YYYY"));
    }

    #[test]
    fn unset_time_zone() {
        let session = utc_session();
        session.unset_parameter(TIMEZONE).unwrap();

        assert_eq!(session.time_zone(), None);
        session.render(new_year_2017(), ColumnScale::SECONDS).unwrap_err();
    }

    #[test]
    fn clones_share_state() {
        let session = utc_session();
        let clone = session.clone();

        clone.set_ltz_output_format("YYYY");
        clone.set_time_zone("America/New_York").unwrap();
        assert_eq!(session.render(new_year_2017(), ColumnScale::SECONDS).unwrap(), "2017");
        assert_eq!(session.time_zone().as_deref(), Some("America/New_York"));
    }

    #[test]
    fn calendar_option_changes_rendering() {
        let session = Session::new(
            SessionOptions::new()
                .time_zone("UTC")
                .ltz_output_format("YYYY-MM-DD")
                .calendar(CalendarSystem::ProlepticGregorian),
        )
        .unwrap();
        let year_zero = CanonicalInstant::from_epoch_seconds(-62_167_219_199, 0).unwrap();

        assert_eq!(session.render(year_zero, ColumnScale::SECONDS).unwrap(), "0000-01-01");
    }

    #[test]
    fn parameter_changes_are_logged() {
        let log_capture = LogCapture::new();
        let _guard = log_capture.subscriber().set_default();

        let session = utc_session();
        session.set_parameter(TIMEZONE, "CET").unwrap();

        log_capture.assert_contains("ltz.parameter=\"TIMEZONE\"");
        log_capture.assert_contains("ltz.value=\"CET\"");
    }

    #[test]
    #[cfg(feature = "serde")]
    fn deserialize_options() {
        let options: SessionOptions = serde_json::from_str(
            r#"{"time_zone":"Europe/Prague","ltz_output_format":"YYYY","calendar":"proleptic_gregorian"}"#,
        )
        .unwrap();

        assert_eq!(
            options,
            SessionOptions::new()
                .time_zone("Europe/Prague")
                .ltz_output_format("YYYY")
                .calendar(CalendarSystem::ProlepticGregorian)
        );

        serde_json::from_str::<SessionOptions>(r#"{"zone":"UTC"}"#).unwrap_err();
    }
}
