// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::FormatTemplate;

/// Which format string a session currently renders local time zone timestamps with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OutputFormatState {
    /// The driver-supplied local time zone format is active.
    Default,
    /// A session-level set installed a custom local time zone format.
    Overridden,
    /// The local time zone format was unset; the generic timestamp format is used.
    Fallback,
}

impl OutputFormatState {
    /// Returns a short lowercase name for the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Overridden => "overridden",
            Self::Fallback => "fallback",
        }
    }
}

impl Display for OutputFormatState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct Slots {
    state: OutputFormatState,
    ltz_default: Arc<FormatTemplate>,
    ltz: Option<Arc<FormatTemplate>>,
    ts_fallback: Arc<FormatTemplate>,
}

/// Session-scoped output format configuration shared by every result set of a session.
///
/// The configuration moves between three states:
///
/// ```text
/// Default    --set-->   Overridden
/// Default    --unset--> Fallback
/// Overridden --set-->   Overridden
/// Overridden --unset--> Fallback
/// Fallback   --set-->   Overridden
/// any        --reset--> Default
/// ```
///
/// Every transition replaces whole compiled templates under a lock, so a concurrent reader sees
/// either the previous or the new format, never a mix. Concurrent writers are ordered by the
/// lock; the last one wins.
///
/// # Examples
///
/// ```
/// use ltz_stamp::{OutputFormatState, SessionFormatConfig};
///
/// let config = SessionFormatConfig::new("DY, DD MON YYYY HH24:MI:SS TZHTZM");
/// assert_eq!(config.state(), OutputFormatState::Default);
///
/// config.set_ltz_format("YYYY-MM-DD");
/// assert_eq!(config.active().as_str(), "YYYY-MM-DD");
///
/// config.unset_ltz_format();
/// assert_eq!(config.state(), OutputFormatState::Fallback);
/// assert_eq!(config.active().as_str(), "DY, DD MON YYYY HH24:MI:SS TZHTZM");
/// ```
#[derive(Debug)]
pub struct SessionFormatConfig {
    slots: RwLock<Slots>,
}

impl SessionFormatConfig {
    /// Creates a configuration using `format` both as the local time zone default and as the
    /// generic timestamp fallback.
    #[must_use]
    pub fn new(format: &str) -> Self {
        Self::with_formats(format, format)
    }

    /// Creates a configuration with distinct local time zone and fallback formats.
    #[must_use]
    pub fn with_formats(ltz_default: &str, ts_fallback: &str) -> Self {
        let ltz_default = Arc::new(FormatTemplate::parse(ltz_default));
        Self {
            slots: RwLock::new(Slots {
                state: OutputFormatState::Default,
                ltz: Some(Arc::clone(&ltz_default)),
                ltz_default,
                ts_fallback: Arc::new(FormatTemplate::parse(ts_fallback)),
            }),
        }
    }

    /// Installs a custom local time zone format, entering [`OutputFormatState::Overridden`].
    pub fn set_ltz_format(&self, format: &str) {
        let template = Arc::new(FormatTemplate::parse(format));
        let mut slots = self.slots.write();
        slots.ltz = Some(template);
        slots.state = OutputFormatState::Overridden;
        drop(slots);

        log_transition(OutputFormatState::Overridden, format);
    }

    /// Clears the local time zone format, entering [`OutputFormatState::Fallback`].
    pub fn unset_ltz_format(&self) {
        let mut slots = self.slots.write();
        slots.ltz = None;
        slots.state = OutputFormatState::Fallback;
        let fallback = Arc::clone(&slots.ts_fallback);
        drop(slots);

        log_transition(OutputFormatState::Fallback, fallback.as_str());
    }

    /// Replaces the generic timestamp format used in [`OutputFormatState::Fallback`].
    ///
    /// The state does not change.
    pub fn set_ts_fallback(&self, format: &str) {
        let template = Arc::new(FormatTemplate::parse(format));
        self.slots.write().ts_fallback = template;

        tracing::event!(
            name: "ltz.format.fallback",
            tracing::Level::DEBUG,
            ltz.format = format,
        );
    }

    /// Restores the driver-supplied local time zone format, entering
    /// [`OutputFormatState::Default`].
    pub fn reset(&self) {
        let mut slots = self.slots.write();
        slots.ltz = Some(Arc::clone(&slots.ltz_default));
        slots.state = OutputFormatState::Default;
        let format = Arc::clone(&slots.ltz_default);
        drop(slots);

        log_transition(OutputFormatState::Default, format.as_str());
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> OutputFormatState {
        self.slots.read().state
    }

    /// Returns the local time zone format, or `None` after it was unset.
    #[must_use]
    pub fn ltz_format(&self) -> Option<Arc<FormatTemplate>> {
        self.slots.read().ltz.clone()
    }

    /// Returns the generic timestamp format.
    #[must_use]
    pub fn ts_fallback(&self) -> Arc<FormatTemplate> {
        Arc::clone(&self.slots.read().ts_fallback)
    }

    /// Returns the format rendering uses right now.
    #[must_use]
    pub fn active(&self) -> Arc<FormatTemplate> {
        let slots = self.slots.read();
        Arc::clone(slots.ltz.as_ref().unwrap_or(&slots.ts_fallback))
    }
}

fn log_transition(state: OutputFormatState, format: &str) {
    tracing::event!(
        name: "ltz.format.transition",
        tracing::Level::DEBUG,
        ltz.state = state.as_str(),
        ltz.format = format,
    );
}
