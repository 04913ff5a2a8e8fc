// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

/// A wire value that cannot be turned into a [`CanonicalInstant`][crate::CanonicalInstant].
///
/// The error carries the offending raw value verbatim so that it can be reported back to the
/// caller of the specific cell access. Malformed values are never clamped into range.
///
/// # Examples
///
/// ```
/// use ltz_stamp::{ColumnScale, WireValue, decode_value};
///
/// let error = decode_value(WireValue::Text("12ab"), ColumnScale::NANOS).unwrap_err();
/// assert_eq!(error.raw(), "12ab");
/// ```
#[ohno::error]
#[display("malformed wire timestamp `{raw}`: {reason}")]
pub struct DecodeError {
    raw: String,
    reason: &'static str,
}

impl DecodeError {
    /// Returns the raw wire value that was rejected.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns a short description of why the value was rejected.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

/// The session is not configured in a way that allows the requested operation.
///
/// Typical causes are rendering without a display time zone, an unknown time zone
/// identifier, or an unknown session parameter name.
#[ohno::error]
#[display("invalid session configuration for {parameter}: {reason}")]
pub struct ConfigurationError {
    parameter: String,
    reason: &'static str,
}

impl ConfigurationError {
    /// Returns the name of the session parameter the error relates to.
    #[must_use]
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Returns a short description of the problem.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

/// An error reported by a single cell access.
///
/// Cell errors are local: a failing cell never affects other cells of the same row or batch.
#[derive(Debug)]
#[non_exhaustive]
pub enum CellError {
    /// The wire value stored in the cell is malformed.
    Decode(DecodeError),
    /// The session cannot render the value.
    Configuration(ConfigurationError),
    /// The requested row or column does not exist.
    OutOfBounds {
        /// The requested index.
        index: usize,
        /// The number of available items.
        len: usize,
    },
    /// The cursor is not positioned on a row.
    NoCurrentRow,
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(err) => err.fmt(f),
            Self::Configuration(err) => err.fmt(f),
            Self::OutOfBounds { index, len } => write!(f, "index {index} is out of bounds for {len} items"),
            Self::NoCurrentRow => write!(f, "the cursor is not positioned on a row"),
        }
    }
}

impl std::error::Error for CellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::Configuration(err) => Some(err),
            Self::OutOfBounds { .. } | Self::NoCurrentRow => None,
        }
    }
}

impl From<DecodeError> for CellError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

impl From<ConfigurationError> for CellError {
    fn from(err: ConfigurationError) -> Self {
        Self::Configuration(err)
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::error::Error as StdError;

    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(DecodeError: Send, Sync, StdError);
        static_assertions::assert_impl_all!(ConfigurationError: Send, Sync, StdError);
        static_assertions::assert_impl_all!(CellError: Send, Sync, StdError);
    }

    #[test]
    fn decode_error_keeps_raw_value() {
        let error = DecodeError::new("1.5x", "non-numeric fraction");

        assert_eq!(error.raw(), "1.5x");
        assert_eq!(error.reason(), "non-numeric fraction");
        assert!(error.to_string().starts_with("malformed wire timestamp `1.5x`: non-numeric fraction"));
    }

    #[test]
    fn configuration_error_names_parameter() {
        let error = ConfigurationError::new("TIMEZONE", "no display time zone is set");

        assert_eq!(error.parameter(), "TIMEZONE");
        assert!(
            error
                .to_string()
                .starts_with("invalid session configuration for TIMEZONE: no display time zone is set")
        );
    }

    #[test]
    fn cell_error_exposes_source() {
        let error = CellError::from(DecodeError::new("x", "bad"));
        assert!(matches!(error, CellError::Decode(_)));
        assert!(error.source().is_some());

        let error = CellError::OutOfBounds { index: 3, len: 2 };
        assert_eq!(error.to_string(), "index 3 is out of bounds for 2 items");
        assert!(error.source().is_none());
    }
}
