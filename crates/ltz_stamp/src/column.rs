// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{CanonicalInstant, CellError, ColumnScale, WireEncoding, WireValue, decode_value};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Values {
    Text(Vec<String>),
    Packed(Vec<i64>),
    Split(Vec<(i64, i32)>),
}

/// One column of raw timestamp values together with their null markers.
///
/// Values are kept exactly as they arrived and are decoded lazily, one cell at a time, so a
/// malformed value only fails the access to its own position. A null position never reaches
/// the decoder.
///
/// # Examples
///
/// ```
/// use ltz_stamp::{ColumnChunk, ColumnScale};
///
/// let chunk = ColumnChunk::from_text([Some("1483272000.123"), None]);
///
/// let instant = chunk.read_at(0, ColumnScale::MILLIS)?.expect("value is present");
/// assert_eq!(instant.epoch_millis(), 1_483_272_000_123);
/// assert_eq!(chunk.read_at(1, ColumnScale::MILLIS)?, None);
///
/// # Ok::<(), ltz_stamp::CellError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChunk {
    values: Values,
    validity: Vec<bool>,
}

impl ColumnChunk {
    /// Creates a chunk from textual values, `None` marking a null position.
    pub fn from_text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let (values, validity) = split_validity(values.into_iter().map(|value| value.map(Into::into)));
        Self {
            values: Values::Text(values),
            validity,
        }
    }

    /// Creates a chunk from packed columnar values, `None` marking a null position.
    pub fn from_packed(values: impl IntoIterator<Item = Option<i64>>) -> Self {
        let (values, validity) = split_validity(values);
        Self {
            values: Values::Packed(values),
            validity,
        }
    }

    /// Creates a chunk from split columnar `(seconds, fraction)` values, `None` marking a null
    /// position.
    pub fn from_split(values: impl IntoIterator<Item = Option<(i64, i32)>>) -> Self {
        let (values, validity) = split_validity(values);
        Self {
            values: Values::Split(values),
            validity,
        }
    }

    /// Returns the number of positions, null or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validity.len()
    }

    /// Returns `true` if the chunk has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    /// Returns the wire encoding the values were delivered in.
    #[must_use]
    pub const fn encoding(&self) -> WireEncoding {
        match self.values {
            Values::Text(_) => WireEncoding::Text,
            Values::Packed(_) | Values::Split(_) => WireEncoding::Columnar,
        }
    }

    /// Returns whether the zero-based `position` holds a null marker.
    ///
    /// # Errors
    ///
    /// Returns [`CellError::OutOfBounds`] if the position does not exist.
    pub fn is_null(&self, position: usize) -> Result<bool, CellError> {
        self.validity.get(position).map(|valid| !valid).ok_or(CellError::OutOfBounds {
            index: position,
            len: self.len(),
        })
    }

    /// Returns the raw wire value at the zero-based `position`, or `None` for a null marker.
    ///
    /// # Errors
    ///
    /// Returns [`CellError::OutOfBounds`] if the position does not exist.
    pub fn raw_at(&self, position: usize) -> Result<Option<WireValue<'_>>, CellError> {
        if self.is_null(position)? {
            return Ok(None);
        }

        // validity and values always have the same length
        let value = match &self.values {
            Values::Text(values) => values.get(position).map(|text| WireValue::Text(text.as_str())),
            Values::Packed(values) => values.get(position).copied().map(WireValue::Packed),
            Values::Split(values) => values.get(position).map(|&(epoch_seconds, fraction_units)| WireValue::Split {
                epoch_seconds,
                fraction_units,
            }),
        };
        Ok(value)
    }

    /// Decodes the value at the zero-based `position` in a column of the given scale.
    ///
    /// A null position yields `Ok(None)` without running the decoder. Errors are local to the
    /// position: other positions of the same chunk remain readable.
    ///
    /// # Errors
    ///
    /// Returns [`CellError::OutOfBounds`] if the position does not exist, or
    /// [`CellError::Decode`] if the stored value is malformed.
    pub fn read_at(&self, position: usize, scale: ColumnScale) -> Result<Option<CanonicalInstant>, CellError> {
        let Some(value) = self.raw_at(position)? else {
            return Ok(None);
        };

        match decode_value(value, scale) {
            Ok(instant) => Ok(Some(instant)),
            Err(err) => {
                tracing::event!(
                    name: "ltz.decode.rejected",
                    tracing::Level::WARN,
                    ltz.raw = err.raw(),
                    ltz.reason = err.reason(),
                    ltz.scale = scale.digits(),
                    ltz.position = position,
                );
                Err(err.into())
            }
        }
    }
}

fn split_validity<T: Default>(values: impl IntoIterator<Item = Option<T>>) -> (Vec<T>, Vec<bool>) {
    values
        .into_iter()
        .map(|value| match value {
            Some(value) => (value, true),
            None => (T::default(), false),
        })
        .unzip()
}
