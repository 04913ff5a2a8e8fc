// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};

use crate::{CanonicalInstant, CellError, ColumnChunk, ColumnScale, ConfigurationError, Session};

/// The declared type of a result column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    /// A timestamp stored as an absolute instant and displayed in the session time zone.
    TimestampLtz,
    /// A timestamp without any time zone.
    TimestampNtz,
    /// A timestamp carrying its own UTC offset.
    TimestampTz,
}

impl DeclaredType {
    /// Returns the server name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TimestampLtz => "TIMESTAMP_LTZ",
            Self::TimestampNtz => "TIMESTAMP_NTZ",
            Self::TimestampTz => "TIMESTAMP_TZ",
        }
    }
}

impl Display for DeclaredType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of one result column, fixed for the lifetime of a result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnMetadata {
    name: String,
    scale: ColumnScale,
    declared_type: DeclaredType,
}

impl ColumnMetadata {
    /// Describes a column.
    #[must_use]
    pub fn new(name: impl Into<String>, scale: ColumnScale, declared_type: DeclaredType) -> Self {
        Self {
            name: name.into(),
            scale,
            declared_type,
        }
    }

    /// Describes a local time zone timestamp column.
    #[must_use]
    pub fn ltz(name: impl Into<String>, scale: ColumnScale) -> Self {
        Self::new(name, scale, DeclaredType::TimestampLtz)
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of fractional digits the column keeps.
    #[must_use]
    pub const fn scale(&self) -> ColumnScale {
        self.scale
    }

    /// Returns the declared column type.
    #[must_use]
    pub const fn declared_type(&self) -> DeclaredType {
        self.declared_type
    }
}

/// A batch of rows as delivered by one fetch, stored column by column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBatch {
    columns: Vec<ColumnChunk>,
    rows: usize,
}

impl RowBatch {
    /// Creates a batch from column chunks.
    ///
    /// The batch has as many rows as its longest column; cells missing from a shorter column
    /// are reported as out of bounds when accessed.
    #[must_use]
    pub fn new(columns: Vec<ColumnChunk>) -> Self {
        let rows = columns.iter().map(ColumnChunk::len).max().unwrap_or_default();
        Self { columns, rows }
    }

    /// Creates a batch from textual rows, `None` marking a null cell.
    ///
    /// A row shorter than the widest row has null cells at its end.
    #[must_use]
    pub fn from_text_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let rows: Vec<Vec<Option<String>>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.map(Into::into)).collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or_default();

        let columns = (0..width)
            .map(|column| ColumnChunk::from_text(rows.iter().map(|row| row.get(column).cloned().flatten())))
            .collect();
        Self {
            columns,
            rows: rows.len(),
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the column chunks of the batch.
    #[must_use]
    pub fn columns(&self) -> &[ColumnChunk] {
        &self.columns
    }
}

/// The surrounding layer that fetches raw batches from the server.
///
/// Every iterator over [`RowBatch`] is a source.
pub trait WireSource {
    /// Returns the next batch, or `None` once the result is exhausted.
    fn fetch_next(&mut self) -> Option<RowBatch>;
}

impl<I: Iterator<Item = RowBatch>> WireSource for I {
    fn fetch_next(&mut self) -> Option<RowBatch> {
        self.next()
    }
}

/// A forward-only cursor over the rows of a query result.
///
/// Column positions are zero-based. Timestamp values are decoded on access, so an error
/// concerns only the cell that was accessed. Rendering uses the session configuration in
/// effect at the time of the call.
///
/// # Examples
///
/// ```
/// use ltz_stamp::{ColumnMetadata, ColumnScale, RowBatch, Session, SessionOptions};
///
/// let session = Session::new(SessionOptions::new().time_zone("UTC"))?;
/// let batch = RowBatch::from_text_rows([[Some("1483272000.123")], [None]]);
/// let mut rows = session.query([batch].into_iter(), vec![ColumnMetadata::ltz("C1", ColumnScale::MILLIS)])?;
///
/// assert!(rows.next_row());
/// assert_eq!(rows.timestamp(0)?.map(|instant| instant.epoch_millis()), Some(1_483_272_000_123));
/// assert_eq!(rows.string(0)?.as_deref(), Some("Sun, 01 Jan 2017 12:00:00 +0000"));
///
/// assert!(rows.next_row());
/// assert!(rows.is_null(0)?);
/// assert_eq!(rows.timestamp(0)?, None);
///
/// assert!(!rows.next_row());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct ResultSet<S> {
    session: Session,
    source: S,
    columns: Vec<ColumnMetadata>,
    batch: Option<RowBatch>,
    row: usize,
}

impl<S: WireSource> ResultSet<S> {
    pub(crate) fn new(session: Session, source: S, columns: Vec<ColumnMetadata>) -> Result<Self, ConfigurationError> {
        if let Some(column) = columns.iter().find(|column| column.declared_type != DeclaredType::TimestampLtz) {
            return Err(ConfigurationError::new(
                column.name.as_str(),
                "column is not a local time zone timestamp",
            ));
        }

        Ok(Self {
            session,
            source,
            columns,
            batch: None,
            row: 0,
        })
    }

    /// Advances to the next row, fetching batches as needed.
    ///
    /// Returns `false` once every row was visited.
    pub fn next_row(&mut self) -> bool {
        if let Some(batch) = &self.batch
            && self.row + 1 < batch.rows()
        {
            self.row += 1;
            return true;
        }

        self.batch = None;
        while let Some(batch) = self.source.fetch_next() {
            tracing::event!(
                name: "ltz.result.fetch",
                tracing::Level::TRACE,
                ltz.rows = batch.rows(),
                ltz.columns = batch.columns().len(),
            );

            if batch.rows() > 0 {
                self.batch = Some(batch);
                self.row = 0;
                return true;
            }
        }
        false
    }

    /// Returns the metadata of the result columns.
    #[must_use]
    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    /// Returns whether the cell in `column` of the current row is null.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor is not on a row or the column does not exist.
    pub fn is_null(&self, column: usize) -> Result<bool, CellError> {
        let (chunk, _) = self.cell(column)?;
        chunk.is_null(self.row)
    }

    /// Decodes the cell in `column` of the current row, `None` if it is null.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor is not on a row, the column does not exist, or the cell
    /// holds a malformed value.
    pub fn timestamp(&self, column: usize) -> Result<Option<CanonicalInstant>, CellError> {
        let (chunk, scale) = self.cell(column)?;
        chunk.read_at(self.row, scale)
    }

    /// Renders the cell in `column` of the current row with the session output format, `None`
    /// if it is null.
    ///
    /// # Errors
    ///
    /// Returns an error if [`timestamp`][Self::timestamp] fails or the session has no display
    /// time zone.
    pub fn string(&self, column: usize) -> Result<Option<String>, CellError> {
        let (_, scale) = self.cell(column)?;
        match self.timestamp(column)? {
            Some(instant) => Ok(Some(self.session.render(instant, scale)?)),
            None => Ok(None),
        }
    }

    fn cell(&self, column: usize) -> Result<(&ColumnChunk, ColumnScale), CellError> {
        let batch = self.batch.as_ref().ok_or(CellError::NoCurrentRow)?;
        let out_of_bounds = || CellError::OutOfBounds {
            index: column,
            len: self.columns.len(),
        };

        let metadata = self.columns.get(column).ok_or_else(out_of_bounds)?;
        let chunk = batch.columns().get(column).ok_or_else(out_of_bounds)?;
        Ok((chunk, metadata.scale))
    }
}
