// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Decoding and display of local time zone timestamps.
//!
//! A column declared as a local time zone timestamp stores an absolute instant. Servers deliver
//! such values in two structurally different encodings: row-oriented text, where each value is a
//! signed decimal number of seconds, and columnar batches, where each value is a pre-scaled
//! integer or a pair of integers. This crate turns either form into the same
//! [`CanonicalInstant`] and renders instants as text under a session-scoped output format.
//!
//! # Decoding
//!
//! Every wire value goes through one path: [`to_raw`] converts it into a normalized
//! [`RawWireTimestamp`] and [`decode`] turns that into an instant. [`decode_value`] combines
//! both steps. The result depends only on the wire value and the [`ColumnScale`]; the display
//! time zone never takes part, so an instant reads the same in every session.
//!
//! ```
//! use ltz_stamp::{ColumnScale, WireValue, decode_value};
//!
//! let scale = ColumnScale::NANOS;
//! let text = decode_value(WireValue::Text("-0.999999999"), scale)?;
//! let split = decode_value(
//!     WireValue::Split {
//!         epoch_seconds: -1,
//!         fraction_units: 1,
//!     },
//!     scale,
//! )?;
//!
//! assert_eq!(text, split);
//! assert_eq!(text.epoch_millis(), -1000);
//! assert_eq!(text.nanos(), 1);
//!
//! # Ok::<(), ltz_stamp::DecodeError>(())
//! ```
//!
//! # Null values
//!
//! A [`ColumnChunk`] keeps raw values together with their null markers. Reading a null position
//! returns `None` without running the decoder.
//!
//! # Rendering
//!
//! A [`Session`] owns a [`SessionFormatConfig`] and the display time zone. The output format
//! moves between the states of [`OutputFormatState`] as session parameters are set and unset,
//! and every [`ResultSet`] derived from the session renders with whatever format is in effect
//! when a string is requested.
//!
//! ```
//! use ltz_stamp::{ColumnMetadata, ColumnScale, RowBatch, Session, SessionOptions, TIMESTAMP_LTZ_OUTPUT_FORMAT};
//!
//! let session = Session::new(SessionOptions::new().time_zone("America/Los_Angeles"))?;
//! let batch = RowBatch::from_text_rows([[Some("1483272000")]]);
//! let mut rows = session.query([batch].into_iter(), vec![ColumnMetadata::ltz("C1", ColumnScale::SECONDS)])?;
//! assert!(rows.next_row());
//!
//! assert_eq!(rows.string(0)?.as_deref(), Some("Sun, 01 Jan 2017 04:00:00 -0800"));
//!
//! session.set_parameter(TIMESTAMP_LTZ_OUTPUT_FORMAT, "YYYY-MM-DD HH24:MI TZH:TZM")?;
//! assert_eq!(rows.string(0)?.as_deref(), Some("2017-01-01 04:00 -08:00"));
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Calendars
//!
//! Decoding is calendar free. Civil dates only appear when a [`TimestampLiteral`] is parsed or
//! an instant is rendered; both use a [`CalendarSystem`], by default the hybrid Julian and
//! Gregorian calendar legacy drivers use.
//!
//! # Features
//!
//! - `serde`: serialization of [`CanonicalInstant`] and [`CalendarSystem`], deserialization of
//!   [`SessionOptions`].

mod calendar;
mod column;
mod decode;
mod error;
mod format;
mod instant;
mod literal;
mod parity;
mod result_set;
mod scale;
mod session;
#[cfg(test)]
mod testing;
mod wire;

pub use calendar::CalendarSystem;
pub use column::ColumnChunk;
pub use decode::decode;
pub use error::{CellError, ConfigurationError, DecodeError};
pub use format::{FormatTemplate, OutputFormatState, SessionFormatConfig, render};
pub use instant::CanonicalInstant;
pub use literal::{StoredTimestamp, TimestampLiteral};
pub use parity::{decode_value, to_raw};
pub use result_set::{ColumnMetadata, DeclaredType, ResultSet, RowBatch, WireSource};
pub use scale::{ColumnScale, normalize};
pub use session::{DEFAULT_OUTPUT_FORMAT, Session, SessionOptions, TIMESTAMP_LTZ_OUTPUT_FORMAT, TIMESTAMP_OUTPUT_FORMAT, TIMEZONE};
pub use wire::{RawWireTimestamp, WireEncoding, WireValue};
