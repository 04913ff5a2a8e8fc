// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Test utilities for asserting on emitted `ltz.*` events.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

/// Thread-local log capture buffer for testing.
///
/// Uses `tracing_subscriber::fmt::MakeWriter` to capture formatted log output
/// into a buffer that can be inspected in tests.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the captured log output as a string.
    #[must_use]
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).to_string()
    }

    /// Asserts that the captured log output contains the given string.
    pub fn assert_contains(&self, expected: &str) {
        let output = self.output();
        assert!(
            output.contains(expected),
            "log output does not contain '{expected}', got:\n{output}"
        );
    }

    /// Asserts that the captured log output does not contain the given string.
    pub fn assert_not_contains(&self, unexpected: &str) {
        let output = self.output();
        assert!(
            !output.contains(unexpected),
            "log output unexpectedly contains '{unexpected}', got:\n{output}"
        );
    }

    /// Creates a `tracing_subscriber` that writes to this capture buffer.
    /// Use with `set_default()` for thread-local capture.
    #[must_use]
    pub fn subscriber(&self) -> impl tracing::Subscriber {
        use tracing_subscriber::layer::SubscriberExt;

        tracing_subscriber::registry().with(tracing_subscriber::fmt::layer().with_writer(self.clone()).with_ansi(false))
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogCaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

/// Writer that appends to a shared buffer.
pub(crate) struct LogCaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogCaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use tracing_subscriber::util::SubscriberInitExt;

    use super::*;

    #[test]
    fn captures_events_of_the_current_thread() {
        let capture = LogCapture::new();
        let _guard = capture.subscriber().set_default();

        tracing::event!(name: "ltz.capture.check", tracing::Level::DEBUG, ltz.value = 42);

        capture.assert_contains("ltz.value=42");
        capture.assert_not_contains("ltz.value=43");
    }

    #[test]
    fn clones_share_the_buffer() {
        let capture = LogCapture::new();
        let clone = capture.clone();
        let _guard = clone.subscriber().set_default();

        tracing::event!(tracing::Level::WARN, ltz.raw = "bogus");

        capture.assert_contains("WARN");
        capture.assert_contains("ltz.raw=\"bogus\"");
    }
}
