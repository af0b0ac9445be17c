//! Shared test support utilities
//!
//! In-memory doubles for sink output and the error-tracking client, usable
//! from unit and integration tests.

use crate::reporter::{ErrorPayload, ErrorReporter, ReporterError};
use crate::sink::{Closable, SinkError};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Writer that keeps everything in memory and counts close calls.
///
/// Clones share the same buffer, so a test can keep one handle while the
/// sink owns another.
#[derive(Clone, Default)]
pub struct MemoryWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
    closes: Arc<AtomicUsize>,
    should_fail: Arc<AtomicBool>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(io::Error::other("Mock write failure"));
        }
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Closable for MemoryWriter {
    fn close(&self) -> Result<(), SinkError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Error reporter that records every payload instead of sending it.
#[derive(Default)]
pub struct RecordingReporter {
    payloads: Mutex<Vec<ErrorPayload>>,
    shutdowns: AtomicUsize,
    should_fail: AtomicBool,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn payloads(&self) -> Vec<ErrorPayload> {
        self.payloads.lock().clone()
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl ErrorReporter for RecordingReporter {
    fn notify(&self, payload: ErrorPayload) -> Result<(), ReporterError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ReporterError::Http {
                status: 503,
                message: "Mock notify failure".to_string(),
            });
        }
        self.payloads.lock().push(payload);
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ReporterError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
