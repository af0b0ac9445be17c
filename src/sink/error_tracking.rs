use super::{Closable, EventStream, SinkError};
use crate::domain::EventRecord;
use crate::reporter::{ErrorReporter, normalize};
use std::sync::Arc;

/// Forwards events to an error-tracking client.
///
/// The event envelope is serialized, normalized back into an error value and
/// context, and queued on the reporter.
pub struct ErrorTrackingStream {
    reporter: Arc<dyn ErrorReporter>,
}

impl ErrorTrackingStream {
    pub fn new(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { reporter }
    }
}

impl EventStream for ErrorTrackingStream {
    fn write_event(&self, event: &EventRecord) -> Result<(), SinkError> {
        self.write_envelope(&event.to_envelope_json()?)
    }

    fn write_envelope(&self, envelope: &str) -> Result<(), SinkError> {
        let payload = normalize(envelope)?;
        self.reporter
            .notify(payload)
            .map_err(|e| SinkError::Reporter(e.to_string()))
    }
}

impl Closable for ErrorTrackingStream {
    fn close(&self) -> Result<(), SinkError> {
        self.reporter
            .shutdown()
            .map_err(|e| SinkError::Reporter(e.to_string()))
    }
}
