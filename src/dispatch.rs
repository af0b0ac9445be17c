use crate::domain::EventRecord;
use crate::sink::{SinkDescriptor, SinkError, SinkKind};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Outcome of routing one event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Sinks whose level set accepted the event
    pub attempted: usize,
    pub written: usize,
    pub failed: usize,
}

/// Fans each event out to every sink that accepts its severity.
///
/// Sinks are tried in construction order. A failing sink is logged and
/// skipped; the remaining sinks still receive the event.
#[derive(Debug)]
pub struct Dispatcher {
    sinks: Vec<SinkDescriptor>,
    closed: AtomicBool,
}

impl Dispatcher {
    pub fn new(sinks: Vec<SinkDescriptor>) -> Self {
        Self {
            sinks,
            closed: AtomicBool::new(false),
        }
    }

    pub fn dispatch(&self, event: &EventRecord) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut envelope = None;

        for sink in self.sinks.iter().filter(|s| s.accepts(event.severity)) {
            report.attempted += 1;
            match deliver(sink, event, &mut envelope) {
                Ok(()) => report.written += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        sink = %sink.kind,
                        severity = %event.severity,
                        error = %e,
                        "Sink write failed"
                    );
                }
            }
        }

        report
    }

    /// Release every closable sink resource once.
    ///
    /// All sinks are closed even if one fails; the first failure is returned.
    /// Calls after the first do nothing.
    pub fn close(&self) -> Result<(), SinkError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut first_error = None;
        for sink in &self.sinks {
            let Some(closable) = &sink.closable else {
                continue;
            };
            if let Err(e) = closable.close() {
                warn!(sink = %sink.kind, error = %e, "Failed to close sink");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn kinds(&self) -> Vec<SinkKind> {
        self.sinks.iter().map(|s| s.kind).collect()
    }
}

/// The envelope is serialized at most once per event.
fn deliver(
    sink: &SinkDescriptor,
    event: &EventRecord,
    envelope: &mut Option<String>,
) -> Result<(), SinkError> {
    if !sink.needs_metadata {
        return sink.stream.write_event(event);
    }
    if envelope.is_none() {
        *envelope = Some(event.to_envelope_json()?);
    }
    sink.stream
        .write_envelope(envelope.as_deref().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LevelSet, Severity};
    use crate::format::{FormatContext, Formatter};
    use crate::reporter::ErrorValue;
    use crate::sink::{ErrorTrackingStream, FormattedStream, SharedWriter};
    use crate::test_support::{MemoryWriter, RecordingReporter};
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn memory_sink(kind: SinkKind, levels: LevelSet) -> (SinkDescriptor, MemoryWriter) {
        let memory = MemoryWriter::new();
        let stream = FormattedStream::new(
            SharedWriter::new(Box::new(memory.clone())),
            Formatter::File,
            FormatContext::default(),
        );
        let descriptor = SinkDescriptor::new(kind, Arc::new(stream), levels)
            .with_closable(Arc::new(memory.clone()));
        (descriptor, memory)
    }

    #[test]
    fn test_dispatch_respects_level_sets() {
        let (errors, error_out) = memory_sink(SinkKind::File, LevelSet::empty().with(Severity::Error));
        let (all, all_out) = memory_sink(SinkKind::Console, LevelSet::all());
        let dispatcher = Dispatcher::new(vec![errors, all]);

        let report = dispatcher.dispatch(&EventRecord::new(Severity::Info, "hello"));
        assert_eq!(
            report,
            DispatchReport {
                attempted: 1,
                written: 1,
                failed: 0
            }
        );
        assert!(error_out.lines().is_empty());
        assert_eq!(all_out.lines().len(), 1);
    }

    #[test]
    fn test_failing_sink_does_not_block_others() {
        let (first, first_out) = memory_sink(SinkKind::File, LevelSet::all());
        let (second, second_out) = memory_sink(SinkKind::Network, LevelSet::all());
        first_out.set_should_fail(true);
        let dispatcher = Dispatcher::new(vec![first, second]);

        let report = dispatcher.dispatch(&EventRecord::new(Severity::Warn, "careful"));
        assert_eq!(report.failed, 1);
        assert_eq!(report.written, 1);
        assert_eq!(second_out.lines().len(), 1);
    }

    #[test]
    #[traced_test]
    fn test_failed_write_is_logged() {
        let (sink, out) = memory_sink(SinkKind::File, LevelSet::all());
        out.set_should_fail(true);
        let dispatcher = Dispatcher::new(vec![sink]);

        dispatcher.dispatch(&EventRecord::new(Severity::Error, "lost"));
        assert!(logs_contain("Sink write failed"));
        assert!(logs_contain("sink=file"));
    }

    #[test]
    fn test_metadata_sink_receives_envelope() {
        let reporter = Arc::new(RecordingReporter::new());
        let tracking = SinkDescriptor::new(
            SinkKind::ErrorTracking,
            Arc::new(ErrorTrackingStream::new(reporter.clone())),
            LevelSet::all(),
        )
        .with_metadata();
        let (file, file_out) = memory_sink(SinkKind::File, LevelSet::all());
        let dispatcher = Dispatcher::new(vec![file, tracking]);

        let event = EventRecord::new(Severity::Error, "payment declined").with_tag("billing");
        assert_eq!(dispatcher.dispatch(&event).written, 2);
        assert_eq!(file_out.lines().len(), 1);
        let payloads = reporter.payloads();
        assert_eq!(
            payloads[0].error,
            ErrorValue::Message("payment declined".into())
        );
        assert_eq!(payloads[0].context_data.get("tag"), Some(&serde_json::json!("billing")));
    }

    #[test]
    fn test_line_stream_marked_for_metadata_fails() {
        let memory = MemoryWriter::new();
        let stream = FormattedStream::new(
            SharedWriter::new(Box::new(memory.clone())),
            Formatter::File,
            FormatContext::default(),
        );
        let sink = SinkDescriptor::new(SinkKind::File, Arc::new(stream), LevelSet::all())
            .with_metadata();
        let dispatcher = Dispatcher::new(vec![sink]);

        let report = dispatcher.dispatch(&EventRecord::new(Severity::Info, "x"));
        assert_eq!(report.failed, 1);
        assert!(memory.lines().is_empty());
    }

    #[test]
    fn test_empty_dispatcher_is_noop() {
        let dispatcher = Dispatcher::new(Vec::new());
        for severity in Severity::ALL {
            assert_eq!(
                dispatcher.dispatch(&EventRecord::new(severity, "x")),
                DispatchReport::default()
            );
        }
        assert!(dispatcher.close().is_ok());
    }

    #[test]
    fn test_close_releases_each_resource_once() {
        let (file, file_out) = memory_sink(SinkKind::File, LevelSet::all());
        let console = SinkDescriptor::new(
            SinkKind::Console,
            Arc::new(FormattedStream::new(
                SharedWriter::new(Box::new(MemoryWriter::new())),
                Formatter::File,
                FormatContext::default(),
            )),
            LevelSet::all(),
        );
        let dispatcher = Dispatcher::new(vec![console, file]);

        dispatcher.close().unwrap();
        dispatcher.close().unwrap();
        assert!(dispatcher.is_closed());
        assert_eq!(file_out.close_count(), 1);
    }
}
