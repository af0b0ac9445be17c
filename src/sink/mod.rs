//! Output streams and the descriptors the dispatcher routes through.
//!
//! A sink pairs an [`EventStream`] with the set of severities it accepts.
//! Streams that own a resource (file handle, socket, notifier thread) also
//! expose a [`Closable`] handle released by `Logger::close`.

pub mod error_tracking;
pub mod factory;
pub mod network;
pub mod writer;

pub use error_tracking::ErrorTrackingStream;
pub use factory::SinkFactory;
pub use network::Connection;
pub use writer::{FormattedStream, SharedWriter};

use crate::domain::{EventRecord, LevelSet, Severity};
use crate::reporter::NormalizeError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sink is closed")]
    Closed,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("Error reporter failed: {0}")]
    Reporter(String),
    #[error("Sink does not accept event envelopes")]
    EnvelopeUnsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Console,
    File,
    Network,
    ErrorTracking,
}

impl SinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SinkKind::Console => "console",
            SinkKind::File => "file",
            SinkKind::Network => "network",
            SinkKind::ErrorTracking => "error-tracking",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for rendered events.
pub trait EventStream: Send + Sync {
    fn write_event(&self, event: &EventRecord) -> Result<(), SinkError>;

    /// Consume the serialized event envelope instead of the event itself.
    ///
    /// Called for sinks marked with [`SinkDescriptor::with_metadata`].
    fn write_envelope(&self, _envelope: &str) -> Result<(), SinkError> {
        Err(SinkError::EnvelopeUnsupported)
    }
}

/// A resource released on shutdown.
pub trait Closable: Send + Sync {
    fn close(&self) -> Result<(), SinkError>;
}

/// Runtime state of one enabled sink.
pub struct SinkDescriptor {
    pub kind: SinkKind,
    pub stream: Arc<dyn EventStream>,
    /// Always [`Severity::MIN`]; filtering is done by `levels`.
    pub min_level: Severity,
    pub levels: LevelSet,
    pub closable: Option<Arc<dyn Closable>>,
    /// Receives the serialized envelope through `write_envelope`.
    pub needs_metadata: bool,
}

impl SinkDescriptor {
    pub fn new(kind: SinkKind, stream: Arc<dyn EventStream>, levels: LevelSet) -> Self {
        Self {
            kind,
            stream,
            min_level: Severity::MIN,
            levels,
            closable: None,
            needs_metadata: false,
        }
    }

    pub fn with_closable(mut self, closable: Arc<dyn Closable>) -> Self {
        self.closable = Some(closable);
        self
    }

    pub fn with_metadata(mut self) -> Self {
        self.needs_metadata = true;
        self
    }

    pub fn accepts(&self, severity: Severity) -> bool {
        severity >= self.min_level && self.levels.contains(severity)
    }
}

impl fmt::Debug for SinkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkDescriptor")
            .field("kind", &self.kind)
            .field("min_level", &self.min_level)
            .field("levels", &self.levels)
            .field("closable", &self.closable.is_some())
            .field("needs_metadata", &self.needs_metadata)
            .finish()
    }
}
