use crate::config::ConfigError;
use crate::reporter::ReporterError;
use crate::sink::SinkError;
use thiserror::Error;

/// Top-level error type for building and shutting down a [`crate::Logger`].
///
/// Per-event failures never surface here; they stay isolated to the sink that
/// produced them.
#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Error reporter error: {0}")]
    Reporter(#[from] ReporterError),
}
