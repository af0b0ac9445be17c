//! Remote error tracking.
//!
//! Events routed to the error-tracking sink are normalized into an
//! [`ErrorPayload`] and handed to an [`ErrorReporter`]. Delivery is
//! fire-and-forget: `notify` only queues the payload.

pub mod bugsnag;
pub mod normalize;

pub use bugsnag::{BugsnagConfig, BugsnagReporter, DEFAULT_NOTIFY_ENDPOINT};
pub use normalize::{ErrorPayload, ErrorValue, NormalizeError, TrackedError, normalize};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReporterError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },
    #[error("Reporter worker is no longer running")]
    WorkerGone,
}

/// A client for a remote error-tracking service.
pub trait ErrorReporter: Send + Sync {
    /// Queue one error for delivery without waiting for acknowledgement.
    fn notify(&self, payload: ErrorPayload) -> Result<(), ReporterError>;

    /// Flush queued notifications and stop. Calling it twice is harmless.
    fn shutdown(&self) -> Result<(), ReporterError> {
        Ok(())
    }
}
