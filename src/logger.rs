//! The logging facade.
//!
//! ```no_run
//! use rask_log_facade::Logger;
//! use serde_json::json;
//!
//! let logger = Logger::from_value(json!({
//!     "transports": { "console": { "level": ["info", "warn", "error"] } },
//!     "version": "1.0.0",
//!     "app_name": "billing",
//!     "env": "production",
//! }))?;
//!
//! logger.info("invoice sent", json!({ "invoice": 42 }));
//! logger.warn("retrying", None);
//! logger.close()?;
//! # Ok::<(), rask_log_facade::LoggerError>(())
//! ```

use crate::config::LoggerConfig;
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::domain::{EventRecord, LoggerError, Reportable, Severity};
use crate::reporter::ErrorReporter;
use crate::sink::{SinkFactory, SinkKind, writer::BoxedWriter};
use crate::tag::{CallSiteTag, TagSource};
use serde_json::{Map, Value};
use std::panic::Location;
use std::sync::Arc;
use tracing::{debug, info};

/// Severity-filtered fan-out to the configured sinks.
///
/// All sinks are built when the logger is constructed. Every entry point
/// dispatches synchronously and never fails; sink failures are isolated and
/// reported through `tracing`.
pub struct Logger {
    label: String,
    dispatcher: Dispatcher,
    tag_source: Box<dyn TagSource>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("label", &self.label)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Validate `config` and build every enabled sink.
    pub fn new(config: LoggerConfig) -> Result<Self, LoggerError> {
        Self::builder(config).build()
    }

    /// Validate a raw configuration value, then build.
    pub fn from_value(value: Value) -> Result<Self, LoggerError> {
        Self::new(LoggerConfig::from_value(value)?)
    }

    /// Build with an explicit tag source instead of call-site derivation.
    pub fn with_tag_source(
        config: LoggerConfig,
        tag_source: Box<dyn TagSource>,
    ) -> Result<Self, LoggerError> {
        Self::builder(config).tag_source(tag_source).build()
    }

    pub fn builder(config: LoggerConfig) -> LoggerBuilder {
        LoggerBuilder::new(config)
    }

    /// Log an error. The error's message becomes the event message and the
    /// serialized error travels to the error-tracking sink.
    #[track_caller]
    pub fn error(
        &self,
        err: impl Into<Reportable>,
        data: impl Into<Option<Value>>,
    ) -> DispatchReport {
        let err = err.into();
        self.log(Severity::Error, err.message(), Some(err.to_serialized()), data.into())
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>, data: impl Into<Option<Value>>) -> DispatchReport {
        self.log(Severity::Warn, message.into(), None, data.into())
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>, data: impl Into<Option<Value>>) -> DispatchReport {
        self.log(Severity::Info, message.into(), None, data.into())
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>, data: impl Into<Option<Value>>) -> DispatchReport {
        self.log(Severity::Debug, message.into(), None, data.into())
    }

    #[track_caller]
    pub fn trace(&self, message: impl Into<String>, data: impl Into<Option<Value>>) -> DispatchReport {
        self.log(Severity::Trace, message.into(), None, data.into())
    }

    #[track_caller]
    #[inline(never)]
    fn log(
        &self,
        severity: Severity,
        message: String,
        err: Option<String>,
        data: Option<Value>,
    ) -> DispatchReport {
        let tag = self.tag_source.tag(Location::caller());
        let mut event = EventRecord::new(severity, message)
            .with_tag(tag)
            .with_label(self.label.clone())
            .with_data(data.unwrap_or_else(|| Value::Object(Map::new())));
        if let Some(err) = err {
            event = event.with_err(err);
        }
        self.dispatcher.dispatch(&event)
    }

    /// Configured `app_name`, or empty.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sink_count(&self) -> usize {
        self.dispatcher.len()
    }

    pub fn sink_kinds(&self) -> Vec<SinkKind> {
        self.dispatcher.kinds()
    }

    /// Release sink resources. Later calls do nothing.
    pub fn close(&self) -> Result<(), LoggerError> {
        if self.dispatcher.is_closed() {
            return Ok(());
        }
        self.dispatcher.close()?;
        debug!(label = %self.label, "Logger closed");
        Ok(())
    }
}

/// Construction options for [`Logger`].
pub struct LoggerBuilder {
    config: LoggerConfig,
    tag_source: Option<Box<dyn TagSource>>,
    console_writer: Option<BoxedWriter>,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl LoggerBuilder {
    fn new(config: LoggerConfig) -> Self {
        Self {
            config,
            tag_source: None,
            console_writer: None,
            reporter: None,
        }
    }

    pub fn tag_source(mut self, tag_source: Box<dyn TagSource>) -> Self {
        self.tag_source = Some(tag_source);
        self
    }

    pub fn console_writer(mut self, writer: BoxedWriter) -> Self {
        self.console_writer = Some(writer);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<Logger, LoggerError> {
        self.config.validate()?;

        let mut factory = SinkFactory::new(&self.config);
        if let Some(writer) = self.console_writer {
            factory = factory.with_console_writer(writer);
        }
        if let Some(reporter) = self.reporter {
            factory = factory.with_reporter(reporter);
        }
        let sinks = factory.build()?;

        let logger = Logger {
            label: self.config.label().to_string(),
            dispatcher: Dispatcher::new(sinks),
            tag_source: self
                .tag_source
                .unwrap_or_else(|| Box::new(CallSiteTag::new(file!()))),
        };
        info!(
            label = %logger.label,
            sinks = logger.sink_count(),
            "Logger initialized"
        );
        Ok(logger)
    }
}
