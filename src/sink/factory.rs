use super::{
    Connection, ErrorTrackingStream, FormattedStream, SharedWriter, SinkDescriptor, SinkError,
    SinkKind, writer::BoxedWriter,
};
use crate::config::{LoggerConfig, WireFormat};
use crate::domain::{LevelSet, LoggerError};
use crate::format::{ConsoleTheme, FormatContext, Formatter};
use crate::reporter::{BugsnagConfig, BugsnagReporter, ErrorReporter};
use std::sync::Arc;
use tracing::info;

/// Builds one [`SinkDescriptor`] per enabled transport, in the order
/// console, file, network, error tracking.
pub struct SinkFactory<'a> {
    config: &'a LoggerConfig,
    console_writer: Option<BoxedWriter>,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl<'a> SinkFactory<'a> {
    pub fn new(config: &'a LoggerConfig) -> Self {
        Self {
            config,
            console_writer: None,
            reporter: None,
        }
    }

    /// Send console output somewhere other than stdout.
    pub fn with_console_writer(mut self, writer: BoxedWriter) -> Self {
        self.console_writer = Some(writer);
        self
    }

    /// Use this client for the error-tracking sink instead of Bugsnag.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<Vec<SinkDescriptor>, LoggerError> {
        let config = self.config;
        let transports = &config.transports;
        let context = FormatContext::from_config(config);
        let mut sinks = Vec::new();

        if let Some(console) = &transports.console {
            let writer = match self.console_writer {
                Some(writer) => SharedWriter::new(writer),
                None => SharedWriter::stdout(),
            };
            let theme = if console.colors {
                ConsoleTheme::default()
            } else {
                ConsoleTheme::plain()
            };
            let stream = FormattedStream::new(writer, Formatter::Console(theme), context.clone());
            sinks.push(SinkDescriptor::new(
                SinkKind::Console,
                Arc::new(stream),
                LevelSet::from(&console.level),
            ));
        }

        if let Some(file) = &transports.file {
            let writer = SharedWriter::append_file(&file.filepath).map_err(SinkError::from)?;
            let stream = FormattedStream::new(writer.clone(), Formatter::File, context.clone());
            sinks.push(
                SinkDescriptor::new(SinkKind::File, Arc::new(stream), LevelSet::from(&file.level))
                    .with_closable(Arc::new(writer)),
            );
            info!(path = %file.filepath.display(), "File sink opened");
        }

        if let Some(logstash) = &transports.logstash {
            let connection = Connection::new(logstash.host.clone(), logstash.port, logstash.socket);
            let writer = SharedWriter::new(Box::new(connection));
            let formatter = match logstash.format {
                WireFormat::Pretty => Formatter::File,
                WireFormat::Json => Formatter::Network,
            };
            let stream = FormattedStream::new(writer.clone(), formatter, context.clone());
            sinks.push(
                SinkDescriptor::new(
                    SinkKind::Network,
                    Arc::new(stream),
                    LevelSet::from(&logstash.level),
                )
                .with_closable(Arc::new(writer)),
            );
            info!(
                host = %logstash.host,
                port = logstash.port,
                socket = ?logstash.socket,
                "Network sink configured"
            );
        }

        if let Some(bugsnag) = &transports.bugsnag {
            let reporter: Arc<dyn ErrorReporter> = match self.reporter {
                Some(reporter) => reporter,
                None => {
                    let settings =
                        BugsnagConfig::from_transport(bugsnag, &config.version, &config.env)?;
                    Arc::new(BugsnagReporter::start(settings)?)
                }
            };
            let stream = Arc::new(ErrorTrackingStream::new(reporter));
            sinks.push(
                SinkDescriptor::new(
                    SinkKind::ErrorTracking,
                    stream.clone(),
                    LevelSet::from(&bugsnag.level),
                )
                .with_closable(stream)
                .with_metadata(),
            );
            info!("Error-tracking sink registered");
        }

        Ok(sinks)
    }
}
