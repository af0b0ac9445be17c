use super::{Closable, EventStream, SinkError};
use crate::domain::EventRecord;
use crate::format::{FormatContext, Formatter};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

pub type BoxedWriter = Box<dyn Write + Send>;

/// Line-oriented writer shared between a stream and its close handle.
///
/// Closing flushes and drops the underlying writer; later writes fail with
/// [`SinkError::Closed`] and later closes do nothing.
#[derive(Clone)]
pub struct SharedWriter {
    inner: Arc<Mutex<Option<BoxedWriter>>>,
}

impl SharedWriter {
    pub fn new(writer: BoxedWriter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Open `path` for appending, creating the file but not its directory.
    pub fn append_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Write one line and flush it.
    pub fn write_line(&self, line: &str) -> Result<(), SinkError> {
        let mut guard = self.inner.lock();
        let writer = guard.as_mut().ok_or(SinkError::Closed)?;

        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
        writer.write_all(&buf)?;
        writer.flush()?;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().is_none()
    }
}

impl Closable for SharedWriter {
    fn close(&self) -> Result<(), SinkError> {
        let writer = self.inner.lock().take();
        if let Some(mut writer) = writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SharedWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedWriter")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Renders each event with a formatter and writes it as one line.
#[derive(Debug)]
pub struct FormattedStream {
    writer: SharedWriter,
    formatter: Formatter,
    context: FormatContext,
}

impl FormattedStream {
    pub fn new(writer: SharedWriter, formatter: Formatter, context: FormatContext) -> Self {
        Self {
            writer,
            formatter,
            context,
        }
    }

    pub fn writer(&self) -> &SharedWriter {
        &self.writer
    }
}

impl EventStream for FormattedStream {
    fn write_event(&self, event: &EventRecord) -> Result<(), SinkError> {
        self.writer
            .write_line(&self.formatter.render(event, &self.context))
    }
}
