use super::{FormatContext, InputData};
use crate::domain::{EventRecord, Severity};
use console::{Color, Style};

/// Colors for the severity label on the console.
///
/// Passed explicitly to the console formatter; there is no process-wide theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleTheme {
    pub trace: Color,
    pub debug: Color,
    pub info: Color,
    pub warn: Color,
    pub error: Color,
    pub enabled: bool,
}

impl Default for ConsoleTheme {
    fn default() -> Self {
        Self {
            trace: Color::Cyan,
            debug: Color::Blue,
            info: Color::Green,
            warn: Color::Yellow,
            error: Color::Red,
            enabled: true,
        }
    }
}

impl ConsoleTheme {
    /// Theme that leaves labels uncolored.
    pub fn plain() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Trace => self.trace,
            Severity::Debug => self.debug,
            Severity::Info => self.info,
            Severity::Warn => self.warn,
            Severity::Error => self.error,
        }
    }

    pub fn paint(&self, severity: Severity) -> String {
        if !self.enabled {
            return severity.as_str().to_string();
        }
        Style::new()
            .fg(self.color(severity))
            .force_styling(true)
            .apply_to(severity.as_str())
            .to_string()
    }
}

/// `<severity>: <label> / <tag> "<msg>", <json(data)>`
pub fn format_console(event: &EventRecord, ctx: &FormatContext, theme: &ConsoleTheme) -> String {
    let data = InputData::project(event, ctx);
    format!(
        "{}: {} / {} \"{}\", {}",
        theme.paint(event.severity),
        data.label,
        data.tag,
        data.msg,
        data.data
    )
}
