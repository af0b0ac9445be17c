//! Per-sink renderers.
//!
//! Every formatter starts from the same projection ([`InputData`]) and renders
//! it into the form its sink expects. Formatters are pure: they never fail,
//! and missing optional fields render as empty values.

pub mod console;
pub mod file;
pub mod network;

pub use console::{ConsoleTheme, format_console};
pub use file::format_file;
pub use network::{format_network, format_network_in, format_time_string};

use crate::config::LoggerConfig;
use crate::domain::EventRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Release metadata merged into every rendered `data` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatContext {
    pub version: Option<String>,
    pub env: Option<String>,
}

impl FormatContext {
    pub fn new(version: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            env: Some(env.into()),
        }
    }

    pub fn from_config(config: &LoggerConfig) -> Self {
        Self::new(config.version.clone(), config.env.clone())
    }
}

/// The fields shared by all renderings.
#[derive(Debug, Clone, PartialEq)]
pub struct InputData {
    pub msg: String,
    pub tag: String,
    pub label: String,
    pub data: Value,
}

impl InputData {
    pub fn project(event: &EventRecord, ctx: &FormatContext) -> Self {
        Self {
            msg: event.message.clone(),
            tag: event.tag.clone(),
            label: event.label.clone(),
            data: project_data(&event.data, ctx),
        }
    }
}

// Absent data renders as `{}`. Objects get version/env appended; any other
// value is kept under `message`.
fn project_data(data: &Value, ctx: &FormatContext) -> Value {
    let mut out = match data {
        Value::Null => return Value::Object(Map::new()),
        Value::String(text) if text.is_empty() => return Value::Object(Map::new()),
        Value::Object(fields) => fields.clone(),
        other => {
            let mut fields = Map::new();
            fields.insert("message".into(), other.clone());
            fields
        }
    };
    if let Some(version) = &ctx.version {
        out.insert("version".into(), Value::String(version.clone()));
    }
    if let Some(env) = &ctx.env {
        out.insert("env".into(), Value::String(env.clone()));
    }
    Value::Object(out)
}

/// `YYYY-MM-DD HH:MM:SS`: the ISO-8601 capture cut at 19 characters.
pub fn format_date(timestamp: &DateTime<Utc>) -> String {
    let iso = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
    iso.get(..19).unwrap_or(&iso).replacen('T', " ", 1)
}

/// The renderer wired to a sink.
#[derive(Debug, Clone)]
pub enum Formatter {
    Console(ConsoleTheme),
    File,
    Network,
}

impl Formatter {
    pub fn render(&self, event: &EventRecord, ctx: &FormatContext) -> String {
        match self {
            Formatter::Console(theme) => format_console(event, ctx, theme),
            Formatter::File => format_file(event, ctx),
            Formatter::Network => format_network(event, ctx),
        }
    }
}
